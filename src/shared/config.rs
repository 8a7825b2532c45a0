//! Ingestion configuration. Retry policy, paging, classifier thresholds.

use crate::shared::retry::RetryConfig;
use serde::Deserialize;
use std::time::Duration;

/// Chats per list request.
pub const DEFAULT_CHAT_PAGE_SIZE: i32 = 100;

/// Messages per history request.
pub const DEFAULT_HISTORY_PAGE_SIZE: i32 = 100;

/// Delay before repeating an initial single-message history page, giving the
/// platform time to finish assembling the chat server-side.
pub const DEFAULT_FIRST_PAGE_SETTLE_MS: u64 = 500;

/// Classification cutoffs. Defaults are the catalog's tuned values; override
/// individual cutoffs through [`IngestConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    /// HOT when at least this many media messages were sampled.
    pub hot_min_media: u64,
    /// HOT when the media ratio reaches this value.
    pub hot_min_ratio: f64,
    /// WARM needs at least this many media messages...
    pub warm_min_media: u64,
    /// ...and at least this media ratio.
    pub warm_min_ratio: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            hot_min_media: 20,
            hot_min_ratio: 0.30,
            warm_min_media: 3,
            warm_min_ratio: 0.05,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct IngestConfig {
    /// Chats per list request. Read from TG_MEDIACAT_CHAT_PAGE_SIZE.
    #[serde(default)]
    pub chat_page_size: Option<i32>,

    /// Messages per history request. Read from TG_MEDIACAT_HISTORY_PAGE_SIZE.
    #[serde(default)]
    pub history_page_size: Option<i32>,

    /// Settle delay in ms before repeating an initial single-message page.
    /// Read from TG_MEDIACAT_FIRST_PAGE_SETTLE_MS.
    #[serde(default)]
    pub first_page_settle_ms: Option<u64>,

    /// Retry attempts per remote call. Read from TG_MEDIACAT_RETRY_MAX_ATTEMPTS.
    #[serde(default)]
    pub retry_max_attempts: Option<u32>,

    /// Base backoff delay in ms. Read from TG_MEDIACAT_RETRY_BASE_DELAY_MS.
    #[serde(default)]
    pub retry_base_delay_ms: Option<u64>,

    /// Backoff cap in ms. Read from TG_MEDIACAT_RETRY_MAX_DELAY_MS.
    #[serde(default)]
    pub retry_max_delay_ms: Option<u64>,

    /// Backoff jitter factor in [0, 1). Read from TG_MEDIACAT_RETRY_JITTER_FACTOR.
    #[serde(default)]
    pub retry_jitter_factor: Option<f64>,

    /// Classifier cutoffs. Read from TG_MEDIACAT_HOT_MIN_MEDIA etc.
    #[serde(default)]
    pub hot_min_media: Option<u64>,
    #[serde(default)]
    pub hot_min_ratio: Option<f64>,
    #[serde(default)]
    pub warm_min_media: Option<u64>,
    #[serde(default)]
    pub warm_min_ratio: Option<f64>,
}

impl IngestConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("TG_MEDIACAT"));
        if let Ok(path) = std::env::var("TG_MEDIACAT_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn chat_page_size_or_default(&self) -> i32 {
        self.chat_page_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_CHAT_PAGE_SIZE)
    }

    pub fn history_page_size_or_default(&self) -> i32 {
        self.history_page_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_HISTORY_PAGE_SIZE)
    }

    pub fn first_page_settle(&self) -> Duration {
        Duration::from_millis(
            self.first_page_settle_ms
                .unwrap_or(DEFAULT_FIRST_PAGE_SETTLE_MS),
        )
    }

    /// Retry policy: the default preset with any configured overrides.
    pub fn retry_config(&self) -> RetryConfig {
        let d = RetryConfig::default();
        RetryConfig::new(
            self.retry_max_attempts.unwrap_or(d.max_attempts),
            self.retry_base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(d.base_delay),
            self.retry_max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(d.max_delay),
            self.retry_jitter_factor.unwrap_or(d.jitter_factor),
        )
    }

    /// Classifier cutoffs: defaults with any configured overrides.
    pub fn thresholds(&self) -> ClassifierThresholds {
        let d = ClassifierThresholds::default();
        ClassifierThresholds {
            hot_min_media: self.hot_min_media.unwrap_or(d.hot_min_media),
            hot_min_ratio: self.hot_min_ratio.unwrap_or(d.hot_min_ratio),
            warm_min_media: self.warm_min_media.unwrap_or(d.warm_min_media),
            warm_min_ratio: self.warm_min_ratio.unwrap_or(d.warm_min_ratio),
        }
    }
}
