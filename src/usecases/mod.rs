//! Application use cases. Orchestrate domain logic via ports.

pub mod chat_enumerator;
pub mod history_backfill;
pub mod live_feed_worker;
pub mod mapper;
pub mod media_classifier;

pub use chat_enumerator::ChatEnumerator;
pub use history_backfill::{HistoryBackfiller, MessageHistoryFetcher};
pub use live_feed_worker::LiveFeedWorker;
pub use media_classifier::MediaDensityClassifier;
