//! Cross-cutting pieces: configuration and the retry engine.

pub mod config;
pub mod retry;

pub use config::{ClassifierThresholds, IngestConfig};
pub use retry::{RetryConfig, RetryEngine, RetryOutcome};
