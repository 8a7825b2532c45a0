//! Async task: consumes the live new-message broadcast and feeds the
//! classifier.
//!
//! Runs concurrently with bulk backfill passes; profile updates are atomic
//! per message, so both may touch the same chat at once. Cancel by aborting
//! the task; the receive is the only suspension point.

use crate::ports::outbound::RawMessage;
use crate::usecases::mapper;
use crate::usecases::media_classifier::MediaDensityClassifier;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub struct LiveFeedWorker {
    rx: broadcast::Receiver<RawMessage>,
    classifier: Arc<MediaDensityClassifier>,
}

impl LiveFeedWorker {
    pub fn new(
        rx: broadcast::Receiver<RawMessage>,
        classifier: Arc<MediaDensityClassifier>,
    ) -> Self {
        Self { rx, classifier }
    }

    /// Run until the transport drops its sender. Spawn on its own task.
    pub async fn run(mut self) {
        loop {
            match self.rx.recv().await {
                Ok(raw) => {
                    let message = mapper::message_from_raw(raw);
                    self.classifier.record_message(&message);
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "live stream lagged, profiles will undercount");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        info!("live feed worker finished (stream closed)");
    }
}
