//! Message history: single-page fetch and the backfill driver.
//!
//! Paging contract: the first request uses `(from_message_id = 0, offset = 0)`;
//! every continuation anchors on the oldest message of the prior page with
//! `offset = -1`. The platform assembles a chat's history asynchronously on
//! first contact and may answer the very first request with a lone message,
//! so that case is refetched once after a short settle delay.

use crate::domain::{IngestError, Message};
use crate::ports::ChatTransport;
use crate::shared::retry::RetryEngine;
use crate::usecases::mapper;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fetches one page of history through the retry engine and maps it to the
/// domain model.
pub struct MessageHistoryFetcher {
    transport: Arc<dyn ChatTransport>,
    retry: RetryEngine,
}

impl MessageHistoryFetcher {
    pub fn new(transport: Arc<dyn ChatTransport>, retry: RetryEngine) -> Self {
        Self { transport, retry }
    }

    /// One page, newest → oldest. An empty page is a normal "no more history"
    /// result; a raised error means the retries for this page ran out.
    pub async fn fetch_messages(
        &self,
        chat_id: i64,
        from_message_id: i64,
        offset: i32,
        limit: i32,
    ) -> Result<Vec<Message>, IngestError> {
        let transport = Arc::clone(&self.transport);
        let raws = self
            .retry
            .run(move || {
                let transport = Arc::clone(&transport);
                async move {
                    transport
                        .get_message_history(chat_id, from_message_id, offset, limit)
                        .await
                }
            })
            .await
            .into_result()?;
        Ok(raws.into_iter().map(mapper::message_from_raw).collect())
    }
}

/// Drives [`MessageHistoryFetcher`] across pages until the history is
/// exhausted or the caller's cap is reached.
pub struct HistoryBackfiller {
    fetcher: MessageHistoryFetcher,
    page_size: i32,
    first_page_settle: Duration,
}

impl HistoryBackfiller {
    pub fn new(fetcher: MessageHistoryFetcher, page_size: i32, first_page_settle: Duration) -> Self {
        Self {
            fetcher,
            page_size: page_size.max(1),
            first_page_settle,
        }
    }

    /// Load up to `max_messages` of history, newest first.
    pub async fn load_all_messages(
        &self,
        chat_id: i64,
        max_messages: usize,
    ) -> Result<Vec<Message>, IngestError> {
        self.load_all_messages_with_progress(chat_id, max_messages, |_| {})
            .await
    }

    /// Same, reporting the cumulative message count after each appended page.
    ///
    /// A page fetch that exhausts its retries aborts the whole run: partial
    /// history is never passed off as complete. Completeness is defined only
    /// by an empty or short terminal page.
    pub async fn load_all_messages_with_progress(
        &self,
        chat_id: i64,
        max_messages: usize,
        mut on_progress: impl FnMut(usize) + Send,
    ) -> Result<Vec<Message>, IngestError> {
        let mut collected: Vec<Message> = Vec::new();
        if max_messages == 0 {
            return Ok(collected);
        }

        let mut from_message_id = 0i64;
        let mut offset = 0i32;
        let mut first_page = true;

        loop {
            let mut page = self
                .fetcher
                .fetch_messages(chat_id, from_message_id, offset, self.page_size)
                .await?;

            if first_page && page.len() == 1 {
                // History is still being assembled server-side. Give it a
                // moment and repeat the identical request, keeping whichever
                // result is fuller.
                tokio::time::sleep(self.first_page_settle).await;
                let settled = self
                    .fetcher
                    .fetch_messages(chat_id, from_message_id, offset, self.page_size)
                    .await?;
                if settled.len() > page.len() {
                    page = settled;
                }
            }
            first_page = false;

            let oldest_id = match page.last() {
                Some(message) => message.id,
                None => break, // history exhausted
            };
            let page_len = page.len();

            collected.extend(page);
            on_progress(collected.len());
            debug!(chat_id, page_len, total = collected.len(), "backfill page appended");

            if collected.len() >= max_messages {
                break;
            }
            if page_len < self.page_size as usize {
                break; // short page: end of history
            }

            from_message_id = oldest_id;
            offset = -1;
        }

        Ok(collected)
    }
}
