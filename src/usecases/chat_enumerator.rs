//! Chat enumeration: paged listing of the platform's dialog list with a
//! process-lifetime metadata cache.
//!
//! Per-chat metadata failures are logged and skipped so one broken chat
//! cannot sink a whole listing; the result is partial but ordered.

use crate::domain::{Chat, IngestError};
use crate::ports::ChatTransport;
use crate::shared::retry::RetryEngine;
use crate::usecases::mapper;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct ChatEnumerator {
    transport: Arc<dyn ChatTransport>,
    retry: RetryEngine,
    page_size: i32,
    /// Metadata by chat id, kept for the life of the process. Refreshed only
    /// through [`ChatEnumerator::reload_chat`].
    chat_cache: Mutex<HashMap<i64, Chat>>,
}

impl ChatEnumerator {
    pub fn new(transport: Arc<dyn ChatTransport>, retry: RetryEngine, page_size: i32) -> Self {
        Self {
            transport,
            retry,
            page_size: page_size.max(1),
            chat_cache: Mutex::new(HashMap::new()),
        }
    }

    /// List up to `limit` chats (`limit <= 0` = unbounded) in the platform's
    /// delivery order. No chat id is processed twice per call.
    pub async fn list_chats(&self, limit: i64) -> Result<Vec<Chat>, IngestError> {
        let mut seen: HashSet<i64> = HashSet::new();
        let mut chats = Vec::new();

        loop {
            let page_size = self.page_size;
            let transport = Arc::clone(&self.transport);
            let batch = self
                .retry
                .run(move || {
                    let transport = Arc::clone(&transport);
                    async move { transport.get_chats(page_size).await }
                })
                .await
                .into_result()?;

            let batch_len = batch.len();
            let mut new_ids = 0usize;
            for chat_id in batch {
                if !seen.insert(chat_id) {
                    continue;
                }
                new_ids += 1;
                match self.get_chat(chat_id).await {
                    Ok(chat) => {
                        chats.push(chat);
                        if limit > 0 && chats.len() as i64 >= limit {
                            return Ok(chats);
                        }
                    }
                    Err(e) => warn!(chat_id, error = %e, "metadata fetch failed, skipping chat"),
                }
            }

            if batch_len < self.page_size as usize {
                break; // end of list
            }
            if new_ids == 0 {
                // A full page of already-seen ids: the cursor is not advancing.
                warn!(total = chats.len(), "chat list cursor stalled, stopping");
                break;
            }
        }

        debug!(total = chats.len(), "chat enumeration finished");
        Ok(chats)
    }

    /// Cached metadata lookup; fetches (with retry) on first access.
    pub async fn get_chat(&self, chat_id: i64) -> Result<Chat, IngestError> {
        if let Some(chat) = self.chat_cache.lock().await.get(&chat_id) {
            return Ok(chat.clone());
        }
        self.reload_chat(chat_id).await
    }

    /// Fetch fresh metadata, replacing any cached entry.
    pub async fn reload_chat(&self, chat_id: i64) -> Result<Chat, IngestError> {
        let transport = Arc::clone(&self.transport);
        let raw = self
            .retry
            .run(move || {
                let transport = Arc::clone(&transport);
                async move { transport.get_chat_metadata(chat_id).await }
            })
            .await
            .into_result()?;
        let chat = mapper::chat_from_raw(raw);
        self.chat_cache.lock().await.insert(chat_id, chat.clone());
        Ok(chat)
    }

    /// Drop every cached entry. Intended for tests and forced full refreshes.
    pub async fn reset_cache(&self) {
        self.chat_cache.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{RawChat, RawMessage};
    use crate::shared::retry::RetryConfig;
    use parking_lot::Mutex as StateMutex;
    use std::time::Duration;
    use tokio::sync::broadcast;

    struct FakeTransport {
        pages: StateMutex<Vec<Vec<i64>>>,
        fail_metadata_for: HashSet<i64>,
        list_calls: StateMutex<u32>,
        metadata_calls: StateMutex<Vec<i64>>,
    }

    impl FakeTransport {
        fn new(pages: Vec<Vec<i64>>) -> Self {
            Self {
                pages: StateMutex::new(pages),
                fail_metadata_for: HashSet::new(),
                list_calls: StateMutex::new(0),
                metadata_calls: StateMutex::new(Vec::new()),
            }
        }

        fn failing_metadata(mut self, ids: &[i64]) -> Self {
            self.fail_metadata_for = ids.iter().copied().collect();
            self
        }
    }

    #[async_trait::async_trait]
    impl ChatTransport for FakeTransport {
        async fn get_chats(&self, _page_limit: i32) -> Result<Vec<i64>, IngestError> {
            *self.list_calls.lock() += 1;
            let mut pages = self.pages.lock();
            if pages.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(pages.remove(0))
            }
        }

        async fn get_chat_metadata(&self, chat_id: i64) -> Result<RawChat, IngestError> {
            self.metadata_calls.lock().push(chat_id);
            if self.fail_metadata_for.contains(&chat_id) {
                return Err(IngestError::Transport("metadata unavailable".into()));
            }
            Ok(RawChat {
                id: chat_id,
                title: format!("chat {chat_id}"),
                type_tag: "chatTypeSupergroup".into(),
                member_count: 0,
                last_message_id: 10,
                last_message_date: 1_700_000_000,
            })
        }

        async fn get_message_history(
            &self,
            _chat_id: i64,
            _from_message_id: i64,
            _offset: i32,
            _limit: i32,
        ) -> Result<Vec<RawMessage>, IngestError> {
            unimplemented!("not used by enumerator tests")
        }

        fn subscribe_new_messages(&self) -> broadcast::Receiver<RawMessage> {
            unimplemented!("not used by enumerator tests")
        }
    }

    fn enumerator(transport: Arc<FakeTransport>) -> ChatEnumerator {
        let retry = RetryEngine::new(RetryConfig::new(
            2,
            Duration::from_millis(1),
            Duration::from_millis(5),
            0.0,
        ));
        ChatEnumerator::new(transport, retry, 3)
    }

    #[tokio::test(start_paused = true)]
    async fn lists_across_pages_in_delivery_order() {
        let transport = Arc::new(FakeTransport::new(vec![vec![1, 2, 3], vec![4, 5]]));
        let chats = enumerator(Arc::clone(&transport)).list_chats(0).await.unwrap();
        let ids: Vec<i64> = chats.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        // The short second page ended the listing without a third request.
        assert_eq!(*transport.list_calls.lock(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_ids_processed_once() {
        let transport = Arc::new(FakeTransport::new(vec![vec![1, 2, 3], vec![2, 3, 4], vec![]]));
        let chats = enumerator(Arc::clone(&transport)).list_chats(0).await.unwrap();
        let ids: Vec<i64> = chats.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        let metadata = transport.metadata_calls.lock().clone();
        assert_eq!(metadata, vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn limit_caps_the_listing() {
        let transport = Arc::new(FakeTransport::new(vec![vec![1, 2, 3], vec![4, 5, 6]]));
        let chats = enumerator(transport).list_chats(4).await.unwrap();
        assert_eq!(chats.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn metadata_failure_skips_that_chat_only() {
        let transport =
            Arc::new(FakeTransport::new(vec![vec![1, 2, 3]]).failing_metadata(&[2]));
        let chats = enumerator(Arc::clone(&transport)).list_chats(0).await.unwrap();
        let ids: Vec<i64> = chats.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        // The failing chat was retried before being skipped.
        let attempts_for_2 = transport
            .metadata_calls
            .lock()
            .iter()
            .filter(|id| **id == 2)
            .count();
        assert_eq!(attempts_for_2, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_cursor_stops_enumeration() {
        let transport = Arc::new(FakeTransport::new(vec![vec![1, 2, 3], vec![1, 2, 3]]));
        let chats = enumerator(Arc::clone(&transport)).list_chats(0).await.unwrap();
        assert_eq!(chats.len(), 3);
        assert_eq!(*transport.list_calls.lock(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cache_serves_repeat_lookups() {
        let transport = Arc::new(FakeTransport::new(vec![]));
        let enumerator = enumerator(Arc::clone(&transport));

        enumerator.get_chat(7).await.unwrap();
        enumerator.get_chat(7).await.unwrap();
        assert_eq!(transport.metadata_calls.lock().len(), 1);

        enumerator.reload_chat(7).await.unwrap();
        assert_eq!(transport.metadata_calls.lock().len(), 2);

        enumerator.reset_cache().await;
        enumerator.get_chat(7).await.unwrap();
        assert_eq!(transport.metadata_calls.lock().len(), 3);
    }
}
