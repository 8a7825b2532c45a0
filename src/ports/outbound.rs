//! Outbound port. The core calls into the platform through this.
//!
//! Implemented by the session/transport adapter that owns the live
//! connection. Carries wire-shaped DTOs; `usecases::mapper` converts them to
//! domain entities.

use crate::domain::IngestError;
use tokio::sync::broadcast;

/// Chat descriptor as the platform reports it.
#[derive(Debug, Clone)]
pub struct RawChat {
    pub id: i64,
    pub title: String,
    /// Wire type tag, e.g. `"chatTypeSupergroup"`. Unrecognized tags map to
    /// `ChatType::Unknown`.
    pub type_tag: String,
    /// 0 until full chat info has been lazily loaded.
    pub member_count: i32,
    /// 0 when the chat has no messages yet.
    pub last_message_id: i64,
    pub last_message_date: i64,
}

/// Message as the platform delivers it, history and live stream alike.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub id: i64,
    pub chat_id: i64,
    /// 0 for channel posts without an individual sender.
    pub sender_id: i64,
    pub date: i64,
    pub content: RawContent,
    /// 0 when the message is not a reply.
    pub reply_to_message_id: i64,
    pub is_forwarded: bool,
}

/// Wire content constructors. Superset of what the catalog keeps: kinds with
/// no catalog meaning map to `MessageContent::Unknown`.
#[derive(Debug, Clone)]
pub enum RawContent {
    Video {
        duration_secs: i32,
        width: i32,
        height: i32,
        size_bytes: i64,
        remote_id: String,
    },
    Audio {
        duration_secs: i32,
        size_bytes: i64,
        remote_id: String,
    },
    Photo {
        width: i32,
        height: i32,
        size_bytes: i64,
        remote_id: String,
    },
    Document {
        file_name: String,
        mime_type: String,
        size_bytes: i64,
        remote_id: String,
    },
    Animation {
        duration_secs: i32,
        width: i32,
        height: i32,
        size_bytes: i64,
        remote_id: String,
    },
    VideoNote {
        duration_secs: i32,
        size_bytes: i64,
        remote_id: String,
    },
    VoiceNote {
        duration_secs: i32,
        size_bytes: i64,
        remote_id: String,
    },
    Text {
        text: String,
    },
    Sticker {
        remote_id: String,
    },
    ServiceAction {
        description: String,
    },
    Other,
}

/// Platform transport gateway. Paged chat list, chat metadata, message
/// history, and the live update stream.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Next batch of chat ids in the platform's dialog order. Repeated calls
    /// page through the list; a batch smaller than `page_limit` is the end.
    async fn get_chats(&self, page_limit: i32) -> Result<Vec<i64>, IngestError>;

    /// Full metadata for one chat.
    async fn get_chat_metadata(&self, chat_id: i64) -> Result<RawChat, IngestError>;

    /// One page of history, newest → oldest. `from_message_id = 0` starts at
    /// the newest message; a negative `offset` pages strictly older than the
    /// anchor.
    async fn get_message_history(
        &self,
        chat_id: i64,
        from_message_id: i64,
        offset: i32,
        limit: i32,
    ) -> Result<Vec<RawMessage>, IngestError>;

    /// Subscribe to the live new-message stream. Every subscriber sees every
    /// message; slow subscribers observe `Lagged`.
    fn subscribe_new_messages(&self) -> broadcast::Receiver<RawMessage>;
}
