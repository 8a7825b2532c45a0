//! Domain entities. Pure data structures for the catalog core.
//!
//! No transport/IO types here. These are mapped from the wire DTOs.

use serde::{Deserialize, Serialize};

/// A chat (dialog) on the remote platform: source of messages for the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChatType,
    /// Best-effort member count. `None` until the platform has loaded full
    /// chat info (the list endpoint reports 0 for chats it never resolved).
    pub member_count: Option<u32>,
    pub last_message_id: Option<i64>,
    pub last_message_date: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    BasicGroup,
    Supergroup,
    Channel,
    Secret,
    Unknown,
}

/// A single message from a chat. Message ids are monotonic per chat and serve
/// as the history paging anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: Option<i64>,
    pub date: i64,
    pub content: MessageContent,
    pub reply_to_message_id: Option<i64>,
    pub is_forwarded: bool,
}

/// Message payload. Closed set: every match over it (mapper, media predicate)
/// is exhaustive, so adding a kind is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
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
    Unknown,
}

impl MessageContent {
    /// True for playable/displayable media. Documents count when their mime
    /// type is a media type.
    pub fn is_media(&self) -> bool {
        match self {
            MessageContent::Video { .. }
            | MessageContent::Audio { .. }
            | MessageContent::Photo { .. }
            | MessageContent::Animation { .. }
            | MessageContent::VideoNote { .. }
            | MessageContent::VoiceNote { .. } => true,
            MessageContent::Document { mime_type, .. } => {
                mime_type.starts_with("video/")
                    || mime_type.starts_with("audio/")
                    || mime_type.starts_with("image/")
            }
            MessageContent::Text { .. } | MessageContent::Unknown => false,
        }
    }

    /// Remote content id when the payload references a downloadable file.
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            MessageContent::Video { remote_id, .. }
            | MessageContent::Audio { remote_id, .. }
            | MessageContent::Photo { remote_id, .. }
            | MessageContent::Document { remote_id, .. }
            | MessageContent::Animation { remote_id, .. }
            | MessageContent::VideoNote { remote_id, .. }
            | MessageContent::VoiceNote { remote_id, .. } => Some(remote_id),
            MessageContent::Text { .. } | MessageContent::Unknown => None,
        }
    }
}

/// Rolling per-chat sample counters. Counts never shrink; the ratio derives
/// on read.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChatMediaProfile {
    pub media_count: u64,
    pub total_count: u64,
}

impl ChatMediaProfile {
    /// Fold one message into the counters.
    pub fn observe(&mut self, message: &Message) {
        self.total_count += 1;
        if message.content.is_media() {
            self.media_count += 1;
        }
    }

    pub fn media_ratio(&self) -> f64 {
        self.media_count as f64 / self.total_count.max(1) as f64
    }
}

/// Media-density class of a chat, recomputed on demand from its profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Hot,
    Warm,
    Cold,
}

/// Emitted once when a suppressed chat climbs back out of COLD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupEvent {
    pub chat_id: i64,
    pub class: MediaClass,
}
