//! Map wire DTOs to domain entities.
//!
//! The single boundary over content kinds: a new wire constructor must be
//! handled here before it can reach the catalog, and the match below keeps
//! that a compile-time obligation.

use crate::domain::{Chat, ChatType, Message, MessageContent};
use crate::ports::outbound::{RawChat, RawContent, RawMessage};

pub fn chat_from_raw(raw: RawChat) -> Chat {
    Chat {
        id: raw.id,
        title: raw.title,
        kind: chat_type_from_tag(&raw.type_tag),
        // The list endpoint reports 0 for chats whose full info was never
        // loaded; that is "unknown", not an empty chat.
        member_count: u32::try_from(raw.member_count).ok().filter(|n| *n > 0),
        last_message_id: (raw.last_message_id != 0).then_some(raw.last_message_id),
        last_message_date: (raw.last_message_date != 0).then_some(raw.last_message_date),
    }
}

pub fn chat_type_from_tag(tag: &str) -> ChatType {
    match tag {
        "chatTypePrivate" => ChatType::Private,
        "chatTypeBasicGroup" => ChatType::BasicGroup,
        "chatTypeSupergroup" => ChatType::Supergroup,
        "chatTypeChannel" => ChatType::Channel,
        "chatTypeSecret" => ChatType::Secret,
        _ => ChatType::Unknown,
    }
}

pub fn message_from_raw(raw: RawMessage) -> Message {
    Message {
        id: raw.id,
        chat_id: raw.chat_id,
        sender_id: (raw.sender_id != 0).then_some(raw.sender_id),
        date: raw.date,
        content: content_from_raw(raw.content),
        reply_to_message_id: (raw.reply_to_message_id != 0).then_some(raw.reply_to_message_id),
        is_forwarded: raw.is_forwarded,
    }
}

pub fn content_from_raw(raw: RawContent) -> MessageContent {
    match raw {
        RawContent::Video {
            duration_secs,
            width,
            height,
            size_bytes,
            remote_id,
        } => MessageContent::Video {
            duration_secs,
            width,
            height,
            size_bytes,
            remote_id,
        },
        RawContent::Audio {
            duration_secs,
            size_bytes,
            remote_id,
        } => MessageContent::Audio {
            duration_secs,
            size_bytes,
            remote_id,
        },
        RawContent::Photo {
            width,
            height,
            size_bytes,
            remote_id,
        } => MessageContent::Photo {
            width,
            height,
            size_bytes,
            remote_id,
        },
        RawContent::Document {
            file_name,
            mime_type,
            size_bytes,
            remote_id,
        } => MessageContent::Document {
            file_name,
            mime_type,
            size_bytes,
            remote_id,
        },
        RawContent::Animation {
            duration_secs,
            width,
            height,
            size_bytes,
            remote_id,
        } => MessageContent::Animation {
            duration_secs,
            width,
            height,
            size_bytes,
            remote_id,
        },
        RawContent::VideoNote {
            duration_secs,
            size_bytes,
            remote_id,
        } => MessageContent::VideoNote {
            duration_secs,
            size_bytes,
            remote_id,
        },
        RawContent::VoiceNote {
            duration_secs,
            size_bytes,
            remote_id,
        } => MessageContent::VoiceNote {
            duration_secs,
            size_bytes,
            remote_id,
        },
        RawContent::Text { text } => MessageContent::Text { text },
        // Stickers, service actions and anything unrecognized carry no
        // catalog value; keep the message, drop the payload detail.
        RawContent::Sticker { .. } | RawContent::ServiceAction { .. } | RawContent::Other => {
            MessageContent::Unknown
        }
    }
}
