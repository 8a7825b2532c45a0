//! tg-mediacat: chat ingestion core for a Telegram media catalog.
//!
//! Enumerates chats, backfills paged message history, and classifies chats by
//! media density so the ingestion scheduler can spend its limited effort on
//! the chats that actually carry media.

pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
