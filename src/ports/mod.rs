//! Port traits. API boundaries for the hexagon.
//!
//! Outbound: called by the application into the platform transport.

pub mod outbound;

pub use outbound::{ChatTransport, RawChat, RawContent, RawMessage};
