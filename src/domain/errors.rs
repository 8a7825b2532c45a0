//! Domain errors. Used by ports and use cases.
//!
//! The transport adapter maps infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Transient transport failure. Retryable.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Malformed or unexpected response from the platform. Not retryable.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Retries ran out. Terminal for the call; never swallowed.
    #[error("retries exhausted after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: Box<IngestError> },
}

impl IngestError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, IngestError::Transport(_))
    }
}
