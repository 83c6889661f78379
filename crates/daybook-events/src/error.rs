//! Event-specific error types.

use thiserror::Error;

use crate::types::EventId;

#[derive(Error, Debug)]
pub enum EventError {
    /// Rejected before a request was sent, or by the server with 400/422.
    #[error("Invalid event data: {0}")]
    Validation(String),

    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("API error: {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl EventError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the failure happened on the wire rather than in the request itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::InvalidResponse(_) | Self::Network(_)
        )
    }
}
