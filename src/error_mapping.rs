//! Maps event errors to daybook_core::AppError for consistent user-facing messages.

use daybook_core::{AppError, NetworkError, ReqwestErrorExt};
use daybook_events::EventError;

pub fn event_error(e: EventError) -> AppError {
    match e {
        EventError::Validation(msg) => AppError::Validation(msg),
        EventError::NotFound(id) => AppError::NotFound(format!("event {}", id)),
        EventError::Api { status, message } => {
            AppError::Network(NetworkError::ServerError { status, message })
        }
        EventError::InvalidResponse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
        EventError::Network(e) => AppError::Network(e.into_network_error()),
    }
}
