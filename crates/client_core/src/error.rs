use std::time::Duration;

use shared::domain::MatterId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("matter {0} not found")]
    MatterNotFound(MatterId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("matters api responded with HTTP {status}")]
    Http { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// True when the server answered; false for network-level failures.
    pub fn is_http(&self) -> bool {
        matches!(self, GatewayError::Http { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no matter matches draggable id '{draggable_id}'")]
    MatterNotFound { draggable_id: String },
    #[error("'{droppable_id}' is not a status column")]
    UnknownColumn { droppable_id: String },
    #[error("failed to persist matter status: {0}")]
    Persistence(#[from] GatewayError),
}

impl TransitionError {
    /// Text for the dismissible banner above the board.
    pub fn user_message(&self) -> &'static str {
        match self {
            TransitionError::MatterNotFound { .. } => "Matter not found",
            TransitionError::UnknownColumn { .. } => "Unknown status column",
            TransitionError::Persistence(GatewayError::Http { .. }) => {
                "Failed to update matter status"
            }
            TransitionError::Persistence(_) => "An error occurred while updating matter status",
        }
    }
}
