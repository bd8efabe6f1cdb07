use std::time::Duration;

use reverie_ai::AiError;
use reverie_shared::ValidationError;
use reverie_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Dream not found: {0}")]
    DreamNotFound(Uuid),
}

impl ClientError {
    /// Whether the UI should offer "try again".
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ai(e) => e.is_retryable(),
            Self::Timeout(_) | Self::Store(_) => true,
            Self::Validation(_) | Self::DreamNotFound(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
