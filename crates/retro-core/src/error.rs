use crate::validate::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetroError {
    #[error("a sprint id is required to {0}")]
    SprintIdRequired(&'static str),

    #[error("sprint not found: {0}")]
    SprintNotFound(String),

    #[error("retro item not found: {0}")]
    ItemNotFound(String),

    #[error("invalid sentiment color: {0}")]
    InvalidColor(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RetroError>;
