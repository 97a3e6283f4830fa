use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Unauthorized: caller has no authenticated identity")]
    Unauthorized,

    #[error("Unknown event type '{event_type}'")]
    UnknownEventType { event_type: String },

    #[error("Invalid metadata: missing required keys {missing:?}")]
    InvalidMetadata { missing: Vec<String> },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GameError {
    /// True when the caller may safely resubmit with the same idempotency key.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessingFailed(_) | Self::Unavailable(_))
    }
}

/// Map busy/locked SQLite errors to the retryable variant.
/// Everything else stays a plain database error.
pub(crate) fn classify_db_error(e: rusqlite::Error) -> GameError {
    use rusqlite::ErrorCode::{DatabaseBusy, DatabaseLocked};
    match e.sqlite_error_code() {
        Some(DatabaseBusy) | Some(DatabaseLocked) => GameError::ProcessingFailed(e.to_string()),
        _ => GameError::Database(e),
    }
}

pub type GameResult<T> = Result<T, GameError>;
