use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No {collection} record with key '{key}'")]
    RecordNotFound { collection: String, key: String },

    #[error("Invalid time '{value}': expected HH:MM")]
    InvalidTime { value: String },

    #[error("Invalid date range {start}..={end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Invalid operator: {reason}")]
    InvalidOperator { reason: String },

    #[error("Audit generation failed: {0}")]
    Audit(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type TrackResult<T> = Result<T, TrackError>;
