use thiserror::Error;

#[derive(Debug, Error)]
/// Represents errors that can occur while reading host records.
///
/// This enum consolidates database failures and rows that cannot be mapped to
/// a record projection.
pub enum RecordSourceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Record source unavailable: {0}")]
    Unavailable(String),
}

impl RecordSourceError {
    /// Create an invalid record error.
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
