//! Unified error types for duebell.

use thiserror::Error;

/// Result type alias using DuebellError.
pub type Result<T> = std::result::Result<T, DuebellError>;

#[derive(Error, Debug)]
pub enum DuebellError {
    /// Notion answered with a non-success status.
    #[error("Notion API error {status}: {body}")]
    Notion { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid cron expression: {0}")]
    Cron(String),
}
