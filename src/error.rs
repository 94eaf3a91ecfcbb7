//! Error types for the drive_transfer crate.

use thiserror::Error;

/// Errors that can occur while transferring or migrating Drive items.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Batch item {file_id} failed ({status}): {message}")]
    BatchItemFailed {
        file_id: String,
        status: u16,
        message: String,
    },

    #[error("Malformed batch response: {0}")]
    MalformedBatchResponse(String),

    #[error("Invalid URL or ID: {0}")]
    InvalidUrlOrId(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Batch size must be between 1 and {max}, got {size}")]
    InvalidBatchSize { size: usize, max: usize },

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Confirmation prompt failed: {0}")]
    PromptError(String),

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),
}

impl DriveError {
    /// HTTP status carried by API-level failures, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DriveError::ApiError { status, .. } | DriveError::BatchItemFailed { status, .. } => {
                Some(*status)
            }
            DriveError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
