//! Interchange error types

use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Error, Debug)]
pub enum InterchangeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid bookmark file: {0}")]
    InvalidFile(String),

    #[error("Bookmark lists nested deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("Unsupported export version: {0}")]
    UnsupportedVersion(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Library error: {0}")]
    Library(#[from] shelf_library::LibraryError),
}
