//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] shelf_storage::StorageError),

    #[error("Library error: {0}")]
    Library(#[from] shelf_library::LibraryError),

    #[error("Interchange error: {0}")]
    Interchange(#[from] shelf_interchange::InterchangeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
