//! Shelf Storage Layer
//!
//! SQLite persistence for folders, bookmarks and settings.
//! Record-level access lives in `shelf-library`; this crate owns the
//! connection, the schema and the key/value settings table.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
