//! Shelf Core
//!
//! Wires the database, the bookmark library and the interchange formats
//! together behind [`Shelf`].

mod config;
mod error;
mod shelf;

pub use config::Config;
pub use error::CoreError;
pub use shelf::{Shelf, TAG_NAMES_SETTING};

// Re-export the pieces callers work with directly
pub use shelf_interchange::{DuplicateHandling, ExportFormat, ImportResult, ParseResult};
pub use shelf_library::{Bookmark, BookmarkStore, Folder, LibraryStore};
pub use shelf_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Install the fmt subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
