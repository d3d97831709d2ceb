//! Shelf Library
//!
//! Bookmark and folder records plus the stores that persist them.
//! Folders form a forest linked by `parent_id`; bookmarks point at
//! their folder with `folder_id` (`None` means root level).

mod bookmark;
mod error;
mod folder;
mod library_store;
mod memory;
mod store;

pub use bookmark::Bookmark;
pub use error::LibraryError;
pub use folder::Folder;
pub use library_store::LibraryStore;
pub use memory::MemoryStore;
pub use store::BookmarkStore;

pub type Result<T> = std::result::Result<T, LibraryError>;

/// Identifier of a folder record.
pub type FolderId = String;

/// Identifier of a tag record. Tags are resolved to names outside this crate.
pub type TagId = String;
