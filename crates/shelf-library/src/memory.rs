//! In-memory store
//!
//! Mirrors the referential rules of the SQLite schema so callers see the
//! same failures with or without a database behind them.

use parking_lot::RwLock;

use crate::bookmark::Bookmark;
use crate::error::LibraryError;
use crate::folder::Folder;
use crate::store::{check_bookmark, check_folder, BookmarkStore};
use crate::Result;

#[derive(Default)]
pub struct MemoryStore {
    folders: RwLock<Vec<Folder>>,
    bookmarks: RwLock<Vec<Bookmark>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records, bypassing validation.
    pub fn with_records(folders: Vec<Folder>, bookmarks: Vec<Bookmark>) -> Self {
        Self {
            folders: RwLock::new(folders),
            bookmarks: RwLock::new(bookmarks),
        }
    }

    fn folder_exists(&self, id: &str) -> bool {
        self.folders.read().iter().any(|f| f.id == id)
    }
}

impl BookmarkStore for MemoryStore {
    fn add_folder(&self, folder: &Folder) -> Result<String> {
        check_folder(folder)?;

        if self.folder_exists(&folder.id) {
            return Err(LibraryError::InvalidRecord(format!(
                "Folder already exists: {}",
                folder.id
            )));
        }
        if let Some(parent_id) = folder.parent_id.as_deref() {
            if !self.folder_exists(parent_id) {
                return Err(LibraryError::InvalidRecord(format!(
                    "Parent folder not found: {}",
                    parent_id
                )));
            }
        }

        self.folders.write().push(folder.clone());
        Ok(folder.id.clone())
    }

    fn add_bookmark(&self, bookmark: &Bookmark) -> Result<String> {
        check_bookmark(bookmark)?;

        if let Some(folder_id) = bookmark.folder_id.as_deref() {
            if !self.folder_exists(folder_id) {
                return Err(LibraryError::InvalidRecord(format!(
                    "Folder not found: {}",
                    folder_id
                )));
            }
        }

        let mut bookmarks = self.bookmarks.write();
        if bookmarks.iter().any(|b| b.id == bookmark.id) {
            return Err(LibraryError::InvalidRecord(format!(
                "Bookmark already exists: {}",
                bookmark.id
            )));
        }
        bookmarks.push(bookmark.clone());

        Ok(bookmark.id.clone())
    }

    fn update_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        check_bookmark(bookmark)?;

        let mut bookmarks = self.bookmarks.write();
        let existing = bookmarks
            .iter_mut()
            .find(|b| b.id == bookmark.id)
            .ok_or_else(|| LibraryError::NotFound(bookmark.id.clone()))?;
        *existing = bookmark.clone();

        Ok(())
    }

    fn all_bookmarks(&self) -> Result<Vec<Bookmark>> {
        Ok(self.bookmarks.read().clone())
    }

    fn all_folders(&self) -> Result<Vec<Folder>> {
        Ok(self.folders.read().clone())
    }

    fn find_by_url(&self, url: &str) -> Result<Option<Bookmark>> {
        Ok(self.bookmarks.read().iter().find(|b| b.url == url).cloned())
    }
}
