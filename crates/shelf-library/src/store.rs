//! Persistence interface used by import and export

use crate::bookmark::Bookmark;
use crate::folder::Folder;
use crate::{LibraryError, Result};

/// CRUD access to folder and bookmark records.
///
/// Records carry their own ids; `add_*` returns the id under which the
/// record was stored. Writes are issued one at a time by a single caller.
pub trait BookmarkStore {
    fn add_folder(&self, folder: &Folder) -> Result<String>;

    fn add_bookmark(&self, bookmark: &Bookmark) -> Result<String>;

    /// Overwrite the record with `bookmark.id`. Fails with `NotFound` if no
    /// such record exists.
    fn update_bookmark(&self, bookmark: &Bookmark) -> Result<()>;

    fn all_bookmarks(&self) -> Result<Vec<Bookmark>>;

    fn all_folders(&self) -> Result<Vec<Folder>>;

    /// First stored bookmark whose URL matches exactly.
    fn find_by_url(&self, url: &str) -> Result<Option<Bookmark>>;
}

impl<S: BookmarkStore + ?Sized> BookmarkStore for &S {
    fn add_folder(&self, folder: &Folder) -> Result<String> {
        (**self).add_folder(folder)
    }

    fn add_bookmark(&self, bookmark: &Bookmark) -> Result<String> {
        (**self).add_bookmark(bookmark)
    }

    fn update_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        (**self).update_bookmark(bookmark)
    }

    fn all_bookmarks(&self) -> Result<Vec<Bookmark>> {
        (**self).all_bookmarks()
    }

    fn all_folders(&self) -> Result<Vec<Folder>> {
        (**self).all_folders()
    }

    fn find_by_url(&self, url: &str) -> Result<Option<Bookmark>> {
        (**self).find_by_url(url)
    }
}

pub(crate) fn check_folder(folder: &Folder) -> Result<()> {
    if folder.id.trim().is_empty() {
        return Err(LibraryError::InvalidRecord(
            "Folder id cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_bookmark(bookmark: &Bookmark) -> Result<()> {
    if bookmark.id.trim().is_empty() {
        return Err(LibraryError::InvalidRecord(
            "Bookmark id cannot be empty".to_string(),
        ));
    }
    if bookmark.url.trim().is_empty() {
        return Err(LibraryError::InvalidRecord(
            "Bookmark URL cannot be empty".to_string(),
        ));
    }
    Ok(())
}
