//! SQLite-backed library store
//!
//! Write-through: every successful write lands in the database first and is
//! then mirrored into the in-memory cache that serves the list queries.

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use rusqlite::OptionalExtension;
use std::sync::Arc;

use shelf_storage::Database;

use crate::bookmark::Bookmark;
use crate::error::LibraryError;
use crate::folder::Folder;
use crate::store::{check_bookmark, check_folder, BookmarkStore};
use crate::Result;

const BOOKMARK_COLUMNS: &str = "id, url, title, description, notes, folder_id, tags,
     created_at, updated_at, favicon_url, og_image";

#[derive(Default)]
struct Cache {
    folders: Vec<Folder>,
    bookmarks: Vec<Bookmark>,
}

pub struct LibraryStore {
    /// In-memory record cache, in insertion order
    cache: Arc<RwLock<Cache>>,
    /// Database for persistence
    db: Database,
}

impl LibraryStore {
    /// Create a store over `db` and fill the cache from it.
    pub fn new(db: Database) -> Result<Self> {
        let store = Self {
            cache: Arc::new(RwLock::new(Cache::default())),
            db,
        };
        store.load()?;
        Ok(store)
    }

    /// Reload every folder and bookmark from the database into the cache.
    pub fn load(&self) -> Result<()> {
        let folders: Vec<Folder> = self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, parent_id, created_at FROM folders ORDER BY rowid",
            )?;

            let folders = stmt
                .query_map([], |row| {
                    let created_str: String = row.get(3)?;
                    Ok(Folder {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        parent_id: row.get(2)?,
                        created_at: parse_time(&created_str),
                    })
                })?
                .filter_map(|r| r.ok())
                .collect();

            Ok(folders)
        })?;

        let bookmarks: Vec<Bookmark> = self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKMARK_COLUMNS} FROM bookmarks ORDER BY rowid"
            ))?;

            let bookmarks = stmt
                .query_map([], row_to_bookmark)?
                .filter_map(|r| r.ok())
                .collect();

            Ok(bookmarks)
        })?;

        tracing::debug!(
            folders = folders.len(),
            bookmarks = bookmarks.len(),
            "Loaded library"
        );

        let mut cache = self.cache.write();
        cache.folders = folders;
        cache.bookmarks = bookmarks;

        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl BookmarkStore for LibraryStore {
    fn add_folder(&self, folder: &Folder) -> Result<String> {
        check_folder(folder)?;

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO folders (id, name, parent_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    folder.id,
                    folder.name,
                    folder.parent_id,
                    format_time(&folder.created_at),
                ],
            )?;
            Ok(())
        })?;

        self.cache.write().folders.push(folder.clone());

        tracing::debug!(folder_id = %folder.id, name = %folder.name, "Stored folder");

        Ok(folder.id.clone())
    }

    fn add_bookmark(&self, bookmark: &Bookmark) -> Result<String> {
        check_bookmark(bookmark)?;
        let tags = serde_json::to_string(&bookmark.tags)?;

        self.db.with_connection(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO bookmarks ({BOOKMARK_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                rusqlite::params![
                    bookmark.id,
                    bookmark.url,
                    bookmark.title,
                    bookmark.description,
                    bookmark.notes,
                    bookmark.folder_id,
                    tags,
                    format_time(&bookmark.created_at),
                    format_time(&bookmark.updated_at),
                    bookmark.favicon_url,
                    bookmark.og_image,
                ],
            )?;
            Ok(())
        })?;

        self.cache.write().bookmarks.push(bookmark.clone());

        tracing::debug!(bookmark_id = %bookmark.id, url = %bookmark.url, "Stored bookmark");

        Ok(bookmark.id.clone())
    }

    fn update_bookmark(&self, bookmark: &Bookmark) -> Result<()> {
        check_bookmark(bookmark)?;
        let tags = serde_json::to_string(&bookmark.tags)?;

        let affected = self.db.with_connection(|conn| {
            let affected = conn.execute(
                "UPDATE bookmarks
                 SET url = ?1, title = ?2, description = ?3, notes = ?4, folder_id = ?5,
                     tags = ?6, created_at = ?7, updated_at = ?8, favicon_url = ?9, og_image = ?10
                 WHERE id = ?11",
                rusqlite::params![
                    bookmark.url,
                    bookmark.title,
                    bookmark.description,
                    bookmark.notes,
                    bookmark.folder_id,
                    tags,
                    format_time(&bookmark.created_at),
                    format_time(&bookmark.updated_at),
                    bookmark.favicon_url,
                    bookmark.og_image,
                    bookmark.id,
                ],
            )?;
            Ok(affected)
        })?;

        if affected == 0 {
            return Err(LibraryError::NotFound(bookmark.id.clone()));
        }

        let mut cache = self.cache.write();
        match cache.bookmarks.iter_mut().find(|b| b.id == bookmark.id) {
            Some(cached) => *cached = bookmark.clone(),
            None => cache.bookmarks.push(bookmark.clone()),
        }

        Ok(())
    }

    fn all_bookmarks(&self) -> Result<Vec<Bookmark>> {
        Ok(self.cache.read().bookmarks.clone())
    }

    fn all_folders(&self) -> Result<Vec<Folder>> {
        Ok(self.cache.read().folders.clone())
    }

    fn find_by_url(&self, url: &str) -> Result<Option<Bookmark>> {
        let bookmark = self.db.with_connection(|conn| {
            let bookmark = conn
                .query_row(
                    &format!(
                        "SELECT {BOOKMARK_COLUMNS} FROM bookmarks
                         WHERE url = ?1 ORDER BY rowid LIMIT 1"
                    ),
                    [url],
                    row_to_bookmark,
                )
                .optional()?;
            Ok(bookmark)
        })?;
        Ok(bookmark)
    }
}

impl Clone for LibraryStore {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            db: self.db.clone(),
        }
    }
}

fn row_to_bookmark(row: &rusqlite::Row<'_>) -> rusqlite::Result<Bookmark> {
    let tags_json: String = row.get(6)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();

    let created_str: String = row.get(7)?;
    let updated_str: String = row.get(8)?;

    Ok(Bookmark {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        notes: row.get(4)?,
        folder_id: row.get(5)?,
        tags,
        created_at: parse_time(&created_str),
        updated_at: parse_time(&updated_str),
        favicon_url: row.get(9)?,
        og_image: row.get(10)?,
    })
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_time(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LibraryStore {
        LibraryStore::new(Database::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_add_and_list() {
        let store = store();
        let folder = Folder::new("Programming", None);
        store.add_folder(&folder).unwrap();

        let mut bookmark = Bookmark::new("https://rust-lang.org", "Rust").in_folder(&folder.id);
        bookmark.tags = vec!["t1".to_string(), "t2".to_string()];
        bookmark.notes = Some("read later".to_string());
        let id = store.add_bookmark(&bookmark).unwrap();
        assert_eq!(id, bookmark.id);

        assert_eq!(store.all_folders().unwrap().len(), 1);
        let bookmarks = store.all_bookmarks().unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].folder_id.as_deref(), Some(folder.id.as_str()));
    }

    #[test]
    fn test_reload_preserves_fields() {
        let store = store();
        let mut bookmark = Bookmark::new("https://example.com", "Example");
        bookmark.tags = vec!["news".to_string()];
        bookmark.description = Some("An example".to_string());
        bookmark.favicon_url = Some("data:image/png;base64,AAAA".to_string());
        store.add_bookmark(&bookmark).unwrap();

        let reopened = LibraryStore::new(store.database().clone()).unwrap();
        let loaded = reopened.all_bookmarks().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].tags, vec!["news".to_string()]);
        assert_eq!(loaded[0].description.as_deref(), Some("An example"));
        assert_eq!(
            loaded[0].created_at.timestamp_millis(),
            bookmark.created_at.timestamp_millis()
        );
    }

    #[test]
    fn test_unknown_parent_folder_is_rejected() {
        let store = store();
        let orphan = Folder::new("Orphan", Some("missing".to_string()));
        assert!(store.add_folder(&orphan).is_err());
        assert!(store.all_folders().unwrap().is_empty());
    }

    #[test]
    fn test_update_and_find_by_url() {
        let store = store();
        let bookmark = Bookmark::new("https://example.com", "Old");
        store.add_bookmark(&bookmark).unwrap();

        let mut updated = bookmark.clone();
        updated.title = "New".to_string();
        store.update_bookmark(&updated).unwrap();

        let found = store.find_by_url("https://example.com").unwrap().unwrap();
        assert_eq!(found.id, bookmark.id);
        assert_eq!(found.title, "New");
        assert_eq!(store.all_bookmarks().unwrap()[0].title, "New");
        assert!(store.find_by_url("https://other.com").unwrap().is_none());
    }

    #[test]
    fn test_update_missing_bookmark() {
        let store = store();
        let bookmark = Bookmark::new("https://example.com", "Ghost");
        assert!(matches!(
            store.update_bookmark(&bookmark),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_url_is_rejected() {
        let store = store();
        let bookmark = Bookmark::new("", "Nothing");
        assert!(matches!(
            store.add_bookmark(&bookmark),
            Err(LibraryError::InvalidRecord(_))
        ));
    }
}
