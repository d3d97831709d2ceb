//! Database connection and operations

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::Result;

/// Shared handle to the Shelf SQLite database.
///
/// Cloning is cheap; all clones serialize on the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file. File databases use the WAL journal.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        let db = Self::prepare(conn)?;
        tracing::debug!(path = %path.display(), "Opened database");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    /// Common setup for every connection: enforce the folder and bookmark
    /// references, then bring the schema up to date.
    fn prepare(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| {
            let value = conn
                .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, value, updated_at],
            )?;
            Ok(())
        })
    }

    /// Read a setting stored as JSON. `None` when the key was never set.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_setting(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set_setting(key, &serde_json::to_string(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let folders: i32 =
                conn.query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))?;
            let bookmarks: i32 =
                conn.query_row("SELECT COUNT(*) FROM bookmarks", [], |row| row.get(0))?;
            assert_eq!(folders, 0);
            assert_eq!(bookmarks, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_settings() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_setting("tag_names").unwrap(), None);

        db.set_setting("tag_names", "{}").unwrap();
        db.set_setting("tag_names", "{\"t1\":\"rust\"}").unwrap();
        assert_eq!(
            db.get_setting("tag_names").unwrap().as_deref(),
            Some("{\"t1\":\"rust\"}")
        );
    }

    #[test]
    fn test_json_settings() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_json::<Vec<String>>("order").unwrap(), None);

        db.set_json("order", &["b", "a"]).unwrap();
        assert_eq!(
            db.get_json::<Vec<String>>("order").unwrap(),
            Some(vec!["b".to_string(), "a".to_string()])
        );

        db.set_setting("order", "not json").unwrap();
        assert!(matches!(
            db.get_json::<Vec<String>>("order"),
            Err(crate::StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_folder_parent_must_exist() {
        let db = Database::open_in_memory().unwrap();
        let result = db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO folders (id, name, parent_id, created_at) VALUES ('a', 'A', 'missing', '')",
                [],
            )?;
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.db");

        {
            let db = Database::open(&path).unwrap();
            db.set_setting("k", "v").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_setting("k").unwrap().as_deref(), Some("v"));
        db.with_connection(|conn| {
            let fk: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
            assert_eq!(fk, 1);
            Ok(())
        })
        .unwrap();
    }
}
