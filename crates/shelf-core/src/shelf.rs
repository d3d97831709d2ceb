//! Main library state container

use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use shelf_interchange::{
    export_csv, export_html, export_json, ExportFormat, HtmlExportOptions, ImportOptions,
    ImportResult, Importer, JsonExportOptions,
};
use shelf_library::{Bookmark, BookmarkStore, Folder, LibraryStore, TagId};
use shelf_storage::Database;

use crate::config::Config;
use crate::Result;

/// Settings key holding the tag id to display name map, as a JSON object.
pub const TAG_NAMES_SETTING: &str = "tag_names";

/// A bookmark library on disk, with import and export.
///
/// Imports take `&self`; running two at once against the same library is
/// left to the caller to avoid.
pub struct Shelf {
    config: Config,
    db: Database,
    library: LibraryStore,
}

impl Shelf {
    /// Open (or create) the library described by `config`.
    pub fn open(config: Config) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Self::with_database(config, db)
    }

    /// Use an already opened database, e.g. `Database::open_in_memory()`.
    pub fn with_database(config: Config, db: Database) -> Result<Self> {
        let library = LibraryStore::new(db.clone())?;

        tracing::info!(
            database = %config.database_path.display(),
            "Library opened"
        );

        Ok(Self {
            config,
            db,
            library,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn library(&self) -> &LibraryStore {
        &self.library
    }

    pub fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        Ok(self.library.all_bookmarks()?)
    }

    pub fn folders(&self) -> Result<Vec<Folder>> {
        Ok(self.library.all_folders()?)
    }

    // === Import ===

    pub fn import_html(
        &self,
        html: &str,
        on_progress: impl FnMut(usize, usize),
    ) -> ImportResult {
        self.importer().on_progress(on_progress).import_html(html)
    }

    pub fn import_file<P: AsRef<Path>>(
        &self,
        path: P,
        on_progress: impl FnMut(usize, usize),
    ) -> ImportResult {
        tracing::info!(path = %path.as_ref().display(), "Importing bookmark file");
        self.importer().on_progress(on_progress).import_path(path)
    }

    pub fn import_json(&self, json: &str) -> ImportResult {
        self.importer().import_json(json)
    }

    fn importer(&self) -> Importer<'_, LibraryStore> {
        let options = ImportOptions {
            duplicate_handling: self.config.duplicate_handling,
        };
        Importer::new(&self.library).with_options(options)
    }

    // === Export ===

    pub fn export(&self, format: ExportFormat) -> Result<String> {
        let bookmarks = self.library.all_bookmarks()?;
        let folders = self.library.all_folders()?;

        let content = match format {
            ExportFormat::Html => {
                let options = HtmlExportOptions {
                    include_folders: self.config.include_folders,
                };
                export_html(&bookmarks, &folders, &options)
            }
            ExportFormat::Json => {
                export_json(&bookmarks, &folders, &JsonExportOptions::default())?
            }
            ExportFormat::Csv => export_csv(&bookmarks, &folders, &self.tag_names()?)?,
        };

        tracing::info!(
            format = %format,
            bookmarks = bookmarks.len(),
            folders = folders.len(),
            "Exported bookmarks"
        );

        Ok(content)
    }

    /// Export into `export_dir` as `bookmarks-YYYY-MM-DD.<ext>`, replacing a
    /// file of that name from earlier the same day.
    pub fn export_to_file(&self, format: ExportFormat) -> Result<PathBuf> {
        let content = self.export(format)?;

        fs::create_dir_all(&self.config.export_dir)?;
        let file_name = format!(
            "bookmarks-{}.{}",
            Utc::now().format("%Y-%m-%d"),
            format.extension()
        );
        let path = self.config.export_dir.join(file_name);
        fs::write(&path, content)?;

        tracing::info!(path = %path.display(), "Wrote export file");
        Ok(path)
    }

    // === Tags ===

    pub fn tag_names(&self) -> Result<HashMap<TagId, String>> {
        Ok(self.db.get_json(TAG_NAMES_SETTING)?.unwrap_or_default())
    }

    pub fn set_tag_names(&self, names: &HashMap<TagId, String>) -> Result<()> {
        self.db.set_json(TAG_NAMES_SETTING, names)?;
        Ok(())
    }
}
