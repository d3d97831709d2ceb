//! Import orchestration
//!
//! Folders are written before bookmarks because bookmarks reference folder
//! ids that must already exist in the store. Writes are issued one at a
//! time; a failed write is recorded and the run moves on.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use uuid::Uuid;

use shelf_library::{Bookmark, BookmarkStore};

use crate::classify::{DuplicateClassifier, DuplicateHandling, ImportAction};
use crate::error::InterchangeError;
use crate::export::json::parse_json;
use crate::parser::{parse_html, ParseResult};
use crate::validate::{validate, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    #[serde(default)]
    pub duplicate_handling: DuplicateHandling,
}

/// Outcome of one import run. Counters only ever grow during the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub bookmarks_imported: usize,
    pub folders_imported: usize,
    pub bookmarks_skipped: usize,
    pub bookmarks_replaced: usize,
    pub errors: Vec<String>,
}

impl ImportResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }
}

type ProgressFn<'a> = Box<dyn FnMut(usize, usize) + 'a>;

/// Imports bookmark files into a [`BookmarkStore`].
///
/// ```no_run
/// use shelf_interchange::{DuplicateHandling, Importer};
/// use shelf_library::MemoryStore;
///
/// let store = MemoryStore::new();
/// let result = Importer::new(&store)
///     .duplicate_handling(DuplicateHandling::Replace)
///     .on_progress(|current, total| println!("{current}/{total}"))
///     .import_path("bookmarks.html");
/// println!("{} imported", result.bookmarks_imported);
/// ```
pub struct Importer<'a, S: BookmarkStore + ?Sized> {
    store: &'a S,
    options: ImportOptions,
    on_progress: Option<ProgressFn<'a>>,
}

impl<'a, S: BookmarkStore + ?Sized> Importer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            options: ImportOptions::default(),
            on_progress: None,
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn duplicate_handling(mut self, mode: DuplicateHandling) -> Self {
        self.options.duplicate_handling = mode;
        self
    }

    /// Called with `(current, total)` after every folder and bookmark
    /// write attempt, `current` counting from 1.
    pub fn on_progress(mut self, callback: impl FnMut(usize, usize) + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Import a Netscape bookmark HTML document.
    pub fn import_html(&mut self, html: &str) -> ImportResult {
        if let Err(e) = validate(html) {
            tracing::warn!(error = %e, "Rejected bookmark file");
            return ImportResult::failed(e.to_string());
        }

        let parsed = parse_html(html);
        self.apply(parsed)
    }

    /// Import a Shelf JSON export. Record ids are taken from the file.
    pub fn import_json(&mut self, json: &str) -> ImportResult {
        if json.trim().is_empty() {
            return ImportResult::failed(ValidationError::Empty.to_string());
        }

        let parsed = parse_json(json);
        self.apply(parsed)
    }

    /// Read an HTML bookmark file from `reader` and import it.
    pub fn import_reader<R: Read>(&mut self, mut reader: R) -> ImportResult {
        let mut html = String::new();
        if let Err(e) = reader.read_to_string(&mut html) {
            tracing::warn!(error = %e, "Failed to read bookmark file");
            return ImportResult::failed(InterchangeError::Io(e).to_string());
        }
        self.import_html(&html)
    }

    /// Open the HTML bookmark file at `path` and import it.
    pub fn import_path<P: AsRef<Path>>(&mut self, path: P) -> ImportResult {
        match File::open(path.as_ref()) {
            Ok(file) => self.import_reader(file),
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), error = %e, "Failed to open bookmark file");
                ImportResult::failed(InterchangeError::Io(e).to_string())
            }
        }
    }

    fn apply(&mut self, parsed: ParseResult) -> ImportResult {
        let ParseResult {
            bookmarks,
            folders,
            errors,
        } = parsed;

        let mut result = ImportResult {
            errors,
            ..ImportResult::default()
        };

        if bookmarks.is_empty() && folders.is_empty() {
            result
                .errors
                .push("No bookmarks or folders found in file".to_string());
            return result;
        }

        let total = folders.len() + bookmarks.len();

        for (index, folder) in folders.iter().enumerate() {
            match self.store.add_folder(folder) {
                Ok(_) => result.folders_imported += 1,
                Err(e) => {
                    tracing::warn!(folder = %folder.name, error = %e, "Failed to import folder");
                    result
                        .errors
                        .push(format!("Failed to import folder \"{}\": {}", folder.name, e));
                }
            }
            self.report(index + 1, total);
        }

        let existing = match self.store.all_bookmarks() {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read existing bookmarks");
                result
                    .errors
                    .push(format!("Failed to read existing bookmarks: {}", e));
                Vec::new()
            }
        };
        let classifier = DuplicateClassifier::new(&existing, self.options.duplicate_handling);

        for (index, bookmark) in bookmarks.into_iter().enumerate() {
            let action = classifier.classify(&bookmark);
            tracing::debug!(url = %bookmark.url, ?action, "Classified bookmark");

            if let Err(e) = self.write_bookmark(bookmark.clone(), action, &mut result) {
                tracing::warn!(title = %bookmark.title, error = %e, "Failed to import bookmark");
                result.errors.push(format!(
                    "Failed to import bookmark \"{}\": {}",
                    bookmark.title, e
                ));
            }
            self.report(folders.len() + index + 1, total);
        }

        tracing::info!(
            bookmarks_imported = result.bookmarks_imported,
            folders_imported = result.folders_imported,
            bookmarks_skipped = result.bookmarks_skipped,
            bookmarks_replaced = result.bookmarks_replaced,
            errors = result.errors.len(),
            "Import finished"
        );

        result
    }

    fn write_bookmark(
        &self,
        bookmark: Bookmark,
        action: ImportAction,
        result: &mut ImportResult,
    ) -> Result<(), InterchangeError> {
        match action {
            ImportAction::Create => {
                self.store.add_bookmark(&bookmark)?;
                result.bookmarks_imported += 1;
            }
            ImportAction::Skip => {
                result.bookmarks_skipped += 1;
            }
            ImportAction::Replace => {
                let Some(existing) = self.store.find_by_url(&bookmark.url)? else {
                    tracing::debug!(url = %bookmark.url, "Duplicate vanished before replace");
                    return Ok(());
                };
                let replacement = Bookmark {
                    id: existing.id,
                    ..bookmark
                };
                self.store.update_bookmark(&replacement)?;
                result.bookmarks_replaced += 1;
            }
            ImportAction::KeepBoth => {
                // Ids from a JSON export may belong to the record being duplicated
                let copy = Bookmark {
                    id: Uuid::new_v4().to_string(),
                    ..bookmark
                };
                self.store.add_bookmark(&copy)?;
                result.bookmarks_imported += 1;
            }
        }
        Ok(())
    }

    fn report(&mut self, current: usize, total: usize) {
        if let Some(callback) = self.on_progress.as_mut() {
            callback(current, total);
        }
    }
}
