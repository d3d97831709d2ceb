//! Shelf Interchange
//!
//! Moves bookmarks in and out of the library:
//! - Import: Netscape bookmark HTML (and Shelf JSON exports) are validated,
//!   parsed into a `parent_id`-linked folder forest, checked for duplicate
//!   URLs and written to a [`BookmarkStore`] folders first.
//! - Export: the folder forest and bookmark set render to Netscape HTML,
//!   JSON or CSV.
//!
//! Import never fails outright. Every problem ends up as a message in the
//! returned error list next to whatever could be salvaged.

mod classify;
mod error;
pub mod escape;
mod export;
mod import;
mod parser;
mod validate;

pub use classify::{DuplicateClassifier, DuplicateHandling, ImportAction};
pub use error::InterchangeError;
pub use export::csv::{export_csv, CSV_HEADER};
pub use export::html::{export_html, HtmlExportOptions};
pub use export::json::{export_json, parse_json, JsonExportOptions, EXPORT_VERSION};
pub use export::ExportFormat;
pub use import::{ImportOptions, ImportResult, Importer};
pub use parser::{parse_html, ParseResult, NOTES_PREFIX};
pub use validate::{validate, ValidationError};

pub use shelf_library::{Bookmark, BookmarkStore, Folder};

pub type Result<T> = std::result::Result<T, InterchangeError>;
