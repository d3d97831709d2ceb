//! JSON export envelope
//!
//! The only format that keeps every field, so it also reads back in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelf_library::{Bookmark, Folder};

use crate::error::InterchangeError;
use crate::parser::{is_web_url, ParseResult};
use crate::Result;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonExportOptions {
    pub pretty: bool,
}

impl Default for JsonExportOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportEnvelope<'a> {
    version: &'a str,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    exported_at: DateTime<Utc>,
    bookmarks: &'a [Bookmark],
    folders: &'a [Folder],
}

#[derive(Deserialize)]
struct ImportEnvelope {
    version: String,
    #[serde(default)]
    bookmarks: Vec<Bookmark>,
    #[serde(default)]
    folders: Vec<Folder>,
}

pub fn export_json(
    bookmarks: &[Bookmark],
    folders: &[Folder],
    options: &JsonExportOptions,
) -> Result<String> {
    let envelope = ExportEnvelope {
        version: EXPORT_VERSION,
        exported_at: Utc::now(),
        bookmarks,
        folders,
    };

    let json = if options.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    Ok(json)
}

/// Read a JSON export back into parse form.
///
/// Like the HTML parser this never fails; a bad envelope yields empty
/// collections and a single error.
pub fn parse_json(content: &str) -> ParseResult {
    let envelope = match decode(content) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected JSON export");
            return ParseResult {
                errors: vec![e.to_string()],
                ..ParseResult::default()
            };
        }
    };

    let mut result = ParseResult {
        folders: envelope.folders,
        ..ParseResult::default()
    };

    for bookmark in envelope.bookmarks {
        if is_web_url(&bookmark.url) {
            result.bookmarks.push(bookmark);
        } else {
            result.errors.push(format!(
                "Skipped bookmark \"{}\": unsupported URL scheme ({})",
                bookmark.title, bookmark.url
            ));
        }
    }

    result
}

fn decode(content: &str) -> Result<ImportEnvelope> {
    let envelope: ImportEnvelope = serde_json::from_str(content)?;
    if envelope.version != EXPORT_VERSION {
        return Err(InterchangeError::UnsupportedVersion(envelope.version));
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope() {
        // Whole milliseconds, the precision the envelope keeps
        let created = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let folder = Folder::created_at("Reading", None, created);
        let mut bookmark =
            Bookmark::created_at("https://example.com", "Example", created).in_folder(&folder.id);
        bookmark.tags = vec!["t1".to_string()];
        bookmark.og_image = Some("https://example.com/og.png".to_string());

        let before = Utc::now().timestamp_millis();
        let json = export_json(&[bookmark.clone()], &[folder.clone()], &JsonExportOptions::default())
            .unwrap();
        assert!(json.contains("\n  \"version\": \"1.0\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["exportedAt"].as_i64().unwrap() >= before);
        assert_eq!(value["bookmarks"][0]["tags"][0], "t1");
        assert_eq!(value["bookmarks"][0]["ogImage"], "https://example.com/og.png");
        assert_eq!(value["folders"][0]["name"], "Reading");

        let parsed = parse_json(&json);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.bookmarks, vec![bookmark]);
        assert_eq!(parsed.folders, vec![folder]);
    }

    #[test]
    fn test_compact() {
        let json = export_json(&[], &[], &JsonExportOptions { pretty: false }).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_rejects_other_versions() {
        let parsed = parse_json(r#"{"version":"2.0","bookmarks":[],"folders":[]}"#);
        assert!(parsed.is_empty());
        assert_eq!(parsed.errors, vec!["Unsupported export version: 2.0".to_string()]);
    }

    #[test]
    fn test_malformed_json() {
        let parsed = parse_json("{not json");
        assert!(parsed.is_empty());
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].starts_with("JSON error:"));
    }

    #[test]
    fn test_drops_unsafe_urls() {
        let json = r#"{
            "version": "1.0",
            "bookmarks": [
                {"id": "1", "url": "javascript:alert(1)", "title": "Bad", "createdAt": 0, "updatedAt": 0},
                {"id": "2", "url": "https://ok.example.com", "title": "Ok", "createdAt": 0, "updatedAt": 0}
            ]
        }"#;
        let parsed = parse_json(json);
        assert_eq!(parsed.bookmarks.len(), 1);
        assert_eq!(parsed.bookmarks[0].id, "2");
        assert_eq!(parsed.errors.len(), 1);
    }
}
