//! Bookmark record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FolderId, TagId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    /// Unique identifier
    pub id: String,
    /// Target URL, the natural key for duplicate detection
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Containing folder, `None` for root-level bookmarks
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub favicon_url: Option<String>,
    /// Open Graph preview image
    #[serde(default)]
    pub og_image: Option<String>,
}

impl Bookmark {
    /// Create a root-level bookmark with a fresh id, stamped with the current time.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::created_at(url, title, Utc::now())
    }

    /// Create a root-level bookmark with a fresh id and an explicit creation time.
    ///
    /// `updated_at` equals `created_at`.
    pub fn created_at(
        url: impl Into<String>,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: url.into(),
            title: title.into(),
            description: None,
            notes: None,
            folder_id: None,
            tags: Vec::new(),
            created_at,
            updated_at: created_at,
            favicon_url: None,
            og_image: None,
        }
    }

    pub fn in_folder(mut self, folder_id: impl Into<FolderId>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_bookmark() {
        let bookmark = Bookmark::new("https://example.com", "Example");
        assert!(!bookmark.id.is_empty());
        assert!(bookmark.folder_id.is_none());
        assert!(bookmark.tags.is_empty());
        assert_eq!(bookmark.created_at, bookmark.updated_at);
    }

    #[test]
    fn test_json_uses_camel_case_and_millis() {
        let created = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let bookmark = Bookmark::created_at("https://example.com", "Example", created)
            .in_folder("f1");

        let value = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(value["folderId"], "f1");
        assert_eq!(value["createdAt"], 1_700_000_000_123i64);
        assert_eq!(value["updatedAt"], 1_700_000_000_123i64);
        assert!(value["faviconUrl"].is_null());

        let back: Bookmark = serde_json::from_value(value).unwrap();
        assert_eq!(back, bookmark);
    }
}
