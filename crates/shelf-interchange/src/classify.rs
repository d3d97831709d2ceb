//! Duplicate detection against the pre-import record set

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use shelf_library::Bookmark;

/// How an incoming bookmark is reconciled with a stored one sharing its URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateHandling {
    /// Leave the stored record alone and drop the incoming one
    #[default]
    Skip,
    /// Overwrite the stored record, keeping its id
    Replace,
    /// Store the incoming record next to the existing one
    Keep,
}

impl fmt::Display for DuplicateHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DuplicateHandling::Skip => "skip",
            DuplicateHandling::Replace => "replace",
            DuplicateHandling::Keep => "keep",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DuplicateHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(DuplicateHandling::Skip),
            "replace" => Ok(DuplicateHandling::Replace),
            "keep" => Ok(DuplicateHandling::Keep),
            _ => Err(format!("Unknown duplicate handling: {}", s)),
        }
    }
}

/// What the importer does with one parsed bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportAction {
    /// New URL, store it
    Create,
    Skip,
    Replace,
    /// Duplicate URL, store it anyway as a new record
    KeepBoth,
}

/// URL membership snapshot taken once before bookmarks are written.
///
/// Bookmarks imported in the same run are not added to the snapshot, so two
/// entries sharing a URL that is new to the store are both created.
pub struct DuplicateClassifier {
    existing_urls: HashSet<String>,
    mode: DuplicateHandling,
}

impl DuplicateClassifier {
    pub fn new<'a>(existing: impl IntoIterator<Item = &'a Bookmark>, mode: DuplicateHandling) -> Self {
        Self {
            existing_urls: existing.into_iter().map(|b| b.url.clone()).collect(),
            mode,
        }
    }

    pub fn is_duplicate(&self, url: &str) -> bool {
        self.existing_urls.contains(url)
    }

    pub fn classify(&self, bookmark: &Bookmark) -> ImportAction {
        if !self.is_duplicate(&bookmark.url) {
            return ImportAction::Create;
        }

        match self.mode {
            DuplicateHandling::Skip => ImportAction::Skip,
            DuplicateHandling::Replace => ImportAction::Replace,
            DuplicateHandling::Keep => ImportAction::KeepBoth,
        }
    }
}
