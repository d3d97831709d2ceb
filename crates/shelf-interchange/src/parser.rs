//! Netscape bookmark file parser
//!
//! The format encodes its tree in a definition list: `<DT><H3>` entries are
//! folders, `<DT><A>` entries are bookmarks and `<DD>` entries after an
//! anchor carry its description or notes. A folder's own `<DL>` is either
//! nested in its `<DT>` (what an HTML5 parser produces for browser exports)
//! or the next sibling of it. Firefox also writes a `<DD>` folder description
//! after the heading, and the contents list then ends up inside that `<DD>`.
//! All of these are normalized here into explicit `parent_id`/`folder_id`
//! links.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use shelf_library::{Bookmark, Folder};

use crate::error::InterchangeError;
use crate::Result;

/// Prefix marking a `<DD>` line as notes rather than a description.
pub const NOTES_PREFIX: &str = "Notes: ";

const MAX_DEPTH: usize = 512;
const UNNAMED_FOLDER: &str = "Unnamed Folder";
const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub bookmarks: Vec<Bookmark>,
    pub folders: Vec<Folder>,
    pub errors: Vec<String>,
}

impl ParseResult {
    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty() && self.folders.is_empty()
    }
}

/// Parse a Netscape bookmark file.
///
/// Never fails: rejected entries and internal problems are reported in
/// `errors`, next to everything that was parsed before them.
pub fn parse_html(html: &str) -> ParseResult {
    let document = Html::parse_document(html);

    let root = match Selector::parse("dl") {
        Ok(selector) => document.select(&selector).next(),
        Err(_) => None,
    };

    let Some(root) = root else {
        return ParseResult {
            errors: vec![InterchangeError::InvalidFile("No bookmark list found".to_string())
                .to_string()],
            ..ParseResult::default()
        };
    };

    let mut walker = Walker::new(Utc::now());
    if let Err(e) = walker.walk_list(root, None, 0) {
        tracing::warn!(error = %e, "Bookmark walk stopped early");
        walker
            .result
            .errors
            .push(format!("Unexpected error while parsing bookmarks: {}", e));
    }

    tracing::debug!(
        bookmarks = walker.result.bookmarks.len(),
        folders = walker.result.folders.len(),
        errors = walker.result.errors.len(),
        "Parsed bookmark file"
    );

    walker.result
}

/// Only web URLs may become bookmarks.
pub(crate) fn is_web_url(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

struct Walker {
    result: ParseResult,
    /// Fallback timestamp for entries without ADD_DATE
    now: DateTime<Utc>,
}

impl Walker {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            result: ParseResult::default(),
            now,
        }
    }

    /// Walk the entries of one `<DL>`. `parent` is the folder every entry at
    /// this level belongs to.
    fn walk_list(&mut self, list: ElementRef<'_>, parent: Option<&str>, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(InterchangeError::NestingTooDeep(MAX_DEPTH));
        }

        let entries: Vec<ElementRef<'_>> = list.children().filter_map(ElementRef::wrap).collect();

        let mut index = 0;
        while index < entries.len() {
            let entry = entries[index];
            index += 1;

            match entry.value().name() {
                "dt" => match first_child_element(entry) {
                    Some(heading) if is_heading(heading) => {
                        index += self.folder(entry, heading, &entries[index..], parent, depth)?;
                    }
                    Some(anchor) if anchor.value().name() == "a" => {
                        self.bookmark(entry, anchor, parent);
                    }
                    _ => {}
                },
                // A list not claimed by a folder heading belongs to the current level
                "dl" => self.walk_list(entry, parent, depth + 1)?,
                // Same for a list wrapped in a description
                "dd" => {
                    if let Some(list) = child_list(entry) {
                        self.walk_list(list, parent, depth + 1)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Record a folder and walk its contents. `following` are the entries
    /// after this one; returns how many of them held the contents and must
    /// be skipped by the caller.
    fn folder(
        &mut self,
        entry: ElementRef<'_>,
        heading: ElementRef<'_>,
        following: &[ElementRef<'_>],
        parent: Option<&str>,
        depth: usize,
    ) -> Result<usize> {
        let name = element_text(heading);
        let name = if name.is_empty() {
            UNNAMED_FOLDER.to_string()
        } else {
            name
        };

        let created_at = self.timestamp(heading.value().attr("add_date"));
        let folder = Folder::created_at(name, parent.map(str::to_string), created_at);
        let folder_id = folder.id.clone();

        tracing::debug!(folder_id = %folder.id, name = %folder.name, "Parsed folder");
        self.result.folders.push(folder);

        let (contents, consumed) = match child_list(entry) {
            Some(list) => (Some(list), 0),
            None => contents_after(following),
        };

        if let Some(list) = contents {
            self.walk_list(list, Some(&folder_id), depth + 1)?;
        }
        Ok(consumed)
    }

    fn bookmark(&mut self, entry: ElementRef<'_>, anchor: ElementRef<'_>, parent: Option<&str>) {
        let href = anchor.value().attr("href").unwrap_or("").trim();
        let title = element_text(anchor);
        let title = if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title
        };

        if href.is_empty() {
            tracing::warn!(title = %title, "Skipping bookmark without URL");
            self.result
                .errors
                .push(format!("Skipped bookmark \"{}\": missing URL", title));
            return;
        }

        if !is_web_url(href) {
            tracing::warn!(title = %title, url = %href, "Skipping bookmark with unsafe URL");
            self.result.errors.push(format!(
                "Skipped bookmark \"{}\": unsupported URL scheme ({})",
                title, href
            ));
            return;
        }

        let created_at = self.timestamp(anchor.value().attr("add_date"));
        let mut bookmark = Bookmark::created_at(href, title, created_at);
        bookmark.folder_id = parent.map(str::to_string);
        bookmark.favicon_url = anchor
            .value()
            .attr("icon")
            .map(str::trim)
            .filter(|icon| !icon.is_empty())
            .map(str::to_string);

        let descriptions = entry
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|sibling| sibling.value().name() == "dd");

        for dd in descriptions {
            let text = dd.text().collect::<String>();
            let text = text.trim_start();

            if let Some(notes) = text.strip_prefix(NOTES_PREFIX) {
                let notes = notes.trim();
                if bookmark.notes.is_none() && !notes.is_empty() {
                    bookmark.notes = Some(notes.to_string());
                }
            } else {
                let description = text.trim();
                if bookmark.description.is_none() && !description.is_empty() {
                    bookmark.description = Some(description.to_string());
                }
            }
        }

        self.result.bookmarks.push(bookmark);
    }

    /// ADD_DATE is epoch seconds; anything unreadable falls back to now.
    fn timestamp(&self, value: Option<&str>) -> DateTime<Utc> {
        value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(self.now)
    }
}

/// Locate a folder's contents among the entries after its heading: a
/// sibling `<DL>`, a `<DD>` holding the `<DL>`, or a `<DD>` followed by the
/// `<DL>`. Also returns how many entries that spans.
fn contents_after<'a>(following: &[ElementRef<'a>]) -> (Option<ElementRef<'a>>, usize) {
    match following.first() {
        Some(&next) if next.value().name() == "dl" => (Some(next), 1),
        Some(&next) if next.value().name() == "dd" => {
            if let Some(list) = child_list(next) {
                return (Some(list), 1);
            }
            match following.get(1) {
                Some(&list) if list.value().name() == "dl" => (Some(list), 2),
                _ => (None, 0),
            }
        }
        _ => (None, 0),
    }
}

fn child_list(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "dl")
}

fn first_child_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.children().find_map(ElementRef::wrap)
}

fn is_heading(element: ElementRef<'_>) -> bool {
    matches!(
        element.value().name(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
