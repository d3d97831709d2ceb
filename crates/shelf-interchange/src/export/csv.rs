//! CSV exporter

use chrono::SecondsFormat;
use std::collections::{HashMap, HashSet};

use shelf_library::{Bookmark, Folder, TagId};

use crate::Result;

pub const CSV_HEADER: &str = "URL,Title,Folder,Tags,Description,Notes,Created At";

const COLUMNS: [&str; 7] = [
    "URL",
    "Title",
    "Folder",
    "Tags",
    "Description",
    "Notes",
    "Created At",
];

/// One row per bookmark under [`CSV_HEADER`], each record ending in `\n`.
///
/// `tag_names` maps tag ids to display names; ids without an entry are
/// written as-is. Fields are only quoted when they need it.
pub fn export_csv(
    bookmarks: &[Bookmark],
    folders: &[Folder],
    tag_names: &HashMap<TagId, String>,
) -> Result<String> {
    let by_id: HashMap<&str, &Folder> = folders.iter().map(|f| (f.id.as_str(), f)).collect();

    let mut buf = Vec::new();
    {
        let mut wtr = csv::WriterBuilder::new().from_writer(&mut buf);
        wtr.write_record(COLUMNS)?;

        for bookmark in bookmarks {
            let folder = bookmark
                .folder_id
                .as_deref()
                .map(|id| folder_path(id, &by_id))
                .unwrap_or_default();

            let tags = bookmark
                .tags
                .iter()
                .map(|id| tag_names.get(id).map(String::as_str).unwrap_or(id))
                .collect::<Vec<_>>()
                .join(", ");

            let created_at = bookmark
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true);

            wtr.write_record([
                bookmark.url.as_str(),
                bookmark.title.as_str(),
                folder.as_str(),
                tags.as_str(),
                bookmark.description.as_deref().unwrap_or(""),
                bookmark.notes.as_deref().unwrap_or(""),
                created_at.as_str(),
            ])?;
        }

        wtr.flush().map_err(csv::Error::from)?;
    }

    tracing::debug!(rows = bookmarks.len(), "Wrote CSV export");
    Ok(String::from_utf8(buf)?)
}

/// Slash-joined folder names from the root down to `folder_id`.
///
/// An unknown id yields an empty path; a repeated folder ends the walk.
fn folder_path(folder_id: &str, by_id: &HashMap<&str, &Folder>) -> String {
    let mut names = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(folder_id);

    while let Some(id) = current {
        let Some(folder) = by_id.get(id) else { break };
        if !seen.insert(id) {
            break;
        }
        names.push(folder.name.as_str());
        current = folder.parent_id.as_deref();
    }

    names.reverse();
    names.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_rows() {
        let created = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let programming = Folder::new("Programming", None);
        let js = Folder::new("JavaScript", Some(programming.id.clone()));

        let mut bookmark = Bookmark::created_at("https://developer.mozilla.org", "MDN", created)
            .in_folder(&js.id);
        bookmark.tags = vec!["t1".to_string(), "t2".to_string()];
        bookmark.description = Some("Docs".to_string());

        let tag_names = HashMap::from([("t1".to_string(), "web".to_string())]);
        let csv = export_csv(&[bookmark], &[programming, js], &tag_names).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "https://developer.mozilla.org,MDN,Programming/JavaScript,\"web, t2\",Docs,,2023-11-14T22:13:20.000Z"
        );
    }

    #[test]
    fn test_quoting() {
        let bookmark = Bookmark::new("https://example.com", r#"Site, "quoted""#);
        let csv = export_csv(&[bookmark], &[], &HashMap::new()).unwrap();
        assert!(csv.contains(r#","Site, ""quoted""","#));
    }

    #[test]
    fn test_line_breaks_are_quoted() {
        let mut bookmark = Bookmark::new("https://example.com", "Example");
        bookmark.notes = Some("first\r\nsecond".to_string());
        let csv = export_csv(&[bookmark], &[], &HashMap::new()).unwrap();
        assert!(csv.contains(",\"first\r\nsecond\","));
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = export_csv(&[], &[], &HashMap::new()).unwrap();
        assert_eq!(csv, format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_unknown_folder_is_blank() {
        let bookmark = Bookmark::new("https://example.com", "Example").in_folder("gone");
        let csv = export_csv(&[bookmark], &[], &HashMap::new()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("https://example.com,Example,,"));
    }

    #[test]
    fn test_cyclic_path_terminates() {
        let mut a = Folder::new("A", None);
        let mut b = Folder::new("B", None);
        a.parent_id = Some(b.id.clone());
        b.parent_id = Some(a.id.clone());
        let bookmark = Bookmark::new("https://example.com", "Example").in_folder(&a.id);

        let csv = export_csv(&[bookmark], &[a, b], &HashMap::new()).unwrap();
        assert!(csv.contains(",B/A,"));
    }
}
