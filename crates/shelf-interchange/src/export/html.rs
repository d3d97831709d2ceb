//! Netscape bookmark HTML exporter
//!
//! The output re-imports through [`crate::parse_html`]: folder contents
//! are nested `<DL>` lists, descriptions and notes are `<DD>` lines, and
//! notes carry the [`NOTES_PREFIX`] marker.

use std::collections::{HashMap, HashSet};

use shelf_library::{Bookmark, Folder};

use crate::escape::escape_html;
use crate::parser::NOTES_PREFIX;

const INDENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlExportOptions {
    /// When false every bookmark is written at the root and folder
    /// headings are left out.
    pub include_folders: bool,
}

impl Default for HtmlExportOptions {
    fn default() -> Self {
        Self {
            include_folders: true,
        }
    }
}

pub fn export_html(
    bookmarks: &[Bookmark],
    folders: &[Folder],
    options: &HtmlExportOptions,
) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n");
    out.push_str("<!-- This is an automatically generated file.\n");
    out.push_str("     It will be read and overwritten.\n");
    out.push_str("     DO NOT EDIT! -->\n");
    out.push_str("<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n");
    out.push_str("<TITLE>Bookmarks</TITLE>\n");
    out.push_str("<H1>Bookmarks</H1>\n");
    out.push_str("<DL><p>\n");

    if options.include_folders {
        let tree = FolderTree::new(bookmarks, folders);
        let mut visited = HashSet::new();
        tree.render(None, &mut out, INDENT, &mut visited);
    } else {
        for bookmark in bookmarks {
            render_bookmark(bookmark, &mut out, INDENT);
        }
    }

    out.push_str("</DL><p>\n");
    out
}

/// Folder adjacency plus the bookmarks of each folder, keyed by folder id
/// with `None` for the root.
///
/// Parent and folder links that point at unknown folders, or at folders
/// that are only reachable through a cycle, are treated as root links so
/// every bookmark is still written exactly once.
struct FolderTree<'a> {
    children: HashMap<Option<&'a str>, Vec<&'a Folder>>,
    bookmarks: HashMap<Option<&'a str>, Vec<&'a Bookmark>>,
}

impl<'a> FolderTree<'a> {
    fn new(bookmarks: &'a [Bookmark], folders: &'a [Folder]) -> Self {
        let known: HashSet<&str> = folders.iter().map(|f| f.id.as_str()).collect();

        let mut children: HashMap<Option<&'a str>, Vec<&'a Folder>> = HashMap::new();
        for folder in folders {
            let parent = folder
                .parent_id
                .as_deref()
                .filter(|id| known.contains(id) && *id != folder.id);
            children.entry(parent).or_default().push(folder);
        }

        let reachable = reachable_from_root(&children);
        tracing::debug!(
            folders = folders.len(),
            reachable = reachable.len(),
            "Built folder tree"
        );

        let mut by_folder: HashMap<Option<&'a str>, Vec<&'a Bookmark>> = HashMap::new();
        for bookmark in bookmarks {
            let folder = bookmark
                .folder_id
                .as_deref()
                .filter(|id| reachable.contains(id));
            by_folder.entry(folder).or_default().push(bookmark);
        }

        Self {
            children,
            bookmarks: by_folder,
        }
    }

    fn render(
        &self,
        key: Option<&'a str>,
        out: &mut String,
        indent: usize,
        visited: &mut HashSet<&'a str>,
    ) {
        for bookmark in self.bookmarks.get(&key).into_iter().flatten() {
            render_bookmark(bookmark, out, indent);
        }

        for &folder in self.children.get(&key).into_iter().flatten() {
            if !visited.insert(folder.id.as_str()) {
                continue;
            }

            pad(out, indent);
            out.push_str("<DT><H3 ADD_DATE=\"");
            out.push_str(&folder.created_at.timestamp().to_string());
            out.push_str("\">");
            out.push_str(&escape_html(&folder.name));
            out.push_str("</H3>\n");

            pad(out, indent);
            out.push_str("<DL><p>\n");
            self.render(Some(folder.id.as_str()), out, indent + INDENT, visited);
            pad(out, indent);
            out.push_str("</DL><p>\n");
        }
    }
}

fn reachable_from_root<'a>(children: &HashMap<Option<&'a str>, Vec<&'a Folder>>) -> HashSet<&'a str> {
    let mut reachable = HashSet::new();
    let mut pending: Vec<Option<&'a str>> = vec![None];

    while let Some(key) = pending.pop() {
        for &folder in children.get(&key).into_iter().flatten() {
            if reachable.insert(folder.id.as_str()) {
                pending.push(Some(folder.id.as_str()));
            }
        }
    }

    reachable
}

fn render_bookmark(bookmark: &Bookmark, out: &mut String, indent: usize) {
    pad(out, indent);
    out.push_str("<DT><A HREF=\"");
    out.push_str(&escape_html(&bookmark.url));
    out.push_str("\" ADD_DATE=\"");
    out.push_str(&bookmark.created_at.timestamp().to_string());
    out.push_str("\" LAST_MODIFIED=\"");
    out.push_str(&bookmark.updated_at.timestamp().to_string());
    out.push('"');
    if let Some(icon) = bookmark.favicon_url.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(" ICON=\"");
        out.push_str(&escape_html(icon));
        out.push('"');
    }
    out.push('>');
    out.push_str(&escape_html(&bookmark.title));
    out.push_str("</A>\n");

    if let Some(description) = bookmark.description.as_deref().filter(|s| !s.is_empty()) {
        pad(out, indent);
        out.push_str("<DD>");
        out.push_str(&escape_html(description));
        out.push('\n');
    }

    if let Some(notes) = bookmark.notes.as_deref().filter(|s| !s.is_empty()) {
        pad(out, indent);
        out.push_str("<DD>");
        out.push_str(NOTES_PREFIX);
        out.push_str(&escape_html(notes));
        out.push('\n');
    }
}

fn pad(out: &mut String, n: usize) {
    for _ in 0..n {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn fixture() -> (Vec<Bookmark>, Vec<Folder>) {
        let created = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let programming = Folder::created_at("Programming", None, created);
        let rust = Folder::created_at("Rust", Some(programming.id.clone()), created);

        let mut book = Bookmark::created_at("https://doc.rust-lang.org/book/", "The Book", created)
            .in_folder(&rust.id);
        book.description = Some("Official guide".to_string());
        book.notes = Some("chapter 10".to_string());
        book.favicon_url = Some("data:image/png;base64,AAAA".to_string());

        let root = Bookmark::created_at("https://example.com", "Example", created);

        (vec![book, root], vec![programming, rust])
    }

    #[test]
    fn test_structure() {
        let (bookmarks, folders) = fixture();
        let html = export_html(&bookmarks, &folders, &HtmlExportOptions::default());

        assert!(html.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n"));
        assert!(html.contains(
            "    <DT><A HREF=\"https://example.com\" ADD_DATE=\"1700000000\" LAST_MODIFIED=\"1700000000\">Example</A>\n"
        ));
        assert!(html.contains("    <DT><H3 ADD_DATE=\"1700000000\">Programming</H3>\n"));
        assert!(html.contains("        <DT><H3 ADD_DATE=\"1700000000\">Rust</H3>\n"));
        assert!(html.contains("ICON=\"data:image/png;base64,AAAA\""));
        assert!(html.contains("            <DD>Official guide\n"));
        assert!(html.contains("            <DD>Notes: chapter 10\n"));

        // Root bookmarks come before root folders
        let example = html.find("Example</A>").unwrap();
        let programming = html.find(">Programming</H3>").unwrap();
        assert!(example < programming);
        assert!(html.ends_with("</DL><p>\n"));
    }

    #[test]
    fn test_flat_export() {
        let (bookmarks, folders) = fixture();
        let options = HtmlExportOptions {
            include_folders: false,
        };
        let html = export_html(&bookmarks, &folders, &options);

        assert!(!html.contains("<H3"));
        assert_eq!(html.matches("<DT><A ").count(), 2);
        assert_eq!(html.matches("<DL><p>").count(), 1);
    }

    #[test]
    fn test_escapes_text() {
        let bookmark = Bookmark::new(
            "https://example.com/?q=\"x\"&y=<z>",
            r#"<script>alert("x")</script>"#,
        );
        let html = export_html(&[bookmark], &[], &HtmlExportOptions::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"));
        assert!(html.contains("HREF=\"https://example.com/?q=&quot;x&quot;&amp;y=&lt;z&gt;\""));
    }

    #[test]
    fn test_cyclic_folders_terminate() {
        let mut a = Folder::new("A", None);
        let mut b = Folder::new("B", None);
        a.parent_id = Some(b.id.clone());
        b.parent_id = Some(a.id.clone());
        let inside = Bookmark::new("https://cycle.example.com", "Inside").in_folder(&a.id);

        let html = export_html(&[inside], &[a, b], &HtmlExportOptions::default());
        assert!(!html.contains("<H3"));
        assert_eq!(html.matches("Inside</A>").count(), 1);
    }

    #[test]
    fn test_unknown_folder_falls_back_to_root() {
        let orphan = Bookmark::new("https://orphan.example.com", "Orphan").in_folder("gone");
        let html = export_html(&[orphan], &[], &HtmlExportOptions::default());
        assert!(html.contains("    <DT><A HREF=\"https://orphan.example.com\""));
    }

    #[test]
    fn test_empty_folder_is_written() {
        let empty = Folder::new("Empty", None);
        let html = export_html(&[], &[empty], &HtmlExportOptions::default());
        assert!(html.contains(">Empty</H3>\n    <DL><p>\n    </DL><p>\n"));
    }
}
