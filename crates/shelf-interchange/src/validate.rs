//! Cheap structural sniff run before parsing

use thiserror::Error;

const NETSCAPE_DOCTYPE: &str = "<!doctype netscape-bookmark-file-1>";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File is empty")]
    Empty,

    #[error("File does not appear to be a valid bookmark HTML file")]
    NotBookmarkFile,
}

/// Accept content that carries the Netscape doctype or an `<html` tag.
///
/// This is not a grammar check; anything that passes still goes through
/// the parser's own tolerance.
pub fn validate(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let lower = content.to_ascii_lowercase();
    if lower.contains(NETSCAPE_DOCTYPE) || lower.contains("<html") {
        Ok(())
    } else {
        Err(ValidationError::NotBookmarkFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(validate(""), Err(ValidationError::Empty));
        assert_eq!(validate("  \n\t "), Err(ValidationError::Empty));
        assert_eq!(ValidationError::Empty.to_string(), "File is empty");
    }

    #[test]
    fn test_doctype_and_html_markers() {
        assert!(validate("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<DL><p></DL>").is_ok());
        assert!(validate("<!doctype netscape-bookmark-file-1>").is_ok());
        assert!(validate("<HTML><body>junk").is_ok());
    }

    #[test]
    fn test_rejects_other_text() {
        let err = validate("url,title\nhttps://example.com,Example").unwrap_err();
        assert_eq!(err, ValidationError::NotBookmarkFile);
        assert_eq!(
            err.to_string(),
            "File does not appear to be a valid bookmark HTML file"
        );
    }
}
