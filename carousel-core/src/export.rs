//! Standalone HTML export.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::element::{EDITING_ATTR, SELECTED_ATTR};
use crate::error::EditorResult;
use crate::markup::Document;

/// Attributes that only exist while the editor is interacting.
const TRANSIENT_ATTRS: &[&str] = &[SELECTED_ATTR, EDITING_ATTR, "contenteditable"];

/// One slide as a standalone HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideExport {
    /// Slide position in the deck.
    pub index: usize,
    /// Suggested file name (`slide-01.html`, ...).
    pub file_name: String,
    /// Complete HTML document.
    pub html: String,
}

impl SlideExport {
    /// Build an export from a slide's current markup.
    #[must_use]
    pub fn new(index: usize, markup: &str) -> Self {
        let html = wrap_document(&strip_transient(markup), index);
        Self {
            index,
            file_name: format!("slide-{:02}.html", index + 1),
            html,
        }
    }

    /// Write the document into `dir`, returning the file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or written.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> EditorResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.html)?;
        Ok(path)
    }
}

/// Remove selection and editing markers.
#[must_use]
pub fn strip_transient(markup: &str) -> String {
    let mut doc = Document::parse(markup);
    for id in doc.elements() {
        for attr in TRANSIENT_ATTRS {
            doc.remove_attr(id, attr);
        }
    }
    doc.to_html()
}

/// Wrap a fragment in a full document. Complete documents pass through.
#[must_use]
pub fn wrap_document(markup: &str, index: usize) -> String {
    if markup.to_ascii_lowercase().contains("<html") {
        return markup.to_string();
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Slide {}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        index + 1,
        markup.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_strips_markers_and_wraps() {
        let export = SlideExport::new(
            0,
            r#"<h1><span data-cs-editable="title" data-cs-selected="" contenteditable="true" data-cs-editing="">Hi</span></h1>"#,
        );
        assert_eq!(export.file_name, "slide-01.html");
        assert!(export.html.starts_with("<!DOCTYPE html>"));
        assert!(export
            .html
            .contains(r#"<h1><span data-cs-editable="title">Hi</span></h1>"#));
        assert!(!export.html.contains("data-cs-selected"));
        assert!(!export.html.contains("contenteditable"));
    }

    #[test]
    fn test_full_documents_pass_through() {
        let doc = "<!DOCTYPE html><html><body><p>x</p></body></html>";
        let export = SlideExport::new(11, doc);
        assert_eq!(export.html, doc);
        assert_eq!(export.file_name, "slide-12.html");
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let export = SlideExport::new(2, "<p>x</p>");
        let path = export.write_to(dir.path().join("out")).expect("export written");
        assert!(path.ends_with("slide-03.html"));
        let written = std::fs::read_to_string(path).expect("read back");
        assert_eq!(written, export.html);
    }
}
