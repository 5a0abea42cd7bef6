//! In-memory site file
//!
//! The document is never parsed. It is only searched for literals and
//! replaced as a whole, so bytes outside an edited region are kept as-is.

use crate::error::{PatchError, PatchResult};
use std::fmt;
use std::path::Path;

/// Text of a configuration file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a document from disk
    pub fn read(path: &Path) -> PatchResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PatchError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { text })
    }

    /// Overwrite `path` with this document
    pub fn write(&self, path: &Path) -> PatchResult<()> {
        std::fs::write(path, &self.text).map_err(|source| PatchError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of non-overlapping occurrences of `literal`
    pub fn count(&self, literal: &str) -> usize {
        if literal.is_empty() {
            return 0;
        }
        self.text.matches(literal).count()
    }

    /// Byte offset of the first occurrence of `literal`
    pub fn find(&self, literal: &str) -> Option<usize> {
        self.text.find(literal)
    }

    pub fn contains(&self, literal: &str) -> bool {
        self.text.contains(literal)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_non_overlapping() {
        let doc = Document::new("aaaa");
        assert_eq!(doc.count("aa"), 2);
        assert_eq!(doc.count(""), 0);
        assert_eq!(doc.count("b"), 0);
    }

    #[test]
    fn test_read_missing_file() {
        let err = Document::read(Path::new("/nonexistent/site.conf")).unwrap_err();
        assert!(matches!(err, PatchError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_write_then_read_keeps_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site");
        let doc = Document::new("server {\n\tlisten 80;\n}\n\n\n");
        doc.write(&path).unwrap();
        assert_eq!(Document::read(&path).unwrap(), doc);
    }
}
