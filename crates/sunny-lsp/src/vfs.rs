//! Virtual File System for document management.
//!
//! The VFS holds the current full text of every document the client has
//! opened. Documents are replaced wholesale on every change (the server
//! advertises full text sync) and are never evicted.

use lsp_types::Uri;
use std::collections::HashMap;

/// A document in the virtual file system.
#[derive(Debug, Clone)]
pub struct Document {
    /// The full document text.
    text: String,
    /// The version last reported by the client.
    version: i32,
}

impl Document {
    /// Create a new document with the given content.
    pub fn new(text: String, version: i32) -> Self {
        Self { text, version }
    }

    /// Get the document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the document version.
    pub fn version(&self) -> i32 {
        self.version
    }
}

/// Virtual file system for managing open documents.
#[derive(Debug, Default)]
pub struct Vfs {
    /// Documents indexed by URI.
    documents: HashMap<Uri, Document>,
}

impl Vfs {
    /// Create a new empty VFS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` as the content of `uri` and return the replaced document.
    ///
    /// Versions are recorded but not compared: the last write wins.
    pub fn set(&mut self, uri: Uri, text: String, version: i32) -> Option<Document> {
        self.documents.insert(uri, Document::new(text, version))
    }

    /// Get document content.
    pub fn get_content(&self, uri: &Uri) -> Option<&str> {
        self.documents.get(uri).map(Document::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_vfs_set_get() {
        let mut vfs = Vfs::new();
        let main = uri("file:///main.sunny");

        assert!(vfs.set(main.clone(), "i32 x := 5;".to_string(), 1).is_none());
        assert_eq!(vfs.get_content(&main), Some("i32 x := 5;"));
        assert!(vfs.get_content(&uri("file:///other.sunny")).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut vfs = Vfs::new();
        let main = uri("file:///main.sunny");

        vfs.set(main.clone(), "new".to_string(), 5);
        let replaced = vfs.set(main.clone(), "old".to_string(), 2).unwrap();

        assert_eq!(replaced.text(), "new");
        assert_eq!(replaced.version(), 5);
        assert_eq!(vfs.get_content(&main), Some("old"));
    }

    #[test]
    fn test_document_text() {
        let doc = Document::new("hello world".to_string(), 1);
        assert_eq!(doc.text(), "hello world");
    }
}
