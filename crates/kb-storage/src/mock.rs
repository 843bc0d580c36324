//! Mock storage backend for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use crate::frontmatter::PageMeta;
use crate::storage::{Document, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores documents and page content in memory. Use the builder methods
/// to configure the mock with test data.
///
/// # Example
///
/// ```
/// use kb_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_page("guide", "User Guide", "# User Guide\n\nContent.");
///
/// let docs = storage.scan().unwrap();
/// assert_eq!(docs[0].title, "User Guide");
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    documents: RwLock<Vec<Document>>,
    contents: RwLock<HashMap<String, String>>,
    mtimes: RwLock<HashMap<String, f64>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with the given URL path and title.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, path: impl Into<String>, title: impl Into<String>) -> Self {
        self.documents.write().unwrap().push(Document {
            path: path.into(),
            title: title.into(),
        });
        self
    }

    /// Add page content for a URL path.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_content(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.contents
            .write()
            .unwrap()
            .insert(path.into(), content.into());
        self
    }

    /// Add a page with both a scan entry and content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(
        self,
        path: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let path: String = path.into();
        self.documents.write().unwrap().push(Document {
            path: path.clone(),
            title: title.into(),
        });
        self.contents.write().unwrap().insert(path, content.into());
        self
    }

    /// Set modification time for a URL path, in seconds since the Unix epoch.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_mtime(self, path: impl Into<String>, mtime: f64) -> Self {
        self.mtimes.write().unwrap().insert(path.into(), mtime);
        self
    }

    /// Replace the content of an existing page.
    ///
    /// Unlike the builder methods this takes `&self`, so tests can mutate
    /// a storage that is already shared behind an `Arc`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_content(&self, path: impl Into<String>, content: impl Into<String>) {
        self.contents
            .write()
            .unwrap()
            .insert(path.into(), content.into());
    }
}

impl Storage for MockStorage {
    fn scan(&self) -> Result<Vec<Document>, StorageError> {
        Ok(self.documents.read().unwrap().clone())
    }

    fn read(&self, path: &str) -> Result<String, StorageError> {
        self.contents
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound)
                    .with_path(path)
                    .with_backend(BACKEND)
            })
    }

    fn exists(&self, path: &str) -> bool {
        self.contents.read().unwrap().contains_key(path)
    }

    fn mtime(&self, path: &str) -> Result<f64, StorageError> {
        self.mtimes
            .read()
            .unwrap()
            .get(path)
            .copied()
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound)
                    .with_path(path)
                    .with_backend(BACKEND)
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_mock_storage_is_send_sync() {
        assert_send_sync::<MockStorage>();
    }

    #[test]
    fn test_new_empty() {
        let storage = MockStorage::new();

        assert!(storage.scan().unwrap().is_empty());
    }

    #[test]
    fn test_with_document() {
        let storage = MockStorage::new()
            .with_document("guide", "Guide")
            .with_document("pricing", "Pricing");

        let docs = storage.scan().unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].path, "guide");
        assert_eq!(docs[0].title, "Guide");
        assert_eq!(docs[1].path, "pricing");
        assert_eq!(docs[1].title, "Pricing");
    }

    #[test]
    fn test_with_content() {
        let storage = MockStorage::new().with_content("guide", "# Guide\n\nContent.");

        let content = storage.read("guide").unwrap();

        assert_eq!(content, "# Guide\n\nContent.");
    }

    #[test]
    fn test_with_page() {
        let storage = MockStorage::new().with_page("guide", "User Guide", "# User Guide");

        let docs = storage.scan().unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "User Guide");
        assert_eq!(storage.read("guide").unwrap(), "# User Guide");
    }

    #[test]
    fn test_set_content_replaces_page() {
        let storage = MockStorage::new().with_content("guide", "old");

        storage.set_content("guide", "new");

        assert_eq!(storage.read("guide").unwrap(), "new");
    }

    #[test]
    fn test_read_missing() {
        let storage = MockStorage::new();

        let result = storage.read("missing");

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Mock"));
        assert_eq!(err.path(), Some(Path::new("missing")));
    }

    #[test]
    fn test_exists() {
        let storage = MockStorage::new().with_content("guide", "content");

        assert!(storage.exists("guide"));
        assert!(!storage.exists("missing"));
    }

    #[test]
    fn test_mtime() {
        let storage = MockStorage::new().with_mtime("guide", 1_234_567_890.0);

        let mtime = storage.mtime("guide").unwrap();

        assert!((mtime - 1_234_567_890.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mtime_missing() {
        let storage = MockStorage::new();

        let result = storage.mtime("missing");

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Mock"));
    }

    #[test]
    fn test_meta_parses_frontmatter() {
        let storage = MockStorage::new().with_content(
            "news/2026-02-14-launch",
            "---\ndescription: Now live\n---\n# Launch",
        );

        let meta = storage.meta("news/2026-02-14-launch").unwrap();

        assert_eq!(meta.description.as_deref(), Some("Now live"));
    }

    #[test]
    fn test_meta_default_without_frontmatter() {
        let storage = MockStorage::new().with_content("guide", "# Guide");

        let meta = storage.meta("guide").unwrap();

        assert_eq!(meta, PageMeta::default());
    }
}
