//! Filesystem storage backend.
//!
//! Provides [`FsStorage`] for serving documents from a local content
//! directory, with mtime-based caching for title extraction.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::frontmatter;
use crate::storage::{Document, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Cached file metadata for incremental title extraction.
#[derive(Clone, Debug)]
struct CachedFile {
    /// File modification time.
    mtime: SystemTime,
    /// Extracted title for the file.
    title: String,
}

/// Filesystem storage backend.
///
/// Walks a content directory recursively for markdown files, maps them to
/// URL paths (`index.md` collapses onto its directory), and resolves
/// titles as frontmatter > first H1 > filename. Titles are cached by
/// mtime so repeated scans only re-read changed files.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use kb_storage::{FsStorage, Storage};
///
/// # fn main() -> Result<(), kb_storage::StorageError> {
/// let storage = FsStorage::new(PathBuf::from("content"));
/// for doc in storage.scan()? {
///     println!("{}: {}", doc.path, doc.title);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FsStorage {
    /// Root directory for page content.
    source_dir: PathBuf,
    /// Regex for extracting the first H1 heading.
    h1_regex: Regex,
    /// Mtime cache for incremental title extraction.
    mtime_cache: Mutex<HashMap<PathBuf, CachedFile>>,
}

impl FsStorage {
    /// Create a filesystem storage rooted at `source_dir`.
    ///
    /// # Panics
    ///
    /// Panics if the internal regex for H1 extraction fails to compile.
    /// This should never happen as the regex is a compile-time constant.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self {
            source_dir,
            h1_regex: Regex::new(r"(?m)^#\s+(.+)$").unwrap(),
            mtime_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Validate that a URL path doesn't escape the content root.
    ///
    /// Rejects parent-directory components (`..`) and absolute paths so
    /// traversal like `../../etc/passwd` can't reach outside `source_dir`.
    fn validate_path(path: &str) -> Result<(), StorageError> {
        let escapes = Path::new(path)
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir));

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    /// Resolve a URL path to its content file.
    ///
    /// `<path>.md` wins over `<path>/index.md` when both exist; the empty
    /// path maps to the root `index.md`.
    fn content_path(&self, path: &str) -> Option<PathBuf> {
        if !path.is_empty() {
            let file = self.source_dir.join(format!("{path}.md"));
            if file.is_file() {
                return Some(file);
            }
        }

        let index = if path.is_empty() {
            self.source_dir.join("index.md")
        } else {
            self.source_dir.join(path).join("index.md")
        };
        index.is_file().then_some(index)
    }

    /// Scan a directory and collect documents under `url_prefix`.
    fn scan_directory(&self, dir_path: &Path, url_prefix: &str, documents: &mut Vec<Document>) {
        let Ok(entries) = fs::read_dir(dir_path) else {
            return;
        };

        // Collect entries with cached file_type to avoid repeated stat calls in sort.
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                let name_lower = e.file_name().to_string_lossy().to_lowercase();
                (e, is_dir, name_lower)
            })
            .collect();

        // Sort: directories first, then alphabetical by name
        entries.sort_by(|(_, a_is_dir, a_name), (_, b_is_dir, b_name)| {
            b_is_dir.cmp(a_is_dir).then_with(|| a_name.cmp(b_name))
        });

        for (entry, is_dir, name_lower) in entries {
            // Skip hidden and underscore-prefixed files/dirs
            if name_lower.starts_with('.') || name_lower.starts_with('_') {
                continue;
            }

            // Skip common non-content directories
            if is_dir
                && matches!(
                    name_lower.as_str(),
                    "node_modules" | "target" | "dist" | "build" | "vendor"
                )
            {
                continue;
            }

            let path = entry.path();

            if is_dir {
                let child_name = entry.file_name().to_string_lossy().into_owned();
                let child_url = if url_prefix.is_empty() {
                    child_name
                } else {
                    format!("{url_prefix}/{child_name}")
                };
                self.scan_directory(&path, &child_url, documents);
            } else if path.extension().is_some_and(|e| e == "md") {
                if name_lower == "index.md" {
                    // index.md collapses onto the directory's URL path
                    let fallback = url_prefix
                        .rsplit('/')
                        .next()
                        .filter(|segment| !segment.is_empty())
                        .unwrap_or("index");
                    documents.push(Document {
                        path: url_prefix.to_owned(),
                        title: self.get_title(&path, fallback),
                    });
                } else {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let stem = name.strip_suffix(".md").unwrap_or(&name);
                    let url_path = if url_prefix.is_empty() {
                        stem.to_owned()
                    } else {
                        format!("{url_prefix}/{stem}")
                    };
                    let title = self.get_title(&path, stem);
                    documents.push(Document {
                        path: url_path,
                        title,
                    });
                }
            }
        }
    }

    /// Get title for a file, using the mtime cache when possible.
    fn get_title(&self, file_path: &Path, fallback_slug: &str) -> String {
        let current_mtime = fs::metadata(file_path).ok().and_then(|m| m.modified().ok());

        {
            let cache = self.mtime_cache.lock().unwrap();
            if let (Some(cached), Some(mtime)) = (cache.get(file_path), current_mtime)
                && cached.mtime == mtime
            {
                return cached.title.clone();
            }
        }

        // Cache miss - extract title
        let title = self
            .title_from_content(file_path)
            .unwrap_or_else(|| title_from_slug(fallback_slug));

        if let Some(mtime) = current_mtime {
            let mut cache = self.mtime_cache.lock().unwrap();
            cache.insert(
                file_path.to_path_buf(),
                CachedFile {
                    mtime,
                    title: title.clone(),
                },
            );
        }

        title
    }

    /// Extract title from frontmatter or the first H1 heading.
    fn title_from_content(&self, file_path: &Path) -> Option<String> {
        let content = fs::read_to_string(file_path).ok()?;
        let (meta, body) = frontmatter::parse(&content);
        if meta.title.is_some() {
            return meta.title;
        }
        self.h1_regex
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_owned())
    }
}

/// Generate a display title from a URL slug.
fn title_from_slug(slug: &str) -> String {
    slug.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Storage for FsStorage {
    fn scan(&self) -> Result<Vec<Document>, StorageError> {
        let mut documents = Vec::new();
        if self.source_dir.exists() {
            self.scan_directory(&self.source_dir, "", &mut documents);
        }
        Ok(documents)
    }

    fn read(&self, path: &str) -> Result<String, StorageError> {
        Self::validate_path(path)?;
        let file = self
            .content_path(path)
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))?;
        fs::read_to_string(&file)
            .map_err(|e| StorageError::io(e, Some(file)).with_backend(BACKEND))
    }

    fn exists(&self, path: &str) -> bool {
        Self::validate_path(path).is_ok() && self.content_path(path).is_some()
    }

    fn mtime(&self, path: &str) -> Result<f64, StorageError> {
        Self::validate_path(path)?;
        let file = self
            .content_path(path)
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))?;
        let metadata = fs::metadata(&file)
            .map_err(|e| StorageError::io(e, Some(file.clone())).with_backend(BACKEND))?;
        let modified = metadata
            .modified()
            .map_err(|e| StorageError::io(e, Some(file)).with_backend(BACKEND))?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |d| d.as_secs_f64()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn paths(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(|d| d.path.as_str()).collect()
    }

    #[test]
    fn test_scan_empty_dir() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert!(docs.is_empty());
    }

    #[test]
    fn test_scan_missing_dir() {
        let storage = FsStorage::new(PathBuf::from("/nonexistent"));
        let docs = storage.scan().unwrap();

        assert!(docs.is_empty());
    }

    #[test]
    fn test_scan_flat_structure() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# User Guide\n\nContent.").unwrap();
        fs::write(temp_dir.path().join("pricing.md"), "# Pricing\n\nTiers.").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs.len(), 2);
        assert!(paths(&docs).contains(&"guide"));
        assert!(paths(&docs).contains(&"pricing"));
    }

    #[test]
    fn test_scan_maps_index_to_directory_path() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "# Home").unwrap();
        let news_dir = temp_dir.path().join("news");
        fs::create_dir(&news_dir).unwrap();
        fs::write(news_dir.join("index.md"), "# News").unwrap();
        fs::write(news_dir.join("2026-02-14-launch.md"), "# Launch").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs.len(), 3);
        assert!(paths(&docs).contains(&""));
        assert!(paths(&docs).contains(&"news"));
        assert!(paths(&docs).contains(&"news/2026-02-14-launch"));
    }

    #[test]
    fn test_scan_title_from_frontmatter_beats_h1() {
        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("guide.md"),
            "---\ntitle: Frontmatter Title\n---\n# Heading Title\n",
        )
        .unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs[0].title, "Frontmatter Title");
    }

    #[test]
    fn test_scan_title_from_h1() {
        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("guide.md"),
            "# My Custom Title\n\nContent.",
        )
        .unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs[0].title, "My Custom Title");
    }

    #[test]
    fn test_scan_title_falls_back_to_filename() {
        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("setup-guide.md"),
            "Content without heading.",
        )
        .unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs[0].title, "Setup Guide");
    }

    #[test]
    fn test_scan_index_title_falls_back_to_directory_name() {
        let temp_dir = create_test_dir();
        let tools_dir = temp_dir.path().join("ai-tools");
        fs::create_dir(&tools_dir).unwrap();
        fs::write(tools_dir.join("index.md"), "No heading here.").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs[0].path, "ai-tools");
        assert_eq!(docs[0].title, "Ai Tools");
    }

    #[test]
    fn test_scan_skips_hidden_and_underscore_files() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join(".hidden.md"), "# Hidden").unwrap();
        fs::write(temp_dir.path().join("_partial.md"), "# Partial").unwrap();
        fs::write(temp_dir.path().join("visible.md"), "# Visible").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "visible");
    }

    #[test]
    fn test_scan_skips_node_modules() {
        let temp_dir = create_test_dir();
        let node_modules = temp_dir.path().join("node_modules");
        fs::create_dir(&node_modules).unwrap();
        fs::write(node_modules.join("package.md"), "# Package").unwrap();
        fs::write(temp_dir.path().join("main.md"), "# Main").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let docs = storage.scan().unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "main");
    }

    #[test]
    fn test_read_flat_page() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# Guide\n\nContent here.").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("guide").unwrap();

        assert_eq!(content, "# Guide\n\nContent here.");
    }

    #[test]
    fn test_read_directory_index() {
        let temp_dir = create_test_dir();
        let news_dir = temp_dir.path().join("news");
        fs::create_dir(&news_dir).unwrap();
        fs::write(news_dir.join("index.md"), "# News").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("news").unwrap();

        assert_eq!(content, "# News");
    }

    #[test]
    fn test_read_root_index() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("index.md"), "# Home").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("").unwrap();

        assert_eq!(content, "# Home");
    }

    #[test]
    fn test_read_prefers_file_over_directory_index() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# File").unwrap();
        let guide_dir = temp_dir.path().join("guide");
        fs::create_dir(&guide_dir).unwrap();
        fs::write(guide_dir.join("index.md"), "# Directory").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read("guide").unwrap();

        assert_eq!(content, "# File");
    }

    #[test]
    fn test_read_missing_page() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let result = storage.read("nonexistent");

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Fs"));
        assert_eq!(err.path(), Some(Path::new("nonexistent")));
    }

    #[test]
    fn test_read_rejects_path_traversal() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# Guide").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let result = storage.read("../etc/passwd");

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::InvalidPath);
        assert_eq!(err.backend(), Some("Fs"));
    }

    #[test]
    fn test_read_rejects_nested_path_traversal() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let result = storage.read("guide/../../etc/passwd");

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_read_rejects_absolute_path() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let result = storage.read("/etc/passwd");

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_exists_for_flat_and_index_pages() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# Guide").unwrap();
        let news_dir = temp_dir.path().join("news");
        fs::create_dir(&news_dir).unwrap();
        fs::write(news_dir.join("index.md"), "# News").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert!(storage.exists("guide"));
        assert!(storage.exists("news"));
        assert!(!storage.exists("missing"));
    }

    #[test]
    fn test_exists_rejects_path_traversal() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert!(!storage.exists("../etc/passwd"));
    }

    #[test]
    fn test_exists_false_for_bare_directory() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("empty")).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        assert!(!storage.exists("empty"));
    }

    #[test]
    fn test_mtime_returns_recent_timestamp() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# Guide").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let mtime = storage.mtime("guide").unwrap();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs_f64();
        assert!(mtime > now - 60.0);
        assert!(mtime <= now);
    }

    #[test]
    fn test_mtime_missing_page() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let result = storage.mtime("nonexistent");

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Fs"));
    }

    #[test]
    fn test_mtime_rejects_path_traversal() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let result = storage.mtime("../etc/passwd");

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_meta_returns_frontmatter() {
        let temp_dir = create_test_dir();
        fs::write(
            temp_dir.path().join("launch.md"),
            "---\ntitle: Launch\ndescription: Now live\ndate: 2026-02-14\n---\nBody.",
        )
        .unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let meta = storage.meta("launch").unwrap();

        assert_eq!(meta.title.as_deref(), Some("Launch"));
        assert_eq!(meta.description.as_deref(), Some("Now live"));
        assert_eq!(meta.date.as_deref(), Some("2026-02-14"));
    }

    #[test]
    fn test_meta_default_without_frontmatter() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# Guide\n\nContent.").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let meta = storage.meta("guide").unwrap();

        assert!(meta.is_empty());
    }

    #[test]
    fn test_meta_missing_page() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let result = storage.meta("nonexistent");

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), StorageErrorKind::NotFound);
    }

    #[test]
    fn test_mtime_cache_reuses_titles() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# Original Title").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let docs1 = storage.scan().unwrap();
        assert_eq!(docs1[0].title, "Original Title");

        // Second scan without changes - should use cache
        let docs2 = storage.scan().unwrap();
        assert_eq!(docs2[0].title, "Original Title");
    }

    #[test]
    fn test_mtime_cache_detects_changes() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("guide.md"), "# Original Title").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let docs1 = storage.scan().unwrap();
        assert_eq!(docs1[0].title, "Original Title");

        // Small delay to ensure mtime changes
        std::thread::sleep(std::time::Duration::from_millis(10));
        fs::write(temp_dir.path().join("guide.md"), "# Updated Title").unwrap();

        let docs2 = storage.scan().unwrap();
        assert_eq!(docs2[0].title, "Updated Title");
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("setup-guide"), "Setup Guide");
        assert_eq!(title_from_slug("my_page"), "My Page");
        assert_eq!(title_from_slug("complex-name_here"), "Complex Name Here");
        assert_eq!(title_from_slug("simple"), "Simple");
    }
}
