//! Core storage abstraction types.
//!
//! Defines the [`Storage`] trait, the [`Document`] type returned by scans,
//! and the semantic [`StorageError`] shared by all backends.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::frontmatter::{self, PageMeta};

/// A document discovered by a storage scan.
///
/// Paths are URL paths relative to the content root:
///
/// - `""` - the root page (maps to `index.md`)
/// - `"guide"` - standalone page (maps to `guide.md` or `guide/index.md`)
/// - `"news/2026-02-14-launch"` - nested page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// URL path (e.g., "", "guide", "news/2026-02-14-launch").
    pub path: String,
    /// Resolved title (frontmatter title > first H1 > filename).
    pub title: String,
}

/// Semantic error categories shared by all backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// The requested path does not exist.
    NotFound,
    /// The backend denied access to the path.
    PermissionDenied,
    /// The path already exists.
    AlreadyExists,
    /// The path is malformed or escapes the content root.
    InvalidPath,
    /// The backend is not reachable.
    Unavailable,
    /// The backend rejected the request due to rate limiting.
    RateLimited,
    /// The operation timed out.
    Timeout,
    /// Any other error.
    Other,
}

/// Retry guidance attached to an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorStatus {
    /// The operation will not succeed on retry.
    #[default]
    Permanent,
    /// The operation may succeed if retried.
    Temporary,
    /// The error persists until an external condition changes.
    Persistent,
}

/// Error returned by storage operations.
///
/// Carries a semantic [`StorageErrorKind`], retry guidance, and optional
/// path / backend / source context. Build with [`StorageError::new`] and
/// the `with_*` methods:
///
/// ```
/// use kb_storage::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound)
///     .with_path("guide")
///     .with_backend("Fs");
/// assert_eq!(err.kind(), StorageErrorKind::NotFound);
/// ```
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    status: ErrorStatus,
    path: Option<PathBuf>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new error with the given kind and default status.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::default(),
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Shorthand for a [`StorageErrorKind::NotFound`] error with path context.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Convert an I/O error, mapping the kind and retry status.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => StorageErrorKind::AlreadyExists,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            _ => StorageErrorKind::Other,
        };
        let status = if err.kind() == std::io::ErrorKind::TimedOut {
            ErrorStatus::Temporary
        } else {
            ErrorStatus::Permanent
        };

        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(path) = path {
            error = error.with_path(path);
        }
        error
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a backend identifier (e.g., "Fs", "Mock").
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry guidance.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The semantic error category.
    #[must_use]
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Retry guidance.
    #[must_use]
    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Path context, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Backend identifier, if any.
    #[must_use]
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::AlreadyExists => "Already exists",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Unavailable => "Unavailable",
            StorageErrorKind::RateLimited => "Rate limited",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };
        f.write_str(kind)?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Abstraction over document storage backends.
///
/// Decouples site structure logic from I/O so the site can be built from
/// the filesystem, an in-memory mock, or any future backend. All paths are
/// URL paths as described on [`Document`].
pub trait Storage: Send + Sync {
    /// Scan the content root and return every document.
    ///
    /// A missing content root is not an error; it yields an empty list.
    fn scan(&self) -> Result<Vec<Document>, StorageError>;

    /// Read the raw markdown for a URL path, frontmatter included.
    fn read(&self, path: &str) -> Result<String, StorageError>;

    /// Whether content exists for a URL path.
    ///
    /// Returns false for invalid paths and on I/O errors.
    fn exists(&self, path: &str) -> bool;

    /// Modification time for a URL path, in seconds since the Unix epoch.
    fn mtime(&self, path: &str) -> Result<f64, StorageError>;

    /// Parsed frontmatter for a URL path.
    ///
    /// Pages without a frontmatter block yield [`PageMeta::default`].
    fn meta(&self, path: &str) -> Result<PageMeta, StorageError> {
        Ok(frontmatter::parse(&self.read(path)?).0)
    }
}
