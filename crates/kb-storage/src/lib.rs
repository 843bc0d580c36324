//! Storage abstraction for the KB engine.
//!
//! This crate provides a [`Storage`] trait for abstracting page discovery
//! and content retrieval from the underlying backend. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Backend flexibility** (filesystem today, object stores later)
//! - **Clean separation** between site structure logic and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `scan()`, `read()`, `exists()`, `mtime()`, and
//!   `meta()` operations over URL paths
//! - [`FsStorage`] implementation for filesystem backends with mtime-cached
//!   title extraction
//! - [`MockStorage`] for testing (behind the `mock` feature flag)
//! - [`frontmatter`] parsing shared by all backends
//!
//! # Example
//!
//! ```
//! use std::path::PathBuf;
//! use kb_storage::{FsStorage, Storage};
//!
//! # fn main() -> Result<(), kb_storage::StorageError> {
//! let storage = FsStorage::new(PathBuf::from("content"));
//! for doc in storage.scan()? {
//!     println!("{}: {}", doc.path, doc.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod frontmatter;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use frontmatter::PageMeta;
pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Document, ErrorStatus, Storage, StorageError, StorageErrorKind};
