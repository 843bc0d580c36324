//! Site structure and page rendering for KB.
//!
//! This crate provides:
//! - [`Site`]: unified site structure and page rendering with theme components
//! - [`SiteChrome`] and [`render_page`]: shared layout data and the HTML shell
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use kb_site::{Site, SiteOptions};
//! use kb_storage::FsStorage;
//! use kb_theme::AccessState;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("docs")));
//! let site = Arc::new(Site::new(storage, SiteOptions::default()));
//!
//! // Get navigation
//! let nav = site.navigation();
//!
//! // Render a page for an anonymous visitor
//! let result = site.render("guide", AccessState::Pending)?;
//! # Ok(())
//! # }
//! ```

pub(crate) mod chrome;
pub(crate) mod site;
pub(crate) mod state;

pub use chrome::{Footer, NavLink, PageShell, Search, SidebarGroup, SiteChrome, render_page};
pub use site::{PageRenderResult, RenderError, Site, SiteOptions};
pub use state::{BreadcrumbItem, NavItem, Page};

// Re-export TocEntry from kb-renderer for convenience
pub use kb_renderer::TocEntry;
