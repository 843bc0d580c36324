//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use kb_site::{Site, SiteChrome};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Unified site (structure and rendering).
    pub(crate) site: Arc<Site>,
    /// Site chrome (title, nav, footer) for HTML pages and the site API.
    pub(crate) chrome: SiteChrome,
    /// Enable verbose output (show warnings).
    pub(crate) verbose: bool,
    /// Application version for cache invalidation.
    pub(crate) version: String,
}
