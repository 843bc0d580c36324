//! Unified site loading and rendering.
//!
//! Provides [`Site`] for building a page tree from a [`Storage`] backend,
//! with integrated markdown rendering and theme components. Each rebuild
//! also derives the theme data that depends on content: news entries from
//! dated pages and the tools catalog from its YAML file.
//!
//! # Thread Safety
//!
//! `Site` is designed for concurrent access:
//! - accessors clone an `Arc` snapshot and never hold a lock while rendering
//! - `reload_if_needed()` uses double-checked locking to serialize rebuilds
//! - `invalidate()` is lock-free (atomic flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use kb_site::{Site, SiteOptions};
//! use kb_storage::FsStorage;
//! use kb_theme::AccessState;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("docs")));
//! let site = Arc::new(Site::new(storage, SiteOptions::default()));
//!
//! let nav = site.navigation();
//! let page = site.render("guide", AccessState::Pending)?;
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::NaiveDate;
use kb_renderer::{HtmlRenderer, TocEntry};
use kb_storage::{Document, PageMeta, Storage, StorageError, StorageErrorKind, frontmatter};
use kb_theme::{AccessState, NewsItem, PaywallOptions, Theme, Tier, ToolEntry, load_tools_catalog};

use crate::state::{BreadcrumbItem, NavItem, Page, SiteState, SiteStateBuilder};

/// Result of rendering a page.
#[derive(Clone, Debug)]
pub struct PageRenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Resolved page title: frontmatter, then first H1, then scan title.
    pub title: String,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Warnings generated during rendering (e.g., unclosed components).
    pub warnings: Vec<String>,
    /// Source modification time in seconds since the Unix epoch, 0.0 when
    /// the backend cannot provide one.
    pub source_mtime: f64,
    /// Breadcrumb navigation items.
    pub breadcrumbs: Vec<BreadcrumbItem>,
    /// Frontmatter metadata for the page.
    pub meta: PageMeta,
}

/// Error returned when page rendering fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Page not found in site structure.
    #[error("Page not found: {0}")]
    PageNotFound(String),
    /// Source content missing from storage.
    #[error("Source file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// I/O error reading source content.
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
}

impl From<StorageError> for RenderError {
    fn from(e: StorageError) -> Self {
        match e.kind() {
            StorageErrorKind::NotFound => {
                Self::FileNotFound(e.path().map(Path::to_path_buf).unwrap_or_default())
            }
            _ => Self::Io(std::io::Error::other(e.to_string())),
        }
    }
}

/// Options for [`Site`].
#[derive(Clone, Debug)]
pub struct SiteOptions {
    /// Extract the first H1 heading as the page title.
    pub extract_title: bool,
    /// Paywall teaser and call-to-action settings.
    pub paywall: PaywallOptions,
    /// Pricing tiers rendered by the `::pricing` component.
    pub tiers: Vec<Tier>,
    /// Section whose dated children become news entries.
    pub news_section: String,
    /// Default number of entries shown by `::news-gallery`.
    pub news_limit: usize,
    /// Tools catalog YAML file.
    ///
    /// If `None`, the `::tools-gallery` component renders its empty state.
    pub tools_catalog: Option<PathBuf>,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            extract_title: true,
            paywall: PaywallOptions::default(),
            tiers: Vec::new(),
            news_section: "news".to_string(),
            news_limit: 10,
            tools_catalog: None,
        }
    }
}

/// One immutable generation of the loaded site: the page tree plus the
/// theme data derived from content during the same rebuild.
pub(crate) struct SiteSnapshot {
    pub(crate) state: SiteState,
    pub(crate) theme: Theme,
}

/// Unified site structure and page rendering.
///
/// Combines site structure loading from a [`Storage`] implementation with
/// page rendering. Pages map to URL paths without a leading slash; the
/// root `index.md` becomes the `""` page.
///
/// # Thread Safety
///
/// This struct is designed for concurrent access without external locking:
/// - Uses internal `RwLock<Arc<SiteSnapshot>>` for the current snapshot
/// - Uses `Mutex<()>` for serializing reload operations
/// - Uses `AtomicBool` for cache validity tracking
pub struct Site {
    storage: Arc<dyn Storage>,
    options: SiteOptions,
    /// Mutex for serializing reload operations.
    reload_lock: Mutex<()>,
    /// Current snapshot (atomically swappable).
    current: RwLock<Arc<SiteSnapshot>>,
    /// Cache validity flag.
    cache_valid: AtomicBool,
}

impl Site {
    /// Create a new site with storage and options.
    ///
    /// The first accessor call loads the site; construction itself does
    /// not touch storage.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, options: SiteOptions) -> Self {
        let initial = Arc::new(SiteSnapshot {
            state: SiteStateBuilder::new().build(),
            theme: Theme::new(),
        });

        Self {
            storage,
            options,
            reload_lock: Mutex::new(()),
            current: RwLock::new(initial),
            cache_valid: AtomicBool::new(false),
        }
    }

    /// Get the current snapshot without checking cache validity.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub(crate) fn state(&self) -> Arc<SiteSnapshot> {
        self.current.read().unwrap().clone()
    }

    /// Reload the snapshot from storage if the cache is invalid.
    ///
    /// Uses double-checked locking:
    /// 1. Fast path: return the current snapshot if the cache is valid
    /// 2. Slow path: acquire `reload_lock`, recheck, then rebuild
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub(crate) fn reload_if_needed(&self) -> Arc<SiteSnapshot> {
        // Fast path: cache valid
        if self.cache_valid.load(Ordering::Acquire) {
            return self.state();
        }

        // Slow path: acquire reload lock
        let _guard = self.reload_lock.lock().unwrap();

        // Double-check after acquiring lock
        if self.cache_valid.load(Ordering::Acquire) {
            return self.state();
        }

        let snapshot = Arc::new(self.load_from_storage());
        *self.current.write().unwrap() = snapshot.clone();
        self.cache_valid.store(true, Ordering::Release);

        snapshot
    }

    /// Invalidate the cached snapshot.
    ///
    /// The next accessor call rebuilds from storage. Current readers keep
    /// using their existing `Arc<SiteSnapshot>`.
    pub fn invalidate(&self) {
        self.cache_valid.store(false, Ordering::Release);
    }

    /// Get the navigation tree.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    #[must_use]
    pub fn navigation(&self) -> Vec<NavItem> {
        self.reload_if_needed().state.navigation()
    }

    /// Get breadcrumbs for a URL path.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    #[must_use]
    pub fn breadcrumbs(&self, path: &str) -> Vec<BreadcrumbItem> {
        self.reload_if_needed().state.breadcrumbs(path)
    }

    /// Get a page by URL path (without leading slash, `""` for root).
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    #[must_use]
    pub fn get_page(&self, path: &str) -> Option<Page> {
        self.reload_if_needed().state.get_page(path).cloned()
    }

    /// Get all pages in scan order.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    #[must_use]
    pub fn pages(&self) -> Vec<Page> {
        self.reload_if_needed().state.pages().to_vec()
    }

    /// Whether the site has no pages.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reload_if_needed().state.is_empty()
    }

    /// Render a page by URL path.
    ///
    /// Strips frontmatter from the source, runs theme components under the
    /// given access state, and converts the remaining markdown to HTML.
    /// Entitlement-gated components receive a fresh registry per call, so
    /// the same `Site` can serve differently entitled requests concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PageNotFound`] if the page is not in the site
    /// structure, [`RenderError::FileNotFound`] if its source has gone
    /// missing since the scan, and [`RenderError::Io`] for backend failures.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn render(&self, path: &str, access: AccessState) -> Result<PageRenderResult, RenderError> {
        let snapshot = self.reload_if_needed();

        let page = snapshot
            .state
            .get_page(path)
            .ok_or_else(|| RenderError::PageNotFound(path.to_string()))?;
        let breadcrumbs = snapshot.state.breadcrumbs(path);

        // mtime is advisory; backends without one fall back to the epoch.
        let source_mtime = self.storage.mtime(path).unwrap_or(0.0);

        let raw = self.storage.read(path)?;
        let (meta, body) = frontmatter::parse(&raw);

        let mut registry = snapshot.theme.registry(access).with_page_path(path);
        let result = self
            .create_renderer(path)
            .render_with_components(body, &mut registry);

        let title = meta
            .title
            .clone()
            .or(result.title)
            .unwrap_or_else(|| page.title.clone());

        Ok(PageRenderResult {
            html: result.html,
            title,
            toc: result.toc,
            warnings: result.warnings,
            source_mtime,
            breadcrumbs,
            meta,
        })
    }

    /// Create a renderer with common configuration.
    fn create_renderer(&self, base_path: &str) -> HtmlRenderer {
        let mut renderer = HtmlRenderer::new().with_base_path(base_path);
        if self.options.extract_title {
            renderer = renderer.with_title_extraction();
        }
        renderer
    }

    /// Load a snapshot from storage and build the page hierarchy.
    ///
    /// Sorts scanned documents parents-first so every page can link to its
    /// nearest existing ancestor, then derives the news and tools data the
    /// theme components serve.
    fn load_from_storage(&self) -> SiteSnapshot {
        let mut builder = SiteStateBuilder::new();

        let mut documents = match self.storage.scan() {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to scan storage");
                Vec::new()
            }
        };

        documents.sort_by(|a, b| {
            path_depth(&a.path)
                .cmp(&path_depth(&b.path))
                .then_with(|| a.path.cmp(&b.path))
        });

        let mut url_to_idx: HashMap<String, usize> = HashMap::new();
        for doc in &documents {
            let parent = find_parent(&doc.path, &url_to_idx);
            let idx = builder.add_page(doc.title.clone(), doc.path.clone(), parent);
            url_to_idx.insert(doc.path.clone(), idx);
        }

        let news = self.collect_news(&documents);
        let theme = Theme::new()
            .with_paywall(self.options.paywall.clone())
            .with_tiers(self.options.tiers.clone())
            .with_news(news, self.options.news_limit)
            .with_tools(self.load_tools());

        SiteSnapshot {
            state: builder.build(),
            theme,
        }
    }

    /// Collect news entries from direct children of the news section.
    ///
    /// A child qualifies when its slug starts with a `YYYY-MM-DD` date.
    /// The slug date is the publication date unless frontmatter carries a
    /// valid `date` override; an invalid override falls back to the slug.
    fn collect_news(&self, documents: &[Document]) -> Vec<NewsItem> {
        let prefix = format!("{}/", self.options.news_section);
        let mut items = Vec::new();

        for doc in documents {
            let Some(slug) = doc.path.strip_prefix(&prefix) else {
                continue;
            };
            if slug.contains('/') {
                continue;
            }
            let Some(slug_date) = parse_slug_date(slug) else {
                continue;
            };

            let meta = self.storage.meta(&doc.path).unwrap_or_default();
            let date = match meta.date.as_deref() {
                None => slug_date,
                Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|_| {
                    tracing::warn!(
                        path = %doc.path,
                        value = raw,
                        "Invalid frontmatter date, using slug date"
                    );
                    slug_date
                }),
            };

            items.push(NewsItem {
                date,
                title: meta.title.unwrap_or_else(|| doc.title.clone()),
                description: meta.description,
                path: doc.path.clone(),
            });
        }

        items
    }

    /// Load the tools catalog, if one is configured.
    fn load_tools(&self) -> Vec<ToolEntry> {
        let Some(ref path) = self.options.tools_catalog else {
            return Vec::new();
        };
        match load_tools_catalog(path) {
            Ok(tools) => tools,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load tools catalog");
                Vec::new()
            }
        }
    }
}

/// Hierarchy depth of a URL path; the root `""` is depth 0.
fn path_depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.matches('/').count() + 1
    }
}

/// Find the nearest existing ancestor of a URL path.
///
/// Walks up the path segments; top-level pages attach to the root page
/// when one exists.
fn find_parent(path: &str, url_to_idx: &HashMap<String, usize>) -> Option<usize> {
    let mut prefix = path;
    while let Some(cut) = prefix.rfind('/') {
        prefix = &prefix[..cut];
        if let Some(&idx) = url_to_idx.get(prefix) {
            return Some(idx);
        }
    }
    url_to_idx.get("").copied().filter(|_| !path.is_empty())
}

/// Parse the leading `YYYY-MM-DD` date of a news slug.
///
/// The date must span exactly the first ten bytes and be followed by
/// nothing or a `-` separator.
fn parse_slug_date(slug: &str) -> Option<NaiveDate> {
    let prefix = slug.get(..10)?;
    if !matches!(slug.as_bytes().get(10), None | Some(b'-')) {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
