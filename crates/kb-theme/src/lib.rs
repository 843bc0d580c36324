//! Theme components and content gating for KB.
//!
//! This crate supplies the markdown components the default theme ships
//! with, plus the [`AccessState`] model that drives content gating:
//!
//! - `:::paywall` ([`PaywallComponent`]) gates a region of a page behind
//!   an entitlement. Fails closed: unresolved access renders locked.
//! - `::pricing` ([`PricingSection`]), `::news-gallery` ([`NewsGallery`])
//!   and `::tools-gallery` ([`ToolsGallery`]) render configured data.
//!   They fail soft: missing data becomes an empty state, never an error.
//!
//! [`Theme`] bundles the configured data and hands out a fresh
//! [`ComponentRegistry`] per render, so a page rendered for one reader
//! never shares handler state with a page rendered for another.
//!
//! ```
//! use kb_renderer::HtmlRenderer;
//! use kb_theme::{AccessState, Theme};
//!
//! let theme = Theme::new();
//! let markdown = "::: paywall\nMembers only.\n:::\n";
//!
//! let mut registry = theme.registry(AccessState::resolved(false));
//! let locked = HtmlRenderer::new().render_with_components(markdown, &mut registry);
//! assert!(locked.html.contains("kb-paywall--locked"));
//! assert!(!locked.html.contains("Members only."));
//!
//! let mut registry = theme.registry(AccessState::resolved(true));
//! let unlocked = HtmlRenderer::new().render_with_components(markdown, &mut registry);
//! assert!(unlocked.html.contains("Members only."));
//! ```

mod access;
mod news;
mod paywall;
mod pricing;
mod tools;

pub use access::AccessState;
pub use news::{NewsGallery, NewsItem};
pub use paywall::{PaywallComponent, PaywallOptions};
pub use pricing::{PricingSection, Tier};
pub use tools::{CatalogError, ToolEntry, ToolsGallery, load_tools_catalog};

use kb_renderer::component::ComponentRegistry;

/// Configured theme data: paywall options, pricing tiers, news entries
/// and the tools catalog.
///
/// The theme itself is immutable shared data; per-render component state
/// lives in the registries it creates.
#[derive(Clone, Debug)]
pub struct Theme {
    paywall: PaywallOptions,
    tiers: Vec<Tier>,
    news: Vec<NewsItem>,
    news_limit: usize,
    tools: Vec<ToolEntry>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            paywall: PaywallOptions::default(),
            tiers: Vec::new(),
            news: Vec::new(),
            news_limit: 10,
            tools: Vec::new(),
        }
    }
}

impl Theme {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_paywall(mut self, options: PaywallOptions) -> Self {
        self.paywall = options;
        self
    }

    #[must_use]
    pub fn with_tiers(mut self, tiers: Vec<Tier>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Set the news entries and the default gallery limit.
    #[must_use]
    pub fn with_news(mut self, items: Vec<NewsItem>, limit: usize) -> Self {
        self.news = items;
        self.news_limit = limit;
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolEntry>) -> Self {
        self.tools = tools;
        self
    }

    /// Build a component registry for one render pass.
    ///
    /// Registers the four theme components. The paywall is bound to the
    /// given [`AccessState`] for the lifetime of the registry; callers
    /// build a new registry when the state changes.
    #[must_use]
    pub fn registry(&self, access: AccessState) -> ComponentRegistry {
        ComponentRegistry::new()
            .with_container(PaywallComponent::new(self.paywall.clone(), access))
            .with_block(PricingSection::new(self.tiers.clone()))
            .with_block(NewsGallery::new(self.news.clone(), self.news_limit))
            .with_block(ToolsGallery::new(self.tools.clone()))
    }
}
