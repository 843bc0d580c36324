//! HTTP server for the KB publishing engine.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - API endpoints for page rendering, navigation, and site chrome
//! - Server-rendered HTML pages wrapped in the shared chrome shell
//!
//! # Entitlement
//!
//! Gated content is controlled by the `x-kb-entitlement` request header. An
//! upstream access layer sets it to `granted` or `denied`; any other value
//! (including a missing header) leaves the access state pending, so paywalled
//! sections render as teasers. Responses that depend on the header carry
//! `Vary: x-kb-entitlement`.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use kb_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 7878,
//!         source_dir: PathBuf::from("docs"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► Rust axum server (kb-server)
//!                        │
//!                        ├─► API routes (JSON handlers)
//!                        │       │
//!                        │       └─► Direct call ──► Site (render + structure)
//!                        │
//!                        └─► Page routes (chrome shell around rendered HTML)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use kb_site::{Footer, NavLink, Search, SidebarGroup, Site, SiteChrome, SiteOptions};
use kb_storage::FsStorage;
use kb_theme::{PaywallOptions, Tier};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Content source directory.
    pub source_dir: PathBuf,
    /// Theme options for the site (paywall, pricing, news, tools).
    pub options: SiteOptions,
    /// Site chrome (title, nav, footer) shared by HTML pages and the site API.
    pub chrome: SiteChrome,
    /// Enable verbose output.
    pub verbose: bool,
    /// Application version (for cache invalidation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            source_dir: PathBuf::from("docs"),
            options: SiteOptions::default(),
            chrome: SiteChrome::default(),
            verbose: false,
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Create shared storage backend
    let storage: Arc<dyn kb_storage::Storage> = Arc::new(FsStorage::new(config.source_dir));

    // Create unified Site with storage and theme options
    let site = Arc::new(Site::new(storage, config.options));

    // Create app state
    let state = Arc::new(AppState {
        site,
        chrome: config.chrome,
        verbose: config.verbose,
        version: config.version,
    });

    // Create router
    let app = app::create_router(state);

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from KB config.
///
/// # Arguments
///
/// * `config` - KB configuration
/// * `version` - Application version
/// * `verbose` - Enable verbose output
#[must_use]
pub fn server_config_from_config(
    config: &kb_config::Config,
    version: String,
    verbose: bool,
) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: config.docs_resolved.source_dir.clone(),
        options: site_options_from_config(config),
        chrome: chrome_from_config(config),
        verbose,
        version,
    }
}

/// Derive theme options for the site from KB config.
///
/// Also used by the offline build command, which renders pages without a
/// running server.
#[must_use]
pub fn site_options_from_config(config: &kb_config::Config) -> SiteOptions {
    SiteOptions {
        extract_title: true,
        paywall: PaywallOptions {
            teaser_words: config.theme.paywall.teaser_words,
            cta_text: config.theme.paywall.cta_text.clone(),
            cta_link: config.theme.paywall.cta_link.clone(),
        },
        tiers: config
            .theme
            .pricing
            .tiers
            .iter()
            .map(|tier| Tier {
                name: tier.name.clone(),
                price: tier.price.clone(),
                period: tier.period.clone(),
                features: tier.features.clone(),
                cta_text: tier.cta_text.clone(),
                cta_link: tier.cta_link.clone(),
                highlighted: tier.highlighted,
            })
            .collect(),
        news_section: config.theme.news.section.clone(),
        news_limit: config.theme.news.limit,
        tools_catalog: config.theme.tools_resolved.catalog.clone(),
    }
}

/// Derive the site chrome from KB config.
#[must_use]
pub fn chrome_from_config(config: &kb_config::Config) -> SiteChrome {
    SiteChrome {
        title: config.site.title.clone(),
        description: config.site.description.clone(),
        nav: config.theme.nav.iter().map(nav_link).collect(),
        sidebar: config
            .theme
            .sidebar
            .iter()
            .map(|group| SidebarGroup {
                text: group.text.clone(),
                items: group.items.iter().map(nav_link).collect(),
            })
            .collect(),
        footer: Footer {
            message: config.theme.footer.message.clone(),
            copyright: config.theme.footer.copyright.clone(),
        },
        search: config.theme.search.as_ref().map(|search| Search {
            provider: search.provider.clone(),
            translations: search.translations.clone(),
        }),
    }
}

fn nav_link(entry: &kb_config::NavEntry) -> NavLink {
    NavLink {
        text: entry.text.clone(),
        link: entry.link.clone(),
    }
}
