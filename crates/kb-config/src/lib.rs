//! Configuration management for KB.
//!
//! Parses `kb.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! When the `[env]` section configures a directory, `.env` and `.env.local`
//! files in it are sourced before expansion. Process environment variables
//! take precedence over file entries.
//!
//! Expanded fields:
//! - `site.title`
//! - `site.description`
//! - `server.host`
//! - `theme.search.provider`
//! - `theme.paywall.cta_link`

mod expand;

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "kb.toml";

/// Search providers the front end knows how to mount.
const SEARCH_PROVIDERS: &[&str] = &["local", "algolia"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity.
    pub site: SiteConfig,
    /// Server configuration.
    pub server: ServerConfig,
    /// Documentation configuration (paths are relative strings from TOML).
    #[serde(default)]
    docs: DocsConfigRaw,
    /// Env file sourcing (optional section).
    env: Option<EnvConfigRaw>,
    /// Theme configuration: navigation chrome and component settings.
    pub theme: ThemeConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site identity shown in the page chrome.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Site description (meta tag and header subtitle).
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Knowledge Base".to_owned(),
            description: String::new(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7878,
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
}

/// Raw env sourcing configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EnvConfigRaw {
    /// Directory containing `.env` files, relative to the config file.
    dir: Option<String>,
}

/// Theme configuration: navigation chrome plus component settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Top navigation entries, in order.
    pub nav: Vec<NavEntry>,
    /// Sidebar groups, in order.
    pub sidebar: Vec<SidebarGroup>,
    /// Footer content.
    pub footer: FooterConfig,
    /// Search configuration (optional section).
    /// When present, `provider` is required.
    pub search: Option<SearchConfig>,
    /// Content gating settings.
    pub paywall: PaywallConfig,
    /// Pricing tiers rendered by the pricing component.
    pub pricing: PricingConfig,
    /// News gallery settings.
    pub news: NewsConfig,
    /// Tools catalog (path as string from TOML).
    tools: ToolsConfigRaw,

    /// Resolved tools configuration (set after loading).
    #[serde(skip)]
    pub tools_resolved: ToolsConfig,
}

/// A navigation link.
#[derive(Debug, Clone, Deserialize)]
pub struct NavEntry {
    /// Link label.
    pub text: String,
    /// Link target.
    pub link: String,
}

/// A sidebar group with its links.
#[derive(Debug, Clone, Deserialize)]
pub struct SidebarGroup {
    /// Group heading.
    pub text: String,
    /// Links in the group, in order.
    #[serde(default)]
    pub items: Vec<NavEntry>,
}

/// Footer content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FooterConfig {
    /// Footer message line.
    pub message: Option<String>,
    /// Copyright line.
    pub copyright: Option<String>,
}

/// Search configuration: a provider id plus translation strings.
///
/// The engine does not implement search; it hands this data to the front
/// end, which mounts the named provider.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Provider identifier (`local` or `algolia`).
    pub provider: String,
    /// Translation strings (button labels, modal labels) keyed by name.
    #[serde(default)]
    pub translations: HashMap<String, String>,
}

/// Content gating settings for the paywall component.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaywallConfig {
    /// Teaser length in words for locked content.
    pub teaser_words: usize,
    /// Call-to-action label on locked content.
    pub cta_text: String,
    /// Call-to-action link target on locked content.
    pub cta_link: String,
}

impl Default for PaywallConfig {
    fn default() -> Self {
        Self {
            teaser_words: 30,
            cta_text: "Unlock full access".to_owned(),
            cta_link: "/pricing".to_owned(),
        }
    }
}

/// Pricing tiers for the pricing component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Tiers in display order.
    pub tiers: Vec<TierConfig>,
}

/// A single pricing tier.
#[derive(Debug, Clone, Deserialize)]
pub struct TierConfig {
    /// Tier name.
    pub name: String,
    /// Displayed price (free-form, e.g. "$12").
    pub price: String,
    /// Billing period displayed after the price (e.g. "/ month").
    pub period: Option<String>,
    /// Feature lines.
    #[serde(default)]
    pub features: Vec<String>,
    /// Call-to-action label.
    pub cta_text: Option<String>,
    /// Call-to-action link target.
    pub cta_link: Option<String>,
    /// Visually emphasize this tier.
    #[serde(default)]
    pub highlighted: bool,
}

/// News gallery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Section (top-level directory) holding dated news pages.
    pub section: String,
    /// Maximum number of items the gallery shows.
    pub limit: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            section: "news".to_owned(),
            limit: 10,
        }
    }
}

/// Raw tools configuration as parsed from TOML (path as string).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ToolsConfigRaw {
    catalog: Option<String>,
}

/// Resolved tools configuration with absolute paths.
#[derive(Debug, Clone, Default)]
pub struct ToolsConfig {
    /// Path to the YAML tools catalog, if configured.
    pub catalog: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`theme.paywall.cta_link`").
        field: String,
        /// Error message (e.g., "${`KB_CHECKOUT_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `kb.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            env: None,
            theme: ThemeConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));

        // Source .env files before expansion so their variables participate
        let env_vars = match &config.env {
            Some(env) => {
                let dir = config_dir.join(env.dir.as_deref().unwrap_or("."));
                expand::load_env_dir(&dir)?
            }
            None => expand::EnvVars::new(),
        };

        config.expand_env_vars(&env_vars)?;
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_theme()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate theme configuration.
    ///
    /// Empty nav, sidebar, and tier lists are valid; entries that do exist
    /// must be complete.
    fn validate_theme(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.theme.nav.iter().enumerate() {
            require_non_empty(&entry.text, &format!("theme.nav[{i}].text"))?;
            require_non_empty(&entry.link, &format!("theme.nav[{i}].link"))?;
        }

        for (i, group) in self.theme.sidebar.iter().enumerate() {
            require_non_empty(&group.text, &format!("theme.sidebar[{i}].text"))?;
            for (j, item) in group.items.iter().enumerate() {
                require_non_empty(&item.text, &format!("theme.sidebar[{i}].items[{j}].text"))?;
                require_non_empty(&item.link, &format!("theme.sidebar[{i}].items[{j}].link"))?;
            }
        }

        if let Some(search) = &self.theme.search {
            require_non_empty(&search.provider, "theme.search.provider")?;
            if !SEARCH_PROVIDERS.contains(&search.provider.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "theme.search.provider must be one of: {}",
                    SEARCH_PROVIDERS.join(", ")
                )));
            }
        }

        if self.theme.paywall.teaser_words == 0 {
            return Err(ConfigError::Validation(
                "theme.paywall.teaser_words must be greater than 0".to_owned(),
            ));
        }
        require_non_empty(&self.theme.paywall.cta_text, "theme.paywall.cta_text")?;
        require_non_empty(&self.theme.paywall.cta_link, "theme.paywall.cta_link")?;

        for (i, tier) in self.theme.pricing.tiers.iter().enumerate() {
            require_non_empty(&tier.name, &format!("theme.pricing.tiers[{i}].name"))?;
            require_non_empty(&tier.price, &format!("theme.pricing.tiers[{i}].price"))?;
        }

        require_non_empty(&self.theme.news.section, "theme.news.section")?;

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self, env_vars: &expand::EnvVars) -> Result<(), ConfigError> {
        self.site.title = expand::expand_env(&self.site.title, "site.title", env_vars)?;
        self.site.description =
            expand::expand_env(&self.site.description, "site.description", env_vars)?;
        self.server.host = expand::expand_env(&self.server.host, "server.host", env_vars)?;

        if let Some(ref mut search) = self.theme.search {
            search.provider =
                expand::expand_env(&search.provider, "theme.search.provider", env_vars)?;
        }
        self.theme.paywall.cta_link = expand::expand_env(
            &self.theme.paywall.cta_link,
            "theme.paywall.cta_link",
            env_vars,
        )?;

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
        };
        self.theme.tools_resolved = ToolsConfig {
            catalog: self
                .theme
                .tools
                .catalog
                .as_deref()
                .map(|c| config_dir.join(c)),
        };
    }
}
