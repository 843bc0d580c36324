//! `kb build` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use kb_config::{CliSettings, Config};
use kb_server::{chrome_from_config, site_options_from_config};
use kb_site::{PageShell, Site, SiteChrome, render_page};
use kb_storage::{FsStorage, Storage};
use kb_theme::AccessState;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory for the generated site (default: dist/).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover kb.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render gated content unlocked (default: locked).
    #[arg(long)]
    entitled: bool,

    /// Enable verbose output (show render warnings).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let out_dir = self.out.unwrap_or_else(|| PathBuf::from("dist"));

        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!("Output: {}", out_dir.display()));

        // Static output has no access layer in front of it, so gated content
        // stays locked unless --entitled is passed.
        let access = AccessState::resolved(self.entitled);

        let storage: Arc<dyn Storage> =
            Arc::new(FsStorage::new(config.docs_resolved.source_dir.clone()));
        let site = Site::new(storage, site_options_from_config(&config));
        let chrome = chrome_from_config(&config);

        let count = build_site(&site, &chrome, &out_dir, access, self.verbose, &output)?;

        output.success(&format!("Built {count} pages to {}", out_dir.display()));
        Ok(())
    }
}

/// Render every page through the chrome shell into `out_dir`.
fn build_site(
    site: &Site,
    chrome: &SiteChrome,
    out_dir: &Path,
    access: AccessState,
    verbose: bool,
    output: &Output,
) -> Result<usize, CliError> {
    let pages = site.pages();
    if pages.is_empty() {
        output.warning("No pages found in source directory");
    }

    let navigation = site.navigation();
    for page in &pages {
        let result = site.render(&page.path, access)?;

        if verbose {
            for warning in &result.warnings {
                output.warning(&format!("{}: {warning}", page.path));
            }
        }

        let shell = PageShell {
            chrome,
            navigation: &navigation,
            title: &result.title,
            description: result.meta.description.as_deref(),
            breadcrumbs: &result.breadcrumbs,
            toc: &result.toc,
            content: &result.html,
        };

        let target = page_output_path(out_dir, &page.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, render_page(&shell))?;
    }

    Ok(pages.len())
}

/// Output file for a page path: the root lands at `index.html`, everything
/// else at `<path>/index.html` so URLs stay extension-free.
fn page_output_path(out_dir: &Path, path: &str) -> PathBuf {
    if path.is_empty() {
        out_dir.join("index.html")
    } else {
        out_dir.join(path).join("index.html")
    }
}
