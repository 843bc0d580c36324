//! Tools gallery component.
//!
//! `::tools-gallery` renders a curated tool catalog grouped by category,
//! in catalog order. A `{category="X"}` attribute narrows the gallery to
//! one category (matched case-insensitively). Entries not marked
//! `approved: true` in the catalog are never rendered.

use std::fs;
use std::path::{Path, PathBuf};

use kb_renderer::component::{BlockComponent, ComponentArgs, ComponentContext, ComponentOutput};
use kb_renderer::escape_html;
use serde::Deserialize;
use thiserror::Error;

/// One entry of the tools catalog.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ToolEntry {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Catalog entries default to unapproved; only explicit
    /// `approved: true` makes an entry visible.
    #[serde(default)]
    pub approved: bool,
}

/// Failed to load a tools catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read tools catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse tools catalog {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Load a YAML tools catalog.
///
/// An empty file is an empty catalog, not an error.
pub fn load_tools_catalog(path: &Path) -> Result<Vec<ToolEntry>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_owned(),
        source,
    })?;

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_yaml::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// The `::tools-gallery` block component.
pub struct ToolsGallery {
    tools: Vec<ToolEntry>,
}

impl ToolsGallery {
    #[must_use]
    pub fn new(tools: Vec<ToolEntry>) -> Self {
        Self { tools }
    }

    fn render_tool(html: &mut String, tool: &ToolEntry) {
        html.push_str(r#"<div class="kb-tool"><a class="kb-tool-name" href=""#);
        html.push_str(&escape_html(&tool.link));
        html.push_str(r#"">"#);
        html.push_str(&escape_html(&tool.name));
        html.push_str("</a>");

        if !tool.description.is_empty() {
            html.push_str(r#"<p class="kb-tool-description">"#);
            html.push_str(&escape_html(&tool.description));
            html.push_str("</p>");
        }

        if !tool.tags.is_empty() {
            html.push_str(r#"<div class="kb-tool-tags">"#);
            for tag in &tool.tags {
                html.push_str(r#"<span class="kb-tool-tag">"#);
                html.push_str(&escape_html(tag));
                html.push_str("</span>");
            }
            html.push_str("</div>");
        }

        html.push_str("</div>");
    }
}

impl BlockComponent for ToolsGallery {
    fn name(&self) -> &'static str {
        "tools-gallery"
    }

    fn render(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
        let category_filter = args.get("category");

        // Approved entries only, grouped by category in catalog order.
        let mut groups: Vec<(&str, Vec<&ToolEntry>)> = Vec::new();
        for tool in &self.tools {
            if !tool.approved {
                continue;
            }
            if let Some(filter) = category_filter {
                if !tool.category.eq_ignore_ascii_case(filter) {
                    continue;
                }
            }
            match groups.iter_mut().find(|(name, _)| *name == tool.category) {
                Some((_, entries)) => entries.push(tool),
                None => groups.push((&tool.category, vec![tool])),
            }
        }

        let mut html = String::with_capacity(256 * self.tools.len().max(1));
        if groups.is_empty() {
            html.push_str(r#"<div class="kb-tools kb-tools--empty">"#);
        } else {
            html.push_str(r#"<div class="kb-tools">"#);
        }

        for (category, entries) in &groups {
            html.push_str(r#"<div class="kb-tools-category"><h3 class="kb-tools-category-name">"#);
            html.push_str(&escape_html(category));
            html.push_str("</h3>");
            for tool in entries {
                Self::render_tool(&mut html, tool);
            }
            html.push_str("</div>");
        }

        html.push_str("</div>");
        ComponentOutput::html(html)
    }
}
