//! Markdown renderer with a component registry for theme extensions.
//!
//! This crate provides [`HtmlRenderer`], which converts markdown pages to
//! semantic HTML5, and a [`component`] registry through which themes plug
//! custom syntax (inline `:name`, block `::name`, container `:::name`)
//! into the render pipeline.
//!
//! # Architecture
//!
//! Rendering is a three-step pipeline:
//!
//! 1. Component syntax is expanded by a [`component::ComponentRegistry`]
//!    (registered handlers run; unknown names pass through untouched).
//! 2. The resulting markdown goes through pulldown-cmark into HTML with
//!    heading anchors, a table of contents, GFM tables/alerts, and
//!    relative `.md` link rewriting.
//! 3. Handler post-processing replacements are applied to the HTML.
//!
//! # Example
//!
//! ```
//! use kb_renderer::HtmlRenderer;
//!
//! let markdown = "# Hello\n\n**Bold** text";
//! let result = HtmlRenderer::new()
//!     .with_title_extraction()
//!     .render_markdown(markdown);
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! ```

pub mod component;
mod links;
mod renderer;
mod state;

pub use renderer::{HtmlRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
