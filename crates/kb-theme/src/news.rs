//! News gallery component.
//!
//! `::news-gallery` lists the most recent news entries, newest first. A
//! `{limit=N}` attribute (or `[N]` shorthand) caps the list for one
//! invocation. With no entries it renders an empty state.

use chrono::NaiveDate;
use kb_renderer::component::{BlockComponent, ComponentArgs, ComponentContext, ComponentOutput};
use kb_renderer::escape_html;

/// One news entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsItem {
    /// Publication date.
    pub date: NaiveDate,
    /// Entry title.
    pub title: String,
    /// Optional summary line.
    pub description: Option<String>,
    /// Site-relative page path, e.g. "news/2026-02-14-launch".
    pub path: String,
}

/// The `::news-gallery` block component.
pub struct NewsGallery {
    items: Vec<NewsItem>,
    default_limit: usize,
    warnings: Vec<String>,
}

impl NewsGallery {
    /// Create a gallery over the given entries.
    ///
    /// Items are ordered newest first regardless of input order.
    #[must_use]
    pub fn new(mut items: Vec<NewsItem>, default_limit: usize) -> Self {
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            items,
            default_limit,
            warnings: Vec::new(),
        }
    }

    fn render_item(html: &mut String, item: &NewsItem) {
        html.push_str(r#"<article class="kb-news-item">"#);

        html.push_str(&format!(
            r#"<time datetime="{}">{}</time>"#,
            item.date.format("%Y-%m-%d"),
            item.date.format("%B %-d, %Y")
        ));

        html.push_str(r#"<h3 class="kb-news-title"><a href="/"#);
        html.push_str(&escape_html(&item.path));
        html.push_str(r#"">"#);
        html.push_str(&escape_html(&item.title));
        html.push_str("</a></h3>");

        if let Some(description) = &item.description {
            html.push_str(r#"<p class="kb-news-description">"#);
            html.push_str(&escape_html(description));
            html.push_str("</p>");
        }

        html.push_str("</article>");
    }
}

impl BlockComponent for NewsGallery {
    fn name(&self) -> &'static str {
        "news-gallery"
    }

    fn render(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
        let override_limit = args
            .get("limit")
            .map(str::trim)
            .or_else(|| Some(args.content.trim()).filter(|s| !s.is_empty()));
        let limit = match override_limit {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                self.warnings.push(format!(
                    "news-gallery: invalid limit \"{raw}\", using {}",
                    self.default_limit
                ));
                self.default_limit
            }),
            None => self.default_limit,
        };

        let shown = &self.items[..limit.min(self.items.len())];

        let mut html = String::with_capacity(256 * shown.len().max(1));
        if shown.is_empty() {
            html.push_str(r#"<div class="kb-news kb-news--empty">"#);
        } else {
            html.push_str(r#"<div class="kb-news">"#);
        }

        for item in shown {
            Self::render_item(&mut html, item);
        }

        html.push_str("</div>");
        ComponentOutput::html(html)
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
