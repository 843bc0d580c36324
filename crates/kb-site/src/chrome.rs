//! Site chrome and the static HTML page shell.
//!
//! [`SiteChrome`] carries the layout data every page shares: titles, header
//! links, sidebar groups, footer and search settings. The server serializes
//! it for clients and [`render_page`] wraps rendered page content in a
//! complete HTML document using the same data.

use std::collections::HashMap;
use std::fmt::Write;

use kb_renderer::{TocEntry, escape_html};
use serde::Serialize;

use crate::state::{BreadcrumbItem, NavItem};

/// A single navigation link.
#[derive(Clone, Debug, Serialize)]
pub struct NavLink {
    pub text: String,
    pub link: String,
}

/// A titled group of sidebar links.
#[derive(Clone, Debug, Serialize)]
pub struct SidebarGroup {
    pub text: String,
    pub items: Vec<NavLink>,
}

/// Footer lines; either may be omitted.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Footer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

/// Search widget settings passed through to clients.
#[derive(Clone, Debug, Serialize)]
pub struct Search {
    pub provider: String,
    pub translations: HashMap<String, String>,
}

/// Layout data shared by every page of the site.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteChrome {
    pub title: String,
    pub description: String,
    pub nav: Vec<NavLink>,
    pub sidebar: Vec<SidebarGroup>,
    pub footer: Footer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<Search>,
}

/// All data needed to render one page into the HTML shell.
pub struct PageShell<'a> {
    pub chrome: &'a SiteChrome,
    pub navigation: &'a [NavItem],
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub breadcrumbs: &'a [BreadcrumbItem],
    pub toc: &'a [TocEntry],
    pub content: &'a str,
}

/// Render a complete HTML page.
#[must_use]
pub fn render_page(page: &PageShell<'_>) -> String {
    let mut html = String::with_capacity(8192);

    // DOCTYPE and head
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&page_title(page)));
    if let Some(description) = page.description {
        let _ = writeln!(
            html,
            "<meta name=\"description\" content=\"{}\">",
            escape_html(description)
        );
    }
    render_style(&mut html);
    html.push_str("</head>\n<body>\n");
    html.push_str("<div class=\"kb-shell\">\n");

    // Header with site title and top navigation
    html.push_str("<header class=\"kb-header\">\n");
    let _ = writeln!(
        html,
        "<a class=\"kb-site-title\" href=\"/\">{}</a>",
        escape_html(&page.chrome.title)
    );
    if !page.chrome.nav.is_empty() {
        html.push_str("<nav class=\"kb-nav\">\n");
        for link in &page.chrome.nav {
            let _ = writeln!(
                html,
                "<a href=\"{}\">{}</a>",
                escape_html(&link.link),
                escape_html(&link.text)
            );
        }
        html.push_str("</nav>\n");
    }
    html.push_str("</header>\n");

    html.push_str("<div class=\"kb-layout\">\n");
    render_sidebar(&mut html, page);

    // Main content
    html.push_str("<main class=\"kb-main\">\n");
    render_breadcrumbs(&mut html, page.breadcrumbs);
    html.push_str("<article class=\"kb-content\">\n");
    html.push_str(page.content);
    html.push_str("\n</article>\n</main>\n");

    render_toc(&mut html, page.toc);
    html.push_str("</div>\n");

    render_footer(&mut html, &page.chrome.footer);
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

/// Browser tab title: page and site, or just the site for the home page.
fn page_title(page: &PageShell<'_>) -> String {
    if page.title.is_empty() || page.title == page.chrome.title {
        page.chrome.title.clone()
    } else {
        format!("{} | {}", page.title, page.chrome.title)
    }
}

/// Minimal layout styles, embedded so pages work without an asset pipeline.
fn render_style(html: &mut String) {
    html.push_str("<style>\n");
    html.push_str("body { margin: 0; font-family: system-ui, sans-serif; line-height: 1.6; }\n");
    html.push_str(".kb-shell { min-height: 100vh; display: flex; flex-direction: column; }\n");
    html.push_str(".kb-header { display: flex; align-items: baseline; gap: 1.5rem; ");
    html.push_str("padding: 0.75rem 1.5rem; border-bottom: 1px solid #ddd; }\n");
    html.push_str(".kb-site-title { font-weight: 600; text-decoration: none; color: inherit; }\n");
    html.push_str(".kb-nav a { margin-right: 1rem; }\n");
    html.push_str(".kb-layout { display: flex; flex: 1; gap: 2rem; padding: 1.5rem; }\n");
    html.push_str(".kb-sidebar { width: 240px; flex-shrink: 0; }\n");
    html.push_str(".kb-sidebar ul { list-style: none; padding-left: 0.75rem; }\n");
    html.push_str(".kb-main { flex: 1; min-width: 0; max-width: 48rem; }\n");
    html.push_str(".kb-toc { width: 200px; flex-shrink: 0; font-size: 0.875rem; }\n");
    html.push_str(".kb-breadcrumbs ol { display: flex; gap: 0.5rem; list-style: none; ");
    html.push_str("padding: 0; font-size: 0.875rem; }\n");
    html.push_str(".kb-breadcrumbs li + li::before { content: \"/\"; margin-right: 0.5rem; }\n");
    html.push_str(".kb-footer { padding: 1rem 1.5rem; border-top: 1px solid #ddd; ");
    html.push_str("font-size: 0.875rem; color: #555; }\n");
    html.push_str("</style>\n");
}

/// Render the sidebar: configured groups, or the page tree when none are
/// configured.
fn render_sidebar(html: &mut String, page: &PageShell<'_>) {
    html.push_str("<aside class=\"kb-sidebar\">\n");
    if page.chrome.sidebar.is_empty() {
        html.push_str("<nav>\n<ul>\n");
        render_nav_items(html, page.navigation);
        html.push_str("</ul>\n</nav>\n");
    } else {
        for group in &page.chrome.sidebar {
            let _ = writeln!(html, "<h3>{}</h3>", escape_html(&group.text));
            html.push_str("<ul>\n");
            for item in &group.items {
                let _ = writeln!(
                    html,
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_html(&item.link),
                    escape_html(&item.text)
                );
            }
            html.push_str("</ul>\n");
        }
    }
    html.push_str("</aside>\n");
}

/// Render navigation items recursively.
fn render_nav_items(html: &mut String, items: &[NavItem]) {
    for item in items {
        html.push_str("<li>");
        let _ = write!(
            html,
            "<a href=\"{}\">{}</a>",
            escape_html(&href(&item.path)),
            escape_html(&item.title)
        );
        if !item.children.is_empty() {
            html.push_str("\n<ul>\n");
            render_nav_items(html, &item.children);
            html.push_str("</ul>\n");
        }
        html.push_str("</li>\n");
    }
}

fn render_breadcrumbs(html: &mut String, breadcrumbs: &[BreadcrumbItem]) {
    if breadcrumbs.is_empty() {
        return;
    }
    html.push_str("<nav class=\"kb-breadcrumbs\">\n<ol>\n");
    for crumb in breadcrumbs {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(&href(&crumb.path)),
            escape_html(&crumb.title)
        );
    }
    html.push_str("</ol>\n</nav>\n");
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"kb-toc\">\n<h3>On this page</h3>\n<ul>\n");
    for entry in toc {
        let _ = writeln!(
            html,
            "<li><a href=\"#{}\">{}</a></li>",
            escape_html(&entry.id),
            escape_html(&entry.title)
        );
    }
    html.push_str("</ul>\n</aside>\n");
}

fn render_footer(html: &mut String, footer: &Footer) {
    if footer.message.is_none() && footer.copyright.is_none() {
        return;
    }
    html.push_str("<footer class=\"kb-footer\">\n");
    if let Some(ref message) = footer.message {
        let _ = writeln!(html, "<p>{}</p>", escape_html(message));
    }
    if let Some(ref copyright) = footer.copyright {
        let _ = writeln!(html, "<p>{}</p>", escape_html(copyright));
    }
    html.push_str("</footer>\n");
}

/// URL for a page path; the root page maps to `/`.
fn href(path: &str) -> String {
    format!("/{path}")
}
