//! HTML renderer for knowledge-base pages.

use std::borrow::Cow;
use std::fmt::Write;

use pulldown_cmark::{
    BlockQuoteKind, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};

use crate::component::ComponentRegistry;
use crate::links::resolve_link;
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, TocEntry, escape_html};

// SVG icons for alerts (GitHub Octicons-style, 16x16)
const SVG_INFO: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M0 8a8 8 0 1 1 16 0A8 8 0 0 1 0 8Zm8-6.5a6.5 6.5 0 1 0 0 13 6.5 6.5 0 0 0 0-13ZM6.5 7.75A.75.75 0 0 1 7.25 7h1a.75.75 0 0 1 .75.75v2.75h.25a.75.75 0 0 1 0 1.5h-2a.75.75 0 0 1 0-1.5h.25v-2h-.25a.75.75 0 0 1-.75-.75ZM8 6a1 1 0 1 1 0-2 1 1 0 0 1 0 2Z"></path></svg>"#;
const SVG_LIGHTBULB: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M8 1.5c-2.363 0-4 1.69-4 3.75 0 .984.424 1.625.984 2.304l.214.253c.223.264.47.556.673.848.284.411.537.896.621 1.49a.75.75 0 0 1-1.484.211c-.04-.282-.163-.547-.37-.847a8.456 8.456 0 0 0-.542-.68c-.084-.1-.173-.205-.268-.32C3.201 7.75 2.5 6.766 2.5 5.25 2.5 2.31 4.863 0 8 0s5.5 2.31 5.5 5.25c0 1.516-.701 2.5-1.328 3.259-.095.115-.184.22-.268.319-.207.245-.383.453-.541.681-.208.3-.33.565-.37.847a.751.751 0 0 1-1.485-.212c.084-.593.337-1.078.621-1.489.203-.292.45-.584.673-.848.075-.088.147-.173.213-.253.561-.679.985-1.32.985-2.304 0-2.06-1.637-3.75-4-3.75ZM5.75 12h4.5a.75.75 0 0 1 0 1.5h-4.5a.75.75 0 0 1 0-1.5ZM6 15.25a.75.75 0 0 1 .75-.75h2.5a.75.75 0 0 1 0 1.5h-2.5a.75.75 0 0 1-.75-.75Z"></path></svg>"#;
const SVG_REPORT: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M0 1.75C0 .784.784 0 1.75 0h12.5C15.216 0 16 .784 16 1.75v9.5A1.75 1.75 0 0 1 14.25 13H8.06l-2.573 2.573A1.458 1.458 0 0 1 3 14.543V13H1.75A1.75 1.75 0 0 1 0 11.25Zm1.75-.25a.25.25 0 0 0-.25.25v9.5c0 .138.112.25.25.25h2a.75.75 0 0 1 .75.75v2.19l2.72-2.72a.749.749 0 0 1 .53-.22h6.5a.25.25 0 0 0 .25-.25v-9.5a.25.25 0 0 0-.25-.25Zm7 2.25v2.5a.75.75 0 0 1-1.5 0v-2.5a.75.75 0 0 1 1.5 0ZM9 9a1 1 0 1 1-2 0 1 1 0 0 1 2 0Z"></path></svg>"#;
const SVG_ALERT: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M6.457 1.047c.659-1.234 2.427-1.234 3.086 0l6.082 11.378A1.75 1.75 0 0 1 14.082 15H1.918a1.75 1.75 0 0 1-1.543-2.575Zm1.763.707a.25.25 0 0 0-.44 0L1.698 13.132a.25.25 0 0 0 .22.368h12.164a.25.25 0 0 0 .22-.368Zm.53 3.996v2.5a.75.75 0 0 1-1.5 0v-2.5a.75.75 0 0 1 1.5 0ZM9 11a1 1 0 1 1-2 0 1 1 0 0 1 2 0Z"></path></svg>"#;
const SVG_STOP: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M4.47.22A.749.749 0 0 1 5 0h6c.199 0 .389.079.53.22l4.25 4.25c.141.14.22.331.22.53v6a.749.749 0 0 1-.22.53l-4.25 4.25A.749.749 0 0 1 11 16H5a.749.749 0 0 1-.53-.22L.22 11.53A.749.749 0 0 1 0 11V5c0-.199.079-.389.22-.53Zm.84 1.28L1.5 5.31v5.38l3.81 3.81h5.38l3.81-3.81V5.31L10.69 1.5ZM8 4a.75.75 0 0 1 .75.75v3.5a.75.75 0 0 1-1.5 0v-3.5A.75.75 0 0 1 8 4Zm0 8a1 1 0 1 1 0-2 1 1 0 0 1 0 2Z"></path></svg>"#;

/// Result of rendering a page.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Title extracted from the first H1 heading (if enabled).
    pub title: Option<String>,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Warnings generated during conversion (e.g., unclosed components).
    pub warnings: Vec<String>,
}

/// Markdown-to-HTML renderer.
///
/// Produces semantic HTML5 with heading anchors, GFM tables/task
/// lists/alerts, and relative `.md` link rewriting. Heading IDs are
/// deduplicated per renderer, so use one renderer per page.
///
/// # Example
///
/// ```
/// use kb_renderer::HtmlRenderer;
///
/// let mut renderer = HtmlRenderer::new().with_title_extraction();
/// let result = renderer.render_markdown("# Hello\n\n**Bold** text");
/// assert_eq!(result.title.as_deref(), Some("Hello"));
/// ```
pub struct HtmlRenderer {
    output: String,
    list_stack: Vec<bool>,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    base_path: Option<String>,
    pending_image: Option<(String, String)>,
    gfm: bool,
    /// Stack of blockquote kinds; `true` marks a GFM alert.
    alert_stack: Vec<bool>,
}

impl HtmlRenderer {
    /// Create a new renderer with GFM enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            list_stack: Vec::new(),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(false),
            base_path: None,
            pending_image: None,
            gfm: true,
            alert_stack: Vec::new(),
        }
    }

    /// Enable title extraction from the first H1 heading.
    ///
    /// The H1 is still rendered; it becomes `RenderResult::title` and is
    /// kept out of the table of contents.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.heading = HeadingState::new(true);
        self
    }

    /// Set the page URL path used for resolving relative `.md` links.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default: tables, strikethrough (`~~text~~`),
    /// task lists (`- [ ] item`), and alert blockquotes (`> [!NOTE]`).
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render markdown text directly using configured parser options.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, self.parser_options());
        for event in parser {
            self.process_event(event);
        }

        RenderResult {
            html: std::mem::take(&mut self.output),
            title: self.heading.take_title(),
            toc: self.heading.take_toc(),
            warnings: Vec::new(),
        }
    }

    /// Render markdown through a component registry.
    ///
    /// Component syntax is expanded first, the result is rendered, and
    /// collected post-processing replacements are applied to the HTML.
    /// Registry warnings end up on the result.
    pub fn render_with_components(
        &mut self,
        markdown: &str,
        registry: &mut ComponentRegistry,
    ) -> RenderResult {
        let processed = registry.process(markdown);
        let mut result = self.render_markdown(&processed);
        registry.post_process(&mut result.html);
        result.warnings = registry.warnings();
        result
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.output.push_str("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the ID is known
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(kind) => {
                if let Some(kind) = kind {
                    self.alert_stack.push(true);
                    alert_open(kind, &mut self.output);
                } else {
                    self.alert_stack.push(false);
                    self.output.push_str("<blockquote>");
                }
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        info.split_whitespace().next().map(str::to_owned)
                    }
                    _ => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => {
                self.list_stack.push(start.is_some());
                match start {
                    Some(1) => self.output.push_str("<ol>"),
                    Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                    None => self.output.push_str("<ul>"),
                }
            }
            Tag::Item => {
                self.output.push_str("<li>");
            }
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => {
                self.output.push_str("<dl>");
            }
            Tag::DefinitionListTitle => {
                self.output.push_str("<dt>");
            }
            Tag::DefinitionListDefinition => {
                self.output.push_str("<dd>");
            }
            Tag::Table(alignments) => {
                self.table.start(alignments.clone());
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link { dest_url, .. } => {
                let href = match self.base_path.as_deref() {
                    Some(base) => Cow::Owned(resolve_link(&dest_url, base)),
                    None => Cow::Borrowed(dest_url.as_ref()),
                };
                let link_tag = format!(r#"<a href="{}">"#, escape_html(&href));
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected as events; image written in end_tag
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(_level) => {
                if let Some((level, id, _text, html)) = self.heading.complete_heading() {
                    write!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => {
                if self.alert_stack.pop() == Some(true) {
                    self.output.push_str("</div></div>");
                } else {
                    self.output.push_str("</blockquote>");
                }
            }
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                if let Some(lang) = lang {
                    write!(
                        self.output,
                        r#"<pre><code class="language-{}">{}</code></pre>"#,
                        escape_html(&lang),
                        escape_html(&content)
                    )
                    .unwrap();
                } else {
                    write!(
                        self.output,
                        "<pre><code>{}</code></pre>",
                        escape_html(&content)
                    )
                    .unwrap();
                }
            }
            TagEnd::List(ordered) => {
                self.list_stack.pop();
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => {
                self.output.push_str("</li>");
            }
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, escape_html(&title))
                    };
                    write!(
                        self.output,
                        r#"<img src="{}"{title_attr} alt="{}">"#,
                        escape_html(&src),
                        escape_html(&alt)
                    )
                    .unwrap();
                }
            }
            TagEnd::DefinitionList => {
                self.output.push_str("</dl>");
            }
            TagEnd::DefinitionListTitle => {
                self.output.push_str("</dt>");
            }
            TagEnd::DefinitionListDefinition => {
                self.output.push_str("</dd>");
            }
            TagEnd::Table => {
                self.output.push_str("</tbody></table>");
            }
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => {
                self.output.push_str("</tr>");
            }
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.heading.is_active() {
            self.heading.push_text(code);
            write!(
                self.heading.html_buffer(),
                "<code>{}</code>",
                escape_html(code)
            )
            .unwrap();
        } else {
            write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
        }
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else {
            self.output.push('\n');
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        self.output.push_str(if checked {
            r#"<input type="checkbox" checked disabled> "#
        } else {
            r#"<input type="checkbox" disabled> "#
        });
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the opening markup for a GFM alert blockquote.
fn alert_open(kind: BlockQuoteKind, out: &mut String) {
    let (class, icon, title) = match kind {
        BlockQuoteKind::Note => ("note", SVG_INFO, "Note"),
        BlockQuoteKind::Tip => ("tip", SVG_LIGHTBULB, "Tip"),
        BlockQuoteKind::Important => ("important", SVG_REPORT, "Important"),
        BlockQuoteKind::Warning => ("warning", SVG_ALERT, "Warning"),
        BlockQuoteKind::Caution => ("caution", SVG_STOP, "Caution"),
    };
    write!(
        out,
        r#"<div class="alert alert-{class}"><div class="alert-title">{icon}{title}</div><div class="alert-content">"#
    )
    .unwrap();
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::component::{
        BlockComponent, ComponentArgs, ComponentContext, ComponentOutput, Replacements,
    };

    fn render(markdown: &str) -> RenderResult {
        HtmlRenderer::new().render_markdown(markdown)
    }

    #[test]
    fn test_basic_paragraph() {
        let result = render("Hello, world!");
        assert_eq!(result.html, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_with_id() {
        let result = render("## Section Title");
        assert_eq!(result.html, r#"<h2 id="section-title">Section Title</h2>"#);
        assert_eq!(result.toc.len(), 1);
        assert_eq!(result.toc[0].level, 2);
        assert_eq!(result.toc[0].title, "Section Title");
        assert_eq!(result.toc[0].id, "section-title");
    }

    #[test]
    fn test_title_extraction() {
        let markdown = "# My Title\n\nSome content\n\n## Section";
        let result = HtmlRenderer::new()
            .with_title_extraction()
            .render_markdown(markdown);

        assert_eq!(result.title, Some("My Title".to_string()));
        // H1 is still rendered
        assert!(result.html.contains(r#"<h1 id="my-title">My Title</h1>"#));
        // ToC excludes the title but includes other headings
        assert_eq!(result.toc.len(), 1);
        assert_eq!(result.toc[0].level, 2);
    }

    #[test]
    fn test_code_block() {
        let result = render("```rust\nfn main() {}\n```");
        assert!(result.html.contains(r#"class="language-rust""#));
        assert!(result.html.contains("fn main() {}"));
    }

    #[test]
    fn test_code_block_without_language() {
        let result = render("```\nplain text\n```");
        assert!(result.html.contains("<pre><code>"));
        assert!(result.html.contains("plain text"));
    }

    #[test]
    fn test_code_block_escapes_html() {
        let result = render("```\n<script>alert(1)</script>\n```");
        assert!(result.html.contains("&lt;script&gt;"));
        assert!(!result.html.contains("<script>"));
    }

    #[test]
    fn test_blockquote() {
        let result = render("> Note");
        assert!(result.html.contains("<blockquote>"));
        assert!(result.html.contains("</blockquote>"));
    }

    #[test]
    fn test_note_alert() {
        let result = render("> [!NOTE]\n> This is a **note**.");
        assert!(result.html.contains("alert-note"));
        assert!(result.html.contains("<strong>note</strong>"));
    }

    #[test]
    fn test_tip_alert() {
        let result = render("> [!TIP]\n> This is a tip.");
        assert!(result.html.contains("alert-tip"));
        assert!(result.html.contains(r#"<svg class="alert-icon""#));
    }

    #[test]
    fn test_important_alert() {
        let result = render("> [!IMPORTANT]\n> Critical information.");
        assert!(result.html.contains("alert-important"));
    }

    #[test]
    fn test_warning_alert() {
        let result = render("> [!WARNING]\n> Be careful!");
        assert!(result.html.contains("alert-warning"));
    }

    #[test]
    fn test_caution_alert() {
        let result = render("> [!CAUTION]\n> Dangerous operation.");
        assert!(result.html.contains("alert-caution"));
    }

    #[test]
    fn test_alert_with_list() {
        let result = render("> [!WARNING]\n> Be careful:\n> - Item 1\n> - Item 2");
        assert!(result.html.contains("alert-warning"));
        assert!(result.html.contains("<ul>"));
        assert!(result.html.contains("<li>"));
    }

    #[test]
    fn test_regular_blockquote_not_alert() {
        let result = render("> Just a regular quote");
        assert!(result.html.contains("<blockquote>"));
        assert!(!result.html.contains("alert"));
    }

    #[test]
    fn test_image() {
        let result = render("![Alt text](image.png)");
        assert!(
            result
                .html
                .contains(r#"<img src="image.png" alt="Alt text">"#)
        );
    }

    #[test]
    fn test_image_with_title() {
        let result = render(r#"![Alt text](image.png "Hover title")"#);
        assert!(
            result
                .html
                .contains(r#"<img src="image.png" title="Hover title" alt="Alt text">"#)
        );
    }

    #[test]
    fn test_table() {
        let result = render("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(result.html.contains("<table>"));
        assert!(result.html.contains("<thead>"));
        assert!(result.html.contains("<th>"));
        assert!(result.html.contains("<tbody>"));
        assert!(result.html.contains("<td>"));
    }

    #[test]
    fn test_table_alignment() {
        let result = render("| A | B |\n|:--|--:|\n| 1 | 2 |");
        assert!(result.html.contains(r#"style="text-align:left""#));
        assert!(result.html.contains(r#"style="text-align:right""#));
    }

    #[test]
    fn test_link_with_base_path() {
        let result = HtmlRenderer::new()
            .with_base_path("guide/members")
            .render_markdown("[Link](./upgrade.md)");
        assert!(result.html.contains(r#"href="/guide/members/upgrade""#));
    }

    #[test]
    fn test_link_without_base_path() {
        let result = render("[Link](./upgrade.md)");
        assert!(result.html.contains(r#"href="./upgrade.md""#));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let result = render("## FAQ\n\n## FAQ\n\n## FAQ");
        assert_eq!(result.toc.len(), 3);
        assert_eq!(result.toc[0].id, "faq");
        assert_eq!(result.toc[1].id, "faq-1");
        assert_eq!(result.toc[2].id, "faq-2");
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## Install `kb`");
        assert!(result.html.contains("<code>kb</code>"));
        assert_eq!(result.toc[0].title, "Install kb");
    }

    #[test]
    fn test_emphasis() {
        let result = render("*italic* and **bold**");
        assert!(result.html.contains("<em>italic</em>"));
        assert!(result.html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_strikethrough() {
        let result = render("~~deleted~~");
        assert!(result.html.contains("<s>deleted</s>"));
    }

    #[test]
    fn test_lists() {
        let result = render("- Item 1\n- Item 2");
        assert!(result.html.contains("<ul>"));
        assert!(result.html.contains("<li>"));
        assert!(result.html.contains("</ul>"));

        let result = render("1. First\n2. Second");
        assert!(result.html.contains("<ol>"));
        assert!(result.html.contains("</ol>"));
    }

    #[test]
    fn test_ordered_list_with_start() {
        let result = render("3. Third\n4. Fourth");
        assert!(result.html.contains(r#"<ol start="3">"#));
    }

    #[test]
    fn test_task_list() {
        let result = render("- [ ] Unchecked\n- [x] Checked");
        assert!(result.html.contains(r#"<input type="checkbox" disabled>"#));
        assert!(
            result
                .html
                .contains(r#"<input type="checkbox" checked disabled>"#)
        );
    }

    #[test]
    fn test_text_escaped() {
        let result = render("5 < 6 & 7 > 2");
        assert!(result.html.contains("5 &lt; 6 &amp; 7 &gt; 2"));
    }

    #[test]
    fn test_gfm_disabled() {
        let result = HtmlRenderer::new()
            .with_gfm(false)
            .render_markdown("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(!result.html.contains("<table>"));
    }

    #[test]
    fn test_parser_options_with_gfm() {
        let renderer = HtmlRenderer::new();
        let options = renderer.parser_options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(options.contains(Options::ENABLE_TASKLISTS));
        assert!(options.contains(Options::ENABLE_GFM));
    }

    #[test]
    fn test_parser_options_without_gfm() {
        let renderer = HtmlRenderer::new().with_gfm(false);
        assert_eq!(renderer.parser_options(), Options::empty());
    }

    #[test]
    fn test_default_renderer() {
        let result = HtmlRenderer::default().render_markdown("Hello");
        assert_eq!(result.html, "<p>Hello</p>");
    }

    // Component pipeline tests

    struct TestEmbed;

    impl BlockComponent for TestEmbed {
        fn name(&self) -> &'static str {
            "embed"
        }

        fn render(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
            ComponentOutput::html(format!(r#"<div class="embed">{}</div>"#, args.content))
        }
    }

    struct TestMarker;

    impl BlockComponent for TestMarker {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn render(&mut self, _args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
            ComponentOutput::html("<kb-marker></kb-marker>")
        }

        fn post_process(&mut self, replacements: &mut Replacements) {
            replacements.add("<kb-marker></kb-marker>", r#"<div class="marker"></div>"#);
        }
    }

    #[test]
    fn test_render_with_components() {
        let mut registry = ComponentRegistry::new().with_block(TestEmbed);
        let mut renderer = HtmlRenderer::new();

        let result = renderer.render_with_components("Before\n\n::embed[demo]\n\nAfter", &mut registry);
        assert!(result.html.contains(r#"<div class="embed">demo</div>"#));
        assert!(result.html.contains("<p>Before</p>"));
        assert!(result.html.contains("<p>After</p>"));
    }

    #[test]
    fn test_render_with_components_post_process() {
        let mut registry = ComponentRegistry::new().with_block(TestMarker);
        let mut renderer = HtmlRenderer::new();

        let result = renderer.render_with_components("::marker", &mut registry);
        assert!(result.html.contains(r#"<div class="marker"></div>"#));
        assert!(!result.html.contains("<kb-marker>"));
    }

    #[test]
    fn test_render_with_components_collects_warnings() {
        let mut registry = ComponentRegistry::new();
        let mut renderer = HtmlRenderer::new();

        let result = renderer.render_with_components(":::\n", &mut registry);
        assert!(result.warnings.iter().any(|w| w.contains("stray")));
    }

    #[test]
    fn test_component_syntax_in_fence_untouched() {
        let mut registry = ComponentRegistry::new().with_block(TestEmbed);
        let mut renderer = HtmlRenderer::new();

        let result =
            renderer.render_with_components("```\n::embed[demo]\n```", &mut registry);
        assert!(result.html.contains("::embed[demo]"));
        assert!(!result.html.contains(r#"class="embed""#));
    }
}
