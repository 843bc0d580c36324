//! Content gating.
//!
//! The paywall is a capturing container component: the region between
//! `::: paywall` and the closing `:::` never reaches the markdown renderer
//! unless the reader is entitled.
//!
//! ```markdown
//! ::: paywall
//! Full members-only content.
//! :::
//! ```
//!
//! Entitled readers get the region back as markdown inside an unlocked
//! wrapper. Everyone else (including readers whose entitlement is still
//! [`Pending`](AccessState::Pending)) gets a bounded teaser and a
//! call-to-action, rendered as escaped plain text so no gated markup can
//! leak. The decision is a pure function of the [`AccessState`] the
//! component was built with; a new render with a new state starts from a
//! fresh component.

use kb_renderer::component::{ComponentArgs, ComponentContext, ComponentOutput, ContainerComponent};
use kb_renderer::escape_html;

use crate::access::AccessState;

/// Paywall rendering options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaywallOptions {
    /// Teaser length in words for non-entitled readers.
    pub teaser_words: usize,
    /// Call-to-action label.
    pub cta_text: String,
    /// Call-to-action link target.
    pub cta_link: String,
}

impl Default for PaywallOptions {
    fn default() -> Self {
        Self {
            teaser_words: 30,
            cta_text: "Unlock full access".to_owned(),
            cta_link: "/pricing".to_owned(),
        }
    }
}

/// The content-gating container component.
///
/// Registered as `paywall`. A `teaser` attribute overrides the configured
/// teaser length for a single block: `::: paywall{teaser="12"}`.
pub struct PaywallComponent {
    options: PaywallOptions,
    access: AccessState,
    /// Effective teaser length for the block being captured.
    teaser_words: usize,
    body: String,
    warnings: Vec<String>,
}

impl PaywallComponent {
    /// Create a paywall for one render pass.
    #[must_use]
    pub fn new(options: PaywallOptions, access: AccessState) -> Self {
        let teaser_words = options.teaser_words;
        Self {
            options,
            access,
            teaser_words,
            body: String::new(),
            warnings: Vec::new(),
        }
    }

    /// Render the locked state: bounded teaser plus call-to-action.
    ///
    /// The teaser is escaped plain text taken from the raw captured body,
    /// so neither gated markup nor nested component syntax survives. The
    /// ellipsis appears only when words were actually dropped.
    fn locked_html(&self, body: &str) -> String {
        let mut html = String::with_capacity(256);
        html.push_str(r#"<div class="kb-paywall kb-paywall--locked">"#);

        let teaser = body
            .split_whitespace()
            .take(self.teaser_words)
            .collect::<Vec<_>>()
            .join(" ");
        if !teaser.is_empty() {
            html.push_str(r#"<p class="kb-paywall-teaser">"#);
            html.push_str(&escape_html(&teaser));
            if body.split_whitespace().nth(self.teaser_words).is_some() {
                html.push('…');
            }
            html.push_str("</p>");
        }

        html.push_str(r#"<div class="kb-paywall-cta"><a href=""#);
        html.push_str(&escape_html(&self.options.cta_link));
        html.push_str(r#"">"#);
        html.push_str(&escape_html(&self.options.cta_text));
        html.push_str("</a></div></div>");
        html
    }
}

impl ContainerComponent for PaywallComponent {
    fn name(&self) -> &'static str {
        "paywall"
    }

    fn start(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
        self.body.clear();
        self.teaser_words = match args.get("teaser") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                self.warnings.push(format!(
                    "paywall: invalid teaser value \"{raw}\", using {}",
                    self.options.teaser_words
                ));
                self.options.teaser_words
            }),
            None => self.options.teaser_words,
        };

        // Non-Skip marks the block as handled; end() emits the region.
        ComponentOutput::html(String::new())
    }

    fn captures_body(&self) -> bool {
        true
    }

    fn body_line(&mut self, line: &str) {
        self.body.push_str(line);
        self.body.push('\n');
    }

    fn end(&mut self, _ctx: &ComponentContext) -> ComponentOutput {
        let body = std::mem::take(&mut self.body);
        if self.access.is_entitled() {
            ComponentOutput::markdown(format!(
                "<div class=\"kb-paywall kb-paywall--unlocked\">\n\n{body}\n</div>"
            ))
        } else {
            ComponentOutput::html(self.locked_html(&body))
        }
    }

    fn end_unclosed(&mut self, _ctx: &ComponentContext) -> ComponentOutput {
        // Unclosed blocks render locked regardless of entitlement; the
        // registry warns about the missing closer.
        let body = std::mem::take(&mut self.body);
        ComponentOutput::html(self.locked_html(&body))
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use kb_renderer::HtmlRenderer;
    use kb_renderer::component::ComponentRegistry;
    use pretty_assertions::assert_eq;

    use super::*;

    fn ctx() -> ComponentContext<'static> {
        ComponentContext {
            page_path: None,
            line: 1,
        }
    }

    fn options(teaser_words: usize) -> PaywallOptions {
        PaywallOptions {
            teaser_words,
            ..Default::default()
        }
    }

    fn render(markdown: &str, access: AccessState, options: PaywallOptions) -> (String, Vec<String>) {
        let mut registry =
            ComponentRegistry::new().with_container(PaywallComponent::new(options, access));
        let result = HtmlRenderer::new().render_with_components(markdown, &mut registry);
        (result.html, result.warnings)
    }

    #[test]
    fn test_entitled_renders_full_content() {
        let (html, warnings) = render(
            "::: paywall\nAlpha Beta Gamma\n:::\n",
            AccessState::resolved(true),
            options(1),
        );

        assert!(html.contains("kb-paywall--unlocked"));
        assert!(html.contains("<p>Alpha Beta Gamma</p>"));
        assert!(!html.contains("kb-paywall-teaser"));
        assert!(!html.contains("kb-paywall-cta"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_locked_renders_teaser_and_cta_only() {
        let (html, _) = render(
            "::: paywall\nAlpha Beta Gamma\n:::\n",
            AccessState::resolved(false),
            options(1),
        );

        assert!(html.contains(r#"<div class="kb-paywall kb-paywall--locked">"#));
        assert!(html.contains(r#"<p class="kb-paywall-teaser">Alpha…</p>"#));
        assert!(html.contains(r#"<a href="/pricing">Unlock full access</a>"#));
        assert!(!html.contains("Beta"));
        assert!(!html.contains("Gamma"));
    }

    #[test]
    fn test_pending_gates_like_denied() {
        let (html, _) = render(
            "::: paywall\nAlpha Beta Gamma\n:::\n",
            AccessState::Pending,
            options(1),
        );

        assert!(html.contains("kb-paywall--locked"));
        assert!(!html.contains("Beta"));
    }

    #[test]
    fn test_teaser_token_scenario() {
        // AccessState not entitled, content "A B C", boundary one word.
        let (html, _) = render(
            "::: paywall\nA B C\n:::\n",
            AccessState::resolved(false),
            options(1),
        );

        assert!(html.contains(">A…</p>"));
        assert!(html.contains("kb-paywall-cta"));
        assert!(!html.contains("B C"));
    }

    #[test]
    fn test_fresh_render_reflects_new_state() {
        let markdown = "::: paywall\nAlpha Beta Gamma\n:::\n";

        let (locked, _) = render(markdown, AccessState::resolved(false), options(1));
        assert!(locked.contains("kb-paywall-teaser"));

        let (unlocked, _) = render(markdown, AccessState::resolved(true), options(1));
        assert!(unlocked.contains("<p>Alpha Beta Gamma</p>"));
        assert!(!unlocked.contains("kb-paywall-teaser"));
        assert!(!unlocked.contains("…"));
    }

    #[test]
    fn test_no_ellipsis_when_nothing_dropped() {
        let (html, _) = render(
            "::: paywall\nAlpha Beta\n:::\n",
            AccessState::resolved(false),
            options(5),
        );

        assert!(html.contains(">Alpha Beta</p>"));
        assert!(!html.contains("…"));
    }

    #[test]
    fn test_teaser_spans_multiple_lines() {
        let (html, _) = render(
            "::: paywall\nAlpha Beta\n\nGamma Delta\n:::\n",
            AccessState::resolved(false),
            options(3),
        );

        assert!(html.contains(">Alpha Beta Gamma…</p>"));
        assert!(!html.contains("Delta"));
    }

    #[test]
    fn test_empty_body_renders_cta_only() {
        let (html, _) = render(
            "::: paywall\n:::\n",
            AccessState::resolved(false),
            options(30),
        );

        assert!(!html.contains("kb-paywall-teaser"));
        assert!(html.contains("kb-paywall-cta"));
    }

    #[test]
    fn test_zero_teaser_words_renders_cta_only() {
        let (html, _) = render(
            "::: paywall\nAlpha Beta\n:::\n",
            AccessState::resolved(false),
            options(0),
        );

        assert!(!html.contains("kb-paywall-teaser"));
        assert!(!html.contains("Alpha"));
        assert!(html.contains("kb-paywall-cta"));
    }

    #[test]
    fn test_teaser_attribute_overrides_options() {
        let (html, _) = render(
            "::: paywall{teaser=\"2\"}\nAlpha Beta Gamma Delta\n:::\n",
            AccessState::resolved(false),
            options(30),
        );

        assert!(html.contains(">Alpha Beta…</p>"));
        assert!(!html.contains("Gamma"));
    }

    #[test]
    fn test_invalid_teaser_attribute_warns_and_uses_default() {
        let (html, warnings) = render(
            "::: paywall{teaser=\"lots\"}\nAlpha Beta\n:::\n",
            AccessState::resolved(false),
            options(30),
        );

        assert!(html.contains(">Alpha Beta</p>"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("invalid teaser value"));
    }

    #[test]
    fn test_teaser_escapes_markup() {
        let (html, _) = render(
            "::: paywall\n<script>alert(1)</script> Beta\n:::\n",
            AccessState::resolved(false),
            options(1),
        );

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_unclosed_block_renders_locked_even_when_entitled() {
        let (html, warnings) = render(
            "::: paywall\nAlpha Beta Gamma\n",
            AccessState::resolved(true),
            options(1),
        );

        assert!(html.contains("kb-paywall--locked"));
        assert!(!html.contains("Beta"));
        assert!(warnings.iter().any(|w| w.contains("unclosed container")));
    }

    #[test]
    fn test_nested_component_syntax_stays_gated() {
        let (html, _) = render(
            "::: paywall\nAlpha ::badge[secret] Gamma\n:::\n",
            AccessState::resolved(false),
            options(1),
        );

        assert!(!html.contains("secret"));
        assert!(!html.contains("badge"));
    }

    #[test]
    fn test_two_blocks_render_independently() {
        let (html, _) = render(
            "::: paywall{teaser=\"1\"}\nAlpha Beta\n:::\n\n::: paywall\nGamma Delta\n:::\n",
            AccessState::resolved(false),
            options(5),
        );

        // First block keeps its override, second falls back to options.
        assert!(html.contains(">Alpha…</p>"));
        assert!(html.contains(">Gamma Delta</p>"));
    }

    #[test]
    fn test_surrounding_content_untouched() {
        let (html, _) = render(
            "Before.\n\n::: paywall\nAlpha\n:::\n\nAfter.\n",
            AccessState::resolved(false),
            options(5),
        );

        assert!(html.contains("<p>Before.</p>"));
        assert!(html.contains("<p>After.</p>"));
    }

    #[test]
    fn test_cta_uses_configured_text_and_link() {
        let opts = PaywallOptions {
            teaser_words: 1,
            cta_text: "Join the beta".to_owned(),
            cta_link: "/signup?plan=pro&ref=kb".to_owned(),
        };
        let (html, _) = render("::: paywall\nAlpha\n:::\n", AccessState::resolved(false), opts);

        assert!(html.contains(r#"<a href="/signup?plan=pro&amp;ref=kb">Join the beta</a>"#));
    }

    #[test]
    fn test_locked_html_direct() {
        let paywall = PaywallComponent::new(options(2), AccessState::resolved(false));

        let html = paywall.locked_html("one two three");

        assert_eq!(
            html,
            "<div class=\"kb-paywall kb-paywall--locked\">\
             <p class=\"kb-paywall-teaser\">one two…</p>\
             <div class=\"kb-paywall-cta\"><a href=\"/pricing\">Unlock full access</a></div></div>"
        );
    }

    #[test]
    fn test_trait_level_lifecycle() {
        let mut paywall = PaywallComponent::new(options(30), AccessState::resolved(true));

        let started = paywall.start(ComponentArgs::default(), &ctx());
        assert_eq!(started, ComponentOutput::html(String::new()));
        assert!(paywall.captures_body());

        paywall.body_line("Members only.");
        let output = paywall.end(&ctx());

        match output {
            ComponentOutput::Markdown(md) => {
                assert!(md.contains("kb-paywall--unlocked"));
                assert!(md.contains("Members only."));
            }
            other => panic!("expected markdown output, got {other:?}"),
        }
    }
}
