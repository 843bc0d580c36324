//! Pricing section component.
//!
//! `::pricing` expands into a card per configured tier. The component is
//! purely presentational: with no tiers configured it renders an empty
//! state rather than failing the page.

use kb_renderer::component::{BlockComponent, ComponentArgs, ComponentContext, ComponentOutput};
use kb_renderer::escape_html;

/// One pricing tier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tier {
    /// Tier name, e.g. "Pro".
    pub name: String,
    /// Display price, e.g. "$29". Free-form so "Free" and "Contact us" work.
    pub price: String,
    /// Billing period suffix, e.g. "/month".
    pub period: Option<String>,
    /// Feature bullet points.
    pub features: Vec<String>,
    /// Call-to-action label. The CTA renders only when both text and link
    /// are present.
    pub cta_text: Option<String>,
    /// Call-to-action link target.
    pub cta_link: Option<String>,
    /// Visually emphasize this tier.
    pub highlighted: bool,
}

/// The `::pricing` block component.
pub struct PricingSection {
    tiers: Vec<Tier>,
}

impl PricingSection {
    #[must_use]
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self { tiers }
    }

    fn render_tier(html: &mut String, tier: &Tier) {
        if tier.highlighted {
            html.push_str(r#"<div class="kb-tier kb-tier--highlighted">"#);
        } else {
            html.push_str(r#"<div class="kb-tier">"#);
        }

        html.push_str(r#"<h3 class="kb-tier-name">"#);
        html.push_str(&escape_html(&tier.name));
        html.push_str("</h3>");

        html.push_str(r#"<p class="kb-tier-price">"#);
        html.push_str(&escape_html(&tier.price));
        if let Some(period) = &tier.period {
            html.push_str(r#"<span class="kb-tier-period">"#);
            html.push_str(&escape_html(period));
            html.push_str("</span>");
        }
        html.push_str("</p>");

        if !tier.features.is_empty() {
            html.push_str(r#"<ul class="kb-tier-features">"#);
            for feature in &tier.features {
                html.push_str("<li>");
                html.push_str(&escape_html(feature));
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        }

        if let (Some(text), Some(link)) = (&tier.cta_text, &tier.cta_link) {
            html.push_str(r#"<a class="kb-tier-cta" href=""#);
            html.push_str(&escape_html(link));
            html.push_str(r#"">"#);
            html.push_str(&escape_html(text));
            html.push_str("</a>");
        }

        html.push_str("</div>");
    }
}

impl BlockComponent for PricingSection {
    fn name(&self) -> &'static str {
        "pricing"
    }

    fn render(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
        let mut html = String::with_capacity(256 * self.tiers.len().max(1));

        html.push_str("<div");
        if let Some(id) = &args.id {
            html.push_str(&format!(r#" id="{}""#, escape_html(id)));
        }
        html.push_str(r#" class="kb-pricing"#);
        if self.tiers.is_empty() {
            html.push_str(" kb-pricing--empty");
        }
        for class in &args.classes {
            html.push(' ');
            html.push_str(&escape_html(class));
        }
        html.push_str(r#"">"#);

        for tier in &self.tiers {
            Self::render_tier(&mut html, tier);
        }

        html.push_str("</div>");
        ComponentOutput::html(html)
    }
}
