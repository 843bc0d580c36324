//! Pluggable theme components for `CommonMark`-style component syntax.
//!
//! This module provides a trait-based extensibility system for handling
//! component syntax in markdown (inline `:name`, block `::name`, and
//! container `:::name`).
//!
//! # Architecture
//!
//! Components are dispatched through an explicit [`ComponentRegistry`]:
//! handlers are registered by name on a per-render registry instance, so
//! two renders (e.g., with different entitlements) never share handler
//! state.
//!
//! Processing happens in two phases:
//!
//! 1. **Preprocessing** ([`ComponentRegistry::process`]): Converts component
//!    syntax to intermediate HTML (or markdown) that passes through
//!    pulldown-cmark unchanged.
//!
//! 2. **Post-processing** ([`ComponentRegistry::post_process`]): Transforms
//!    intermediate elements to final HTML using the [`Replacements`]
//!    collector for single-pass string replacement.
//!
//! # Component Kinds
//!
//! - **Inline** ([`InlineComponent`]): `:name[content]{attrs}` - inline elements
//! - **Block** ([`BlockComponent`]): `::name[content]{attrs}` - self-contained blocks
//! - **Container** ([`ContainerComponent`]): `:::name` ... `:::` - wrapping blocks
//!
//! Containers that return `true` from
//! [`captures_body`](ContainerComponent::captures_body) receive their raw
//! body lines through [`body_line`](ContainerComponent::body_line) instead
//! of having them expanded in place; nothing is emitted until the closing
//! `:::`, when [`end`](ContainerComponent::end) decides what the whole
//! region becomes. Content gating is built on this.
//!
//! # Example
//!
//! ```
//! use kb_renderer::component::{
//!     ComponentArgs, ComponentContext, ComponentOutput, ComponentRegistry, InlineComponent,
//! };
//!
//! struct Badge;
//!
//! impl InlineComponent for Badge {
//!     fn name(&self) -> &str { "badge" }
//!
//!     fn render(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
//!         ComponentOutput::html(format!(r#"<span class="kb-badge">{}</span>"#, args.content))
//!     }
//! }
//!
//! let mut registry = ComponentRegistry::new().with_inline(Badge);
//!
//! let output = registry.process("Try the :badge[beta] build.");
//! assert!(output.contains(r#"<span class="kb-badge">beta</span>"#));
//! ```

use std::path::Path;

mod args;
mod fence;
mod parser;
mod registry;
mod replacements;

pub use args::ComponentArgs;
pub use registry::ComponentRegistry;
pub use replacements::Replacements;

pub(crate) use fence::FenceTracker;

/// Output from component processing.
///
/// Components can produce three types of output:
///
/// - [`Html`](Self::Html): HTML that passes through pulldown-cmark unchanged
/// - [`Markdown`](Self::Markdown): Markdown that is recursively processed
/// - [`Skip`](Self::Skip): Decline to handle (pass through unchanged)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentOutput {
    /// HTML that passes through pulldown-cmark unchanged.
    Html(String),
    /// Markdown that is fed back through component expansion.
    ///
    /// Used when a component emits content that may itself contain
    /// component syntax or markdown formatting.
    Markdown(String),
    /// Don't handle this component (pass through unchanged).
    Skip,
}

impl ComponentOutput {
    /// Create an HTML output.
    #[must_use]
    pub fn html(s: impl Into<String>) -> Self {
        Self::Html(s.into())
    }

    /// Create a markdown output for recursive processing.
    #[must_use]
    pub fn markdown(s: impl Into<String>) -> Self {
        Self::Markdown(s.into())
    }
}

/// Context passed to component handlers.
#[derive(Clone, Copy, Debug)]
pub struct ComponentContext<'a> {
    /// Path of the page being rendered (if known).
    pub page_path: Option<&'a Path>,
    /// 1-based line number of the component invocation.
    pub line: usize,
}

/// Handler for inline components: `:name[content]{attrs}`
///
/// Inline components produce inline elements inside a line of text.
///
/// # Thread Safety
///
/// Handlers implement `Send` only (not `Sync`) since each render gets its
/// own registry instance.
pub trait InlineComponent: Send {
    /// Component name (e.g., "badge").
    ///
    /// This is matched against the component syntax: `:name`
    fn name(&self) -> &str;

    /// Render the component invocation.
    fn render(&mut self, args: ComponentArgs, ctx: &ComponentContext) -> ComponentOutput;
}

/// Handler for block components: `::name[content]{attrs}`
///
/// Block components are self-contained: they produce a whole block of
/// output from a single line of syntax.
pub trait BlockComponent: Send {
    /// Component name (e.g., "pricing", "news-gallery").
    fn name(&self) -> &str;

    /// Render the component invocation.
    fn render(&mut self, args: ComponentArgs, ctx: &ComponentContext) -> ComponentOutput;

    /// Register string replacements to apply after rendering.
    ///
    /// All replacements are collected and applied in a single pass.
    /// Override this method if your component emits intermediate elements
    /// that need transforming once the surrounding HTML exists.
    fn post_process(&mut self, _replacements: &mut Replacements) {}

    /// Get warnings generated during processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

/// Handler for container components: `:::name` ... `:::`
///
/// Container components wrap arbitrary content and have start/end phases.
/// Handlers manage their own nesting state internally (e.g., via a stack).
///
/// By default the body between `:::name` and `:::` stays in the document
/// and is processed in place. A container that returns `true` from
/// [`captures_body`](Self::captures_body) instead swallows the body: each
/// raw line is fed to [`body_line`](Self::body_line), and the output of
/// [`end`](Self::end) replaces the whole region.
///
/// # Example
///
/// ```
/// use kb_renderer::component::{
///     ComponentArgs, ComponentContext, ComponentOutput, ContainerComponent,
/// };
///
/// struct Callout;
///
/// impl ContainerComponent for Callout {
///     fn name(&self) -> &str { "callout" }
///
///     fn start(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
///         let title = if args.content.is_empty() { "Heads up" } else { &args.content };
///         ComponentOutput::html(format!(
///             r#"<aside class="kb-callout"><p class="kb-callout-title">{title}</p>"#
///         ))
///     }
///
///     fn end(&mut self, _ctx: &ComponentContext) -> ComponentOutput {
///         ComponentOutput::html("</aside>")
///     }
/// }
/// ```
pub trait ContainerComponent: Send {
    /// Component name (e.g., "paywall", "callout").
    ///
    /// This is matched against the component syntax: `:::name`
    fn name(&self) -> &str;

    /// Handle opening `:::name[content]{attrs}`.
    ///
    /// Returns the opening output:
    /// - [`ComponentOutput::Html`] to emit opening HTML tags
    /// - [`ComponentOutput::Skip`] to pass through (don't handle)
    ///
    /// For body-capturing containers the return value only signals
    /// accept/decline; nothing is emitted until [`end`](Self::end).
    fn start(&mut self, args: ComponentArgs, ctx: &ComponentContext) -> ComponentOutput;

    /// Whether this container consumes its body as raw lines.
    fn captures_body(&self) -> bool {
        false
    }

    /// Receive one raw body line.
    ///
    /// Only called when [`captures_body`](Self::captures_body) returns
    /// `true`. Lines arrive without trailing newlines.
    fn body_line(&mut self, _line: &str) {}

    /// Handle closing `:::`.
    ///
    /// Returns the closing output. [`ComponentOutput::Skip`] emits nothing.
    ///
    /// **Invariant**: the registry only calls `end()` when there's a
    /// matching `start()`. If this method panics, it indicates a bug in
    /// either the registry or the handler's state management.
    fn end(&mut self, ctx: &ComponentContext) -> ComponentOutput;

    /// Handle a container left open at end of input.
    ///
    /// Called instead of [`end`](Self::end) when the document finishes
    /// with this container still open. The registry records an "unclosed"
    /// warning either way; override this to still emit output for the
    /// captured body. The default emits nothing.
    fn end_unclosed(&mut self, _ctx: &ComponentContext) -> ComponentOutput {
        ComponentOutput::Skip
    }

    /// Register string replacements to apply after rendering.
    ///
    /// All replacements are collected and applied in a single pass.
    fn post_process(&mut self, _replacements: &mut Replacements) {}

    /// Get warnings generated during processing.
    fn warnings(&self) -> &[String] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_html() {
        let output = ComponentOutput::html("<p>test</p>");
        assert_eq!(output, ComponentOutput::Html("<p>test</p>".to_owned()));
    }

    #[test]
    fn test_output_markdown() {
        let output = ComponentOutput::markdown("# Heading");
        assert_eq!(output, ComponentOutput::Markdown("# Heading".to_owned()));
    }

    #[test]
    fn test_output_html_from_string() {
        let s = String::from("<div>content</div>");
        let output = ComponentOutput::html(s);
        assert!(matches!(output, ComponentOutput::Html(_)));
    }

    struct PlainCallout;

    impl ContainerComponent for PlainCallout {
        fn name(&self) -> &'static str {
            "callout"
        }

        fn start(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
            ComponentOutput::html(format!(r#"<aside data-title="{}">"#, args.content))
        }

        fn end(&mut self, _ctx: &ComponentContext) -> ComponentOutput {
            ComponentOutput::html("</aside>")
        }
    }

    #[test]
    fn test_container_defaults() {
        let mut callout = PlainCallout;
        let ctx = ComponentContext {
            page_path: None,
            line: 1,
        };

        assert!(!callout.captures_body());
        assert_eq!(callout.end_unclosed(&ctx), ComponentOutput::Skip);
        assert!(callout.warnings().is_empty());

        let mut replacements = Replacements::new();
        callout.post_process(&mut replacements);
        assert!(replacements.is_empty());
    }

    #[test]
    fn test_container_start_end() {
        let mut callout = PlainCallout;
        let ctx = ComponentContext {
            page_path: None,
            line: 4,
        };

        let args = ComponentArgs::parse("Before you upgrade", "");
        let output = callout.start(args, &ctx);
        assert!(matches!(output, ComponentOutput::Html(s) if s.contains("Before you upgrade")));

        let output = callout.end(&ctx);
        assert_eq!(output, ComponentOutput::Html("</aside>".to_owned()));
    }
}
