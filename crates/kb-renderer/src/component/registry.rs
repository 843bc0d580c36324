//! Component registry for markdown preprocessing.
//!
//! Dispatches component syntax to registered handlers (before pulldown-cmark)
//! and applies handler replacements to the rendered HTML afterwards.

use std::path::PathBuf;

use super::parser::{ParsedComponent, parse_container_line, parse_line};
use super::{
    BlockComponent, ComponentContext, ComponentOutput, ContainerComponent, FenceTracker,
    InlineComponent, Replacements,
};

/// An in-progress body capture for a container component.
struct Capture {
    /// Index into the container handler list.
    handler: usize,
    /// Container name, for the unclosed warning.
    name: String,
    /// Nested container syntax seen inside the body.
    nested: usize,
}

/// Registry of component handlers.
///
/// Handlers are registered explicitly by name; there is no global
/// registration. A registry is built per render, processes one document,
/// and is then discarded.
///
/// When a component returns [`ComponentOutput::Markdown`], the returned
/// content is recursively processed (up to the configured nesting depth).
///
/// # Example
///
/// ```
/// use kb_renderer::component::{
///     ComponentArgs, ComponentContext, ComponentOutput, ComponentRegistry, InlineComponent,
/// };
///
/// struct Badge;
///
/// impl InlineComponent for Badge {
///     fn name(&self) -> &str { "badge" }
///     fn render(&mut self, args: ComponentArgs, _ctx: &ComponentContext) -> ComponentOutput {
///         ComponentOutput::html(format!(r#"<span class="kb-badge">{}</span>"#, args.content))
///     }
/// }
///
/// let mut registry = ComponentRegistry::new().with_inline(Badge);
///
/// let output = registry.process("Try the :badge[beta] build.");
/// assert!(output.contains(r#"<span class="kb-badge">beta</span>"#));
/// ```
pub struct ComponentRegistry {
    inline: Vec<Box<dyn InlineComponent>>,
    blocks: Vec<Box<dyn BlockComponent>>,
    containers: Vec<Box<dyn ContainerComponent>>,
    fence: FenceTracker,
    /// Stack of active container names for dispatching `end()` calls.
    active: Vec<String>,
    /// Body capture in progress, if any.
    capture: Option<Capture>,
    warnings: Vec<String>,
    page_path: Option<PathBuf>,
    max_depth: usize,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Create a new registry with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inline: Vec::new(),
            blocks: Vec::new(),
            containers: Vec::new(),
            fence: FenceTracker::new(),
            active: Vec::new(),
            capture: None,
            warnings: Vec::new(),
            page_path: None,
            max_depth: 10,
        }
    }

    /// Register an inline component handler.
    #[must_use]
    pub fn with_inline<C: InlineComponent + 'static>(mut self, handler: C) -> Self {
        self.inline.push(Box::new(handler));
        self
    }

    /// Register a block component handler.
    #[must_use]
    pub fn with_block<C: BlockComponent + 'static>(mut self, handler: C) -> Self {
        self.blocks.push(Box::new(handler));
        self
    }

    /// Register a container component handler.
    #[must_use]
    pub fn with_container<C: ContainerComponent + 'static>(mut self, handler: C) -> Self {
        self.containers.push(Box::new(handler));
        self
    }

    /// Set the page path passed to handlers via [`ComponentContext`].
    #[must_use]
    pub fn with_page_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.page_path = Some(path.into());
        self
    }

    /// Set the maximum nesting depth for recursive processing.
    ///
    /// Default: 10
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Preprocess markdown, expanding component syntax.
    ///
    /// Component invocations are replaced by handler output; everything
    /// else passes through unchanged. Component syntax inside fenced code
    /// blocks is left alone.
    #[must_use]
    pub fn process(&mut self, input: &str) -> String {
        self.process_with_depth(input, 0)
    }

    fn process_with_depth(&mut self, input: &str, depth: usize) -> String {
        if depth > self.max_depth {
            self.warnings.push(format!(
                "maximum component nesting depth ({}) exceeded",
                self.max_depth
            ));
            return input.to_owned();
        }

        let mut output = String::with_capacity(input.len());
        let lines: Vec<&str> = input.lines().collect();
        let line_count = lines.len();

        for (idx, line) in lines.iter().enumerate() {
            let line_num = idx + 1;
            let Some(processed) = self.process_line(line, line_num, depth) else {
                // Line was swallowed by a capturing container
                continue;
            };
            output.push_str(&processed);

            // Preserve line endings
            if idx < line_count - 1 || input.ends_with('\n') {
                output.push('\n');
            }
        }

        // A capture never outlives the input that opened it
        if let Some(tail) = self.close_dangling_capture(line_count, depth) {
            output.push_str(&tail);
        }

        // Unclosed-container warnings only once the whole document is done
        if depth == 0 {
            self.finalize();
        }

        output
    }

    /// Process one line. Returns `None` when the line is consumed by a
    /// body-capturing container.
    fn process_line(&mut self, line: &str, line_num: usize, depth: usize) -> Option<String> {
        // Update fence state
        let fence_marker = self.fence.update(line);

        // An active capture swallows everything until its closing :::
        if self.capture.is_some() {
            return self.capture_line(line, line_num, depth, fence_marker);
        }

        // Skip component processing inside code fences
        if self.fence.in_fence() {
            return Some(line.to_owned());
        }

        // Try container syntax first (takes whole line)
        if let Some(component) = parse_container_line(line) {
            return self.dispatch_container(component, line_num, depth);
        }

        // Try inline/block components (can be within a line)
        Some(self.process_inline(line, line_num, depth))
    }

    fn capture_line(
        &mut self,
        line: &str,
        line_num: usize,
        depth: usize,
        fence_marker: bool,
    ) -> Option<String> {
        // ::: inside fenced code is body text, not a boundary
        if fence_marker || self.fence.in_fence() {
            self.capture_body_line(line);
            return None;
        }

        match parse_container_line(line) {
            Some(ParsedComponent::ContainerStart { .. }) => {
                if let Some(capture) = self.capture.as_mut() {
                    capture.nested += 1;
                }
                self.capture_body_line(line);
                None
            }
            Some(ParsedComponent::ContainerEnd { .. }) => {
                let innermost = self.capture.as_ref().is_some_and(|c| c.nested == 0);
                if innermost {
                    // The closing ::: belongs to the capture, not the body
                    Some(self.finish_capture(line_num, depth))
                } else {
                    if let Some(capture) = self.capture.as_mut() {
                        capture.nested -= 1;
                    }
                    self.capture_body_line(line);
                    None
                }
            }
            _ => {
                self.capture_body_line(line);
                None
            }
        }
    }

    fn capture_body_line(&mut self, line: &str) {
        if let Some(handler) = self.capture.as_ref().map(|c| c.handler) {
            self.containers[handler].body_line(line);
        }
    }

    fn finish_capture(&mut self, line_num: usize, depth: usize) -> String {
        let Some(capture) = self.capture.take() else {
            return String::new();
        };

        let ctx = ComponentContext {
            page_path: self.page_path.as_deref(),
            line: line_num,
        };

        match self.containers[capture.handler].end(&ctx) {
            ComponentOutput::Html(html) => html,
            ComponentOutput::Markdown(md) => self.process_with_depth(&md, depth + 1),
            ComponentOutput::Skip => String::new(),
        }
    }

    fn close_dangling_capture(&mut self, line_count: usize, depth: usize) -> Option<String> {
        let capture = self.capture.take()?;

        self.warnings.push(format!(
            "unclosed container component :::{} (missing closing :::)",
            capture.name
        ));

        let ctx = ComponentContext {
            page_path: self.page_path.as_deref(),
            line: line_count,
        };

        match self.containers[capture.handler].end_unclosed(&ctx) {
            ComponentOutput::Html(html) => Some(html),
            ComponentOutput::Markdown(md) => Some(self.process_with_depth(&md, depth + 1)),
            ComponentOutput::Skip => None,
        }
    }

    fn dispatch_container(
        &mut self,
        component: ParsedComponent,
        line_num: usize,
        depth: usize,
    ) -> Option<String> {
        match component {
            ParsedComponent::ContainerStart { name, args, .. } => {
                // Find handler index for this component
                let handler_idx = self.containers.iter().position(|h| h.name() == name);

                let Some(idx) = handler_idx else {
                    // No handler, pass through unchanged with original syntax
                    return Some(format!(":::{name}{}", args.to_syntax()));
                };

                let syntax = args.to_syntax();
                let ctx = ComponentContext {
                    page_path: self.page_path.as_deref(),
                    line: line_num,
                };
                let output = self.containers[idx].start(args, &ctx);

                match output {
                    ComponentOutput::Skip => {
                        // Handler declined, pass through with original syntax
                        Some(format!(":::{name}{syntax}"))
                    }
                    _ if self.containers[idx].captures_body() => {
                        // Body lines are swallowed until the closing :::; the
                        // start output is discarded because end() emits the
                        // whole region
                        self.capture = Some(Capture {
                            handler: idx,
                            name,
                            nested: 0,
                        });
                        None
                    }
                    ComponentOutput::Html(html) => {
                        self.active.push(name);
                        Some(html)
                    }
                    ComponentOutput::Markdown(md) => {
                        self.active.push(name);
                        Some(self.process_with_depth(&md, depth + 1))
                    }
                }
            }
            ParsedComponent::ContainerEnd { colon_count } => {
                if let Some(name) = self.active.pop() {
                    // Find handler index and call end
                    let handler_idx = self.containers.iter().position(|h| h.name() == name);

                    let Some(idx) = handler_idx else {
                        return Some(String::new());
                    };

                    let ctx = ComponentContext {
                        page_path: self.page_path.as_deref(),
                        line: line_num,
                    };
                    match self.containers[idx].end(&ctx) {
                        ComponentOutput::Html(html) => Some(html),
                        ComponentOutput::Markdown(md) => {
                            Some(self.process_with_depth(&md, depth + 1))
                        }
                        ComponentOutput::Skip => Some(String::new()),
                    }
                } else {
                    // Stray closing
                    self.warnings.push(format!(
                        "line {line_num}: stray ::: with no opening component"
                    ));
                    Some(":".repeat(colon_count))
                }
            }
            _ => unreachable!("dispatch_container only handles container syntax"),
        }
    }

    fn process_inline(&mut self, line: &str, line_num: usize, depth: usize) -> String {
        let mut result = String::with_capacity(line.len());
        let mut remaining = line;

        while !remaining.is_empty() {
            if let Some((component, start, end)) = parse_line(remaining) {
                // Add content before the component
                result.push_str(&remaining[..start]);

                let output = self.dispatch_named(component, line_num);

                match output {
                    ComponentOutput::Html(html) => result.push_str(&html),
                    ComponentOutput::Markdown(md) => {
                        let processed = self.process_with_depth(&md, depth + 1);
                        result.push_str(&processed);
                    }
                    ComponentOutput::Skip => {
                        // Pass through unchanged
                        result.push_str(&remaining[start..end]);
                    }
                }

                remaining = &remaining[end..];
            } else {
                // No more components, add remaining content
                result.push_str(remaining);
                break;
            }
        }

        result
    }

    fn dispatch_named(&mut self, component: ParsedComponent, line_num: usize) -> ComponentOutput {
        match component {
            ParsedComponent::Inline { name, args } => {
                let handler_idx = self.inline.iter().position(|h| h.name() == name);

                if let Some(idx) = handler_idx {
                    let ctx = ComponentContext {
                        page_path: self.page_path.as_deref(),
                        line: line_num,
                    };
                    self.inline[idx].render(args, &ctx)
                } else {
                    ComponentOutput::Skip
                }
            }
            ParsedComponent::Block { name, args } => {
                let handler_idx = self.blocks.iter().position(|h| h.name() == name);

                if let Some(idx) = handler_idx {
                    let ctx = ComponentContext {
                        page_path: self.page_path.as_deref(),
                        line: line_num,
                    };
                    self.blocks[idx].render(args, &ctx)
                } else {
                    ComponentOutput::Skip
                }
            }
            // Mid-line ::: is not a container boundary
            ParsedComponent::ContainerStart { .. } | ParsedComponent::ContainerEnd { .. } => {
                ComponentOutput::Skip
            }
        }
    }

    fn finalize(&mut self) {
        for name in self.active.drain(..) {
            self.warnings.push(format!(
                "unclosed container component :::{name} (missing closing :::)"
            ));
        }
    }

    /// Post-process rendered HTML.
    ///
    /// Collects all replacements from handlers and applies them in a single pass.
    pub fn post_process(&mut self, html: &mut String) {
        let capacity = self.blocks.len() + self.containers.len();
        let mut replacements = Replacements::with_capacity(capacity);

        // Collect replacements from all handlers
        for handler in &mut self.blocks {
            handler.post_process(&mut replacements);
        }
        for handler in &mut self.containers {
            handler.post_process(&mut replacements);
        }

        // Apply all replacements in single pass
        replacements.apply(html);
    }

    /// Get all warnings generated during processing.
    ///
    /// Includes warnings from the registry itself and from all handlers.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut all_warnings = self.warnings.clone();

        for handler in &self.blocks {
            all_warnings.extend(handler.warnings().iter().cloned());
        }
        for handler in &self.containers {
            all_warnings.extend(handler.warnings().iter().cloned());
        }

        all_warnings
    }
}
