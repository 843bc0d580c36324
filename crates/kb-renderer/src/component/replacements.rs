//! Single-pass string replacement for post-processing.
//!
//! Collects replacements during post-processing and applies them efficiently.

/// Collects string replacements for single-pass application.
///
/// Instead of each component calling `html.replace()` (O(N) allocation per
/// call), all components register their replacements, then
/// [`apply()`](Self::apply) performs them in a single pass over the HTML
/// string.
///
/// # Example
///
/// ```
/// use kb_renderer::component::Replacements;
///
/// let mut html = "<kb-pricing>content</kb-pricing>".to_string();
/// let mut replacements = Replacements::new();
/// replacements.add("<kb-pricing>", "<section class=\"kb-pricing\">");
/// replacements.add("</kb-pricing>", "</section>");
/// replacements.apply(&mut html);
///
/// assert_eq!(html, "<section class=\"kb-pricing\">content</section>");
/// ```
#[derive(Debug, Default)]
pub struct Replacements {
    items: Vec<(String, String)>,
}

impl Replacements {
    /// Create a new empty replacements collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new replacements collector with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Register a replacement: all occurrences of `from` will be replaced with `to`.
    ///
    /// Replacements are applied in the order they are added.
    pub fn add(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.items.push((from.into(), to.into()));
    }

    /// Apply all registered replacements.
    ///
    /// Note: This consumes the replacements to prevent accidental reuse.
    pub fn apply(self, html: &mut String) {
        if self.items.is_empty() {
            return;
        }

        // For a small number of replacements, sequential replace is efficient
        // enough and avoids pulling in aho-corasick.
        for (from, to) in self.items {
            if html.contains(&from) {
                *html = html.replace(&from, &to);
            }
        }
    }

    /// Check if there are any replacements registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of registered replacements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
