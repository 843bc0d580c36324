//! Component argument parsing.
//!
//! Parses the `[content]{#id .class key="value"}` syntax that follows a
//! component name.

use std::collections::HashMap;

/// Parsed arguments from component syntax.
///
/// Represents the content and attributes extracted from a component
/// invocation: `:name[content]{#id .class key="value"}`
///
/// # Example
///
/// ```
/// use kb_renderer::component::ComponentArgs;
///
/// let args = ComponentArgs::parse("Pro plans", r#"#plans .wide teaser="12""#);
/// assert_eq!(args.content, "Pro plans");
/// assert_eq!(args.id, Some("plans".to_string()));
/// assert_eq!(args.classes, vec!["wide"]);
/// assert_eq!(args.get("teaser"), Some("12"));
/// ```
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ComponentArgs {
    /// Content from brackets: `[content]` (empty string if not provided).
    pub content: String,
    /// ID from attributes: `{#id}`.
    pub id: Option<String>,
    /// Classes from attributes: `{.class1 .class2}`.
    pub classes: Vec<String>,
    /// Key-value attributes: `{key="value"}`.
    pub attrs: HashMap<String, String>,
}

impl ComponentArgs {
    /// Parse content and attributes string into structured arguments.
    ///
    /// # Arguments
    ///
    /// * `content` - The content from brackets `[content]`
    /// * `attrs_str` - The attributes string from braces `{...}` (without braces)
    #[must_use]
    pub fn parse(content: &str, attrs_str: &str) -> Self {
        let mut args = Self {
            content: content.to_owned(),
            ..Default::default()
        };

        if attrs_str.is_empty() {
            return args;
        }

        // Parse attributes: #id, .class, key="value", key='value', or key=value
        let mut remaining = attrs_str.trim();

        while !remaining.is_empty() {
            remaining = remaining.trim_start();

            if remaining.starts_with('#') {
                // ID: #my-id
                let end = remaining[1..]
                    .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                    .map_or(remaining.len(), |i| i + 1);
                args.id = Some(remaining[1..end].to_string());
                remaining = &remaining[end..];
            } else if remaining.starts_with('.') {
                // Class: .my-class
                let end = remaining[1..]
                    .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                    .map_or(remaining.len(), |i| i + 1);
                args.classes.push(remaining[1..end].to_string());
                remaining = &remaining[end..];
            } else if let Some((key, value, rest)) = parse_key_value(remaining) {
                // Key-value: key="value" or key='value' or key=value
                args.attrs.insert(key.to_owned(), value.to_owned());
                remaining = rest;
            } else {
                // Skip unrecognized character
                remaining = &remaining[1..];
            }
        }

        args
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Reconstruct the original syntax string `[content]{attrs}`.
    ///
    /// Used for pass-through when a component name is not registered.
    ///
    /// # Example
    ///
    /// ```
    /// use kb_renderer::component::ComponentArgs;
    ///
    /// let args = ComponentArgs::parse("Pro plans", r#"#plans cols="3""#);
    /// let syntax = args.to_syntax();
    /// assert!(syntax.starts_with("[Pro plans]"));
    /// assert!(syntax.contains("#plans"));
    /// ```
    #[must_use]
    pub fn to_syntax(&self) -> String {
        let mut result = String::new();

        // Add content in brackets (always include brackets if content is non-empty)
        if !self.content.is_empty() {
            result.push('[');
            result.push_str(&self.content);
            result.push(']');
        }

        // Build attributes string
        let mut attrs_parts = Vec::new();

        if let Some(id) = &self.id {
            attrs_parts.push(format!("#{id}"));
        }

        for class in &self.classes {
            attrs_parts.push(format!(".{class}"));
        }

        // Sort keys for deterministic output in tests
        let mut keys: Vec<_> = self.attrs.keys().collect();
        keys.sort();
        for key in keys {
            let value = &self.attrs[key];
            // Use double quotes and escape internal quotes if needed
            let escaped = value.replace('"', r#"\""#);
            attrs_parts.push(format!(r#"{key}="{escaped}""#));
        }

        if !attrs_parts.is_empty() {
            result.push('{');
            result.push_str(&attrs_parts.join(" "));
            result.push('}');
        }

        result
    }
}

/// Parse a key-value pair from the attributes string.
///
/// Supports: `key="value"`, `key='value'`, `key=value`
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq_pos = s.find('=')?;
    let key = s[..eq_pos].trim();

    if key.is_empty() || key.starts_with('#') || key.starts_with('.') {
        return None;
    }

    let after_eq = &s[eq_pos + 1..];

    if let Some(stripped) = after_eq.strip_prefix('"') {
        // Quoted with double quotes
        let end_quote = stripped.find('"')?;
        let value = &stripped[..end_quote];
        let rest = &stripped[end_quote + 1..];
        Some((key, value, rest))
    } else if let Some(stripped) = after_eq.strip_prefix('\'') {
        // Quoted with single quotes
        let end_quote = stripped.find('\'')?;
        let value = &stripped[..end_quote];
        let rest = &stripped[end_quote + 1..];
        Some((key, value, rest))
    } else {
        // Unquoted value (until whitespace)
        let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
        let value = &after_eq[..end];
        let rest = &after_eq[end..];
        Some((key, value, rest))
    }
}
