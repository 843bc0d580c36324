//! YAML frontmatter parsing.
//!
//! Pages may open with a frontmatter block delimited by `---` lines:
//!
//! ```markdown
//! ---
//! title: Billing FAQ
//! description: Common billing questions
//! ---
//!
//! # Billing FAQ
//! ```
//!
//! [`parse`] splits the block from the body and deserializes it into
//! [`PageMeta`]. Parsing never fails: pages without a block (or with an
//! unterminated one) are returned whole, and a malformed block is logged
//! and dropped rather than rendered as content.

use serde::Deserialize;

/// Page-level metadata from frontmatter.
///
/// All fields are optional; `None` means the field was not set. Unknown
/// frontmatter keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PageMeta {
    /// Custom page title (overrides H1 extraction).
    #[serde(default)]
    pub title: Option<String>,

    /// Page description for navigation and galleries.
    #[serde(default)]
    pub description: Option<String>,

    /// Publication date (`YYYY-MM-DD`), overriding any date in the slug.
    #[serde(default)]
    pub date: Option<String>,
}

impl PageMeta {
    /// Check if no field was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.date.is_none()
    }
}

/// Split content into frontmatter metadata and markdown body.
///
/// The returned body borrows from `content` and excludes the block and
/// its delimiters. Without a block, the metadata is default and the body
/// is the full content.
#[must_use]
pub fn parse(content: &str) -> (PageMeta, &str) {
    let Some((yaml, body)) = split_block(content) else {
        return (PageMeta::default(), content);
    };

    if yaml.trim().is_empty() {
        return (PageMeta::default(), body);
    }

    match serde_yaml::from_str::<PageMeta>(yaml) {
        Ok(meta) => (meta, body),
        Err(error) => {
            tracing::warn!(error = %error, "malformed frontmatter block, ignoring");
            (PageMeta::default(), body)
        }
    }
}

/// Extract the raw YAML block and remaining body.
///
/// The block must start on the first line. A `---` opener without a
/// matching closer is not treated as frontmatter.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let first_end = content.find('\n')?;
    if content[..first_end].trim_end() != "---" {
        return None;
    }

    let yaml_start = first_end + 1;
    let mut pos = yaml_start;
    loop {
        let line_end = content[pos..]
            .find('\n')
            .map_or(content.len(), |offset| pos + offset);
        if content[pos..line_end].trim_end() == "---" {
            let body = if line_end < content.len() {
                &content[line_end + 1..]
            } else {
                ""
            };
            return Some((&content[yaml_start..pos], body));
        }
        if line_end == content.len() {
            return None;
        }
        pos = line_end + 1;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_without_frontmatter() {
        let content = "# Guide\n\nPlain content.";

        let (meta, body) = parse(content);

        assert_eq!(meta, PageMeta::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_full_frontmatter() {
        let content = "---\ntitle: Billing FAQ\ndescription: Common questions\ndate: 2026-02-14\n---\n\n# Heading\n";

        let (meta, body) = parse(content);

        assert_eq!(meta.title.as_deref(), Some("Billing FAQ"));
        assert_eq!(meta.description.as_deref(), Some("Common questions"));
        assert_eq!(meta.date.as_deref(), Some("2026-02-14"));
        assert_eq!(body, "\n# Heading\n");
    }

    #[test]
    fn test_parse_partial_frontmatter() {
        let content = "---\ntitle: Only Title\n---\nBody.";

        let (meta, body) = parse(content);

        assert_eq!(meta.title.as_deref(), Some("Only Title"));
        assert_eq!(meta.description, None);
        assert_eq!(meta.date, None);
        assert_eq!(body, "Body.");
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let content = "---\ntitle: Guide\nlayout: wide\ntags:\n  - billing\n---\nBody.";

        let (meta, body) = parse(content);

        assert_eq!(meta.title.as_deref(), Some("Guide"));
        assert_eq!(body, "Body.");
    }

    #[test]
    fn test_parse_empty_block() {
        let content = "---\n---\nBody.";

        let (meta, body) = parse(content);

        assert_eq!(meta, PageMeta::default());
        assert_eq!(body, "Body.");
    }

    #[test]
    fn test_parse_unterminated_block_is_content() {
        let content = "---\ntitle: Broken\n\nNo closing delimiter.";

        let (meta, body) = parse(content);

        assert_eq!(meta, PageMeta::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_malformed_yaml_drops_block() {
        let content = "---\ntitle: [unclosed\n---\nBody.";

        let (meta, body) = parse(content);

        assert_eq!(meta, PageMeta::default());
        assert_eq!(body, "Body.");
    }

    #[test]
    fn test_parse_requires_block_on_first_line() {
        let content = "\n---\ntitle: Late\n---\nBody.";

        let (meta, body) = parse(content);

        assert_eq!(meta, PageMeta::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_keeps_later_rules_in_body() {
        let content = "---\ntitle: Guide\n---\nAbove.\n\n---\n\nBelow.";

        let (meta, body) = parse(content);

        assert_eq!(meta.title.as_deref(), Some("Guide"));
        assert_eq!(body, "Above.\n\n---\n\nBelow.");
    }

    #[test]
    fn test_parse_crlf_delimiters() {
        let content = "---\r\ntitle: Guide\r\n---\r\nBody.";

        let (meta, body) = parse(content);

        assert_eq!(meta.title.as_deref(), Some("Guide"));
        assert_eq!(body, "Body.");
    }

    #[test]
    fn test_parse_closing_delimiter_at_eof() {
        let content = "---\ntitle: Guide\n---";

        let (meta, body) = parse(content);

        assert_eq!(meta.title.as_deref(), Some("Guide"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_is_empty() {
        assert!(PageMeta::default().is_empty());
        assert!(!PageMeta {
            title: Some("Guide".to_owned()),
            ..Default::default()
        }
        .is_empty());
        assert!(!PageMeta {
            date: Some("2026-02-14".to_owned()),
            ..Default::default()
        }
        .is_empty());
    }
}
