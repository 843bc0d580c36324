//! Markdown link rewriting.
//!
//! Pages cross-reference each other with relative `.md` links; served pages
//! use clean absolute URLs. This module maps one onto the other.

/// Resolve a markdown link URL relative to a page's URL path.
///
/// Transforms relative `.md` links to absolute site paths:
/// - `./pricing.md` → `/guide/pricing`
/// - `../upgrade.md` → `/upgrade`
/// - `news/2026-01-05.md` → `/guide/news/2026-01-05`
/// - `tools/index.md` → `/guide/tools`
///
/// External links, fragment-only links, and non-markdown links are returned
/// unchanged.
#[allow(clippy::case_sensitive_file_extension_comparisons)]
pub(crate) fn resolve_link(url: &str, base_path: &str) -> String {
    // Skip external links, fragments, and non-local URLs
    if url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
        || url.starts_with('#')
    {
        return url.to_owned();
    }

    // Only process markdown links
    if !url.ends_with(".md") && !url.contains(".md#") {
        return url.to_owned();
    }

    // Split URL into path and fragment
    let (path_part, fragment) = if let Some(hash_pos) = url.find('#') {
        (&url[..hash_pos], Some(&url[hash_pos..]))
    } else {
        (url, None)
    };

    let resolved = if path_part.starts_with('/') {
        // Absolute path, already site-rooted
        path_part.trim_start_matches('/').to_owned()
    } else {
        resolve_relative_path(path_part, base_path)
    };

    // Strip .md extension and /index suffix for clean URLs
    let clean = resolved.strip_suffix(".md").unwrap_or(&resolved);
    let clean = clean.strip_suffix("/index").unwrap_or(clean);

    let with_prefix = format!("/{clean}");
    match fragment {
        Some(frag) => format!("{with_prefix}{frag}"),
        None => with_prefix,
    }
}

/// Resolve a relative path against a base path.
///
/// Handles `.` (current), `..` (parent), and plain relative paths.
fn resolve_relative_path(relative: &str, base: &str) -> String {
    // The base is treated as a directory
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();

    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                // Pops stop at the root, clamping traversal
                segments.pop();
            }
            _ => segments.push(component),
        }
    }

    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_link_relative() {
        assert_eq!(
            resolve_link("setup/index.md", "guide/members"),
            "/guide/members/setup"
        );
    }

    #[test]
    fn test_resolve_link_parent() {
        assert_eq!(resolve_link("../pricing.md", "guide/members"), "/guide/pricing");
    }

    #[test]
    fn test_resolve_link_current_dir() {
        assert_eq!(
            resolve_link("./upgrade.md", "guide/members"),
            "/guide/members/upgrade"
        );
    }

    #[test]
    fn test_resolve_link_external_unchanged() {
        assert_eq!(
            resolve_link("https://example.com", "guide"),
            "https://example.com"
        );
        assert_eq!(
            resolve_link("mailto:team@example.com", "guide"),
            "mailto:team@example.com"
        );
    }

    #[test]
    fn test_resolve_link_fragment_only() {
        assert_eq!(resolve_link("#pricing", "guide"), "#pricing");
    }

    #[test]
    fn test_resolve_link_with_fragment() {
        assert_eq!(
            resolve_link("./faq.md#billing", "guide"),
            "/guide/faq#billing"
        );
    }

    #[test]
    fn test_resolve_link_non_md_unchanged() {
        assert_eq!(resolve_link("./banner.png", "guide"), "./banner.png");
    }

    #[test]
    fn test_resolve_link_absolute() {
        assert_eq!(resolve_link("/news/2026-01-05.md", "guide"), "/news/2026-01-05");
    }

    #[test]
    fn test_resolve_link_traversal_clamped() {
        assert_eq!(resolve_link("../../../etc/passwd.md", "a/b"), "/etc/passwd");
    }
}
