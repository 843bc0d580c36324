//! Component syntax parsing.
//!
//! Parses `CommonMark`-style component syntax: `:name`, `::name`, `:::name`

use super::ComponentArgs;

/// Parsed component invocation from a line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ParsedComponent {
    /// Inline component: `:name[content]{attrs}`
    Inline { name: String, args: ComponentArgs },
    /// Block component: `::name[content]{attrs}`
    Block { name: String, args: ComponentArgs },
    /// Container opening: `:::name[content]{attrs}`
    ContainerStart {
        name: String,
        args: ComponentArgs,
        colon_count: usize,
    },
    /// Container closing: `:::`
    ContainerEnd { colon_count: usize },
}

/// Parse a line for component syntax.
///
/// Scans every colon run in the line, so a component after a plain colon
/// (or a URL like `https://...`) is still found. Returns `None` if the
/// line contains no component syntax.
pub(crate) fn parse_line(line: &str) -> Option<(ParsedComponent, usize, usize)> {
    let mut search_from = 0;

    while let Some(rel) = line[search_from..].find(':') {
        let start = search_from + rel;

        if let Some((component, end)) = parse_at(line, start) {
            return Some((component, start, end));
        }

        // Not component syntax; skip past this colon run and keep scanning
        let colon_count = line[start..].chars().take_while(|&c| c == ':').count();
        search_from = start + colon_count;
    }

    None
}

/// Try to parse component syntax beginning at a colon run.
///
/// Returns the component and the byte offset just past it.
fn parse_at(line: &str, start: usize) -> Option<(ParsedComponent, usize)> {
    let colon_count = line[start..].chars().take_while(|&c| c == ':').count();

    let mut pos = start + colon_count;
    let after_colons = &line[pos..];

    // Container end: just colons (with optional whitespace after)
    if colon_count >= 3 && after_colons.trim().is_empty() {
        return Some((ParsedComponent::ContainerEnd { colon_count }, line.len()));
    }

    // Parse name - name ends at [, {, or whitespace
    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());

    let name = &after_colons[..name_end];
    if name.is_empty() || !is_valid_component_name(name) {
        return None;
    }

    pos += name_end;

    // Parse content in brackets [...]
    let (content, content_consumed) = parse_brackets(&line[pos..]);
    pos += content_consumed;

    // Parse attributes in braces {...}
    let (attrs_str, attrs_consumed) = parse_braces(&line[pos..]);
    pos += attrs_consumed;

    let args = ComponentArgs::parse(&content, &attrs_str);

    let component = match colon_count {
        1 => ParsedComponent::Inline {
            name: name.to_owned(),
            args,
        },
        2 => ParsedComponent::Block {
            name: name.to_owned(),
            args,
        },
        _ => ParsedComponent::ContainerStart {
            name: name.to_owned(),
            args,
            colon_count,
        },
    };

    Some((component, pos))
}

/// Check if a name is a valid component name.
///
/// Valid names contain only alphanumeric characters, hyphens, and underscores.
fn is_valid_component_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Parse content from brackets: `[content]`
///
/// Returns (content, `bytes_consumed`).
fn parse_brackets(s: &str) -> (String, usize) {
    if !s.starts_with('[') {
        return (String::new(), 0);
    }

    // Find matching closing bracket, handling nesting
    let mut depth = 0;
    let mut end = None;

    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    match end {
        Some(end_idx) => {
            let content = &s[1..end_idx];
            (content.to_owned(), end_idx + 1)
        }
        None => (String::new(), 0),
    }
}

/// Parse attributes from braces: `{#id .class key="value"}`
///
/// Returns (`attrs_str` without braces, `bytes_consumed`).
fn parse_braces(s: &str) -> (String, usize) {
    if !s.starts_with('{') {
        return (String::new(), 0);
    }

    // Find matching closing brace, handling nesting
    let mut depth = 0;
    let mut end = None;

    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }

    match end {
        Some(end_idx) => {
            let attrs = &s[1..end_idx];
            (attrs.to_owned(), end_idx + 1)
        }
        None => (String::new(), 0),
    }
}

/// Parse a whole line for a container component.
///
/// Containers take the entire line: `:::name[content]{attrs}` or `:::`.
/// Returns `None` if the line is not container syntax.
pub(crate) fn parse_container_line(line: &str) -> Option<ParsedComponent> {
    let trimmed = line.trim();

    if !trimmed.starts_with(":::") {
        return None;
    }

    let colon_count = trimmed.chars().take_while(|&c| c == ':').count();
    let after_colons = trimmed[colon_count..].trim();

    // Container end
    if after_colons.is_empty() {
        return Some(ParsedComponent::ContainerEnd { colon_count });
    }

    // Parse name
    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());

    let name = &after_colons[..name_end];
    if name.is_empty() || !is_valid_component_name(name) {
        return None;
    }

    let after_name = &after_colons[name_end..];

    // Parse content and attributes
    let (content, content_consumed) = parse_brackets(after_name);
    let after_content = &after_name[content_consumed..];
    let (attrs_str, _) = parse_braces(after_content);

    let args = ComponentArgs::parse(&content, &attrs_str);

    Some(ParsedComponent::ContainerStart {
        name: name.to_owned(),
        args,
        colon_count,
    })
}
