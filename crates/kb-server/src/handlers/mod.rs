//! HTTP request handlers.

pub(crate) mod html;
pub(crate) mod navigation;
pub(crate) mod pages;
pub(crate) mod site;

use axum::http::HeaderMap;
use kb_theme::AccessState;

/// Request header carrying the reader's entitlement decision.
pub(crate) const ENTITLEMENT_HEADER: &str = "x-kb-entitlement";

/// Convert internal path (without leading slash) to URL path (with leading slash).
///
/// The site stores paths without leading slashes (e.g., "guide", "guide/setup",
/// "" for root), but clients expect URL paths with leading slashes (e.g.,
/// "/guide", "/guide/setup", "/").
pub(crate) fn to_url_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        format!("/{path}")
    }
}

/// Resolve the access state from the entitlement header.
///
/// Only the exact values `granted` and `denied` resolve the state; anything
/// else stays pending so gated content renders as a teaser.
pub(crate) fn access_from_headers(headers: &HeaderMap) -> AccessState {
    match headers
        .get(ENTITLEMENT_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some("granted") => AccessState::resolved(true),
        Some("denied") => AccessState::resolved(false),
        _ => AccessState::Pending,
    }
}

/// Stable label for an access state, used in cache keys.
pub(crate) fn access_label(access: AccessState) -> &'static str {
    match access {
        AccessState::Pending => "pending",
        AccessState::Resolved { entitled: true } => "granted",
        AccessState::Resolved { entitled: false } => "denied",
    }
}
