//! Pages API endpoint.
//!
//! Handles page rendering and returns JSON responses with metadata,
//! table of contents, and HTML content. Rendering depends on the reader's
//! entitlement, so cache validators include the access state and every
//! response carries `Vary: x-kb-entitlement`.

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use kb_renderer::TocEntry;
use kb_site::BreadcrumbItem;
use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::{ENTITLEMENT_HEADER, access_from_headers, access_label, to_url_path};
use crate::state::AppState;

/// Response for GET /api/pages/{path}.
#[derive(Serialize)]
struct PageResponse {
    /// Page metadata.
    meta: PageMeta,
    /// Breadcrumb navigation items.
    breadcrumbs: Vec<BreadcrumbResponse>,
    /// Table of contents entries.
    toc: Vec<TocResponse>,
    /// Rendered HTML content.
    content: String,
}

/// Page metadata.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
    /// Page title (from front matter, first heading, or file name).
    title: String,
    /// URL path.
    path: String,
    /// Last modification time (ISO 8601).
    last_modified: String,
    /// Page description (from front matter).
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Publication date (from front matter).
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

/// Breadcrumb item for serialization.
#[derive(Serialize)]
struct BreadcrumbResponse {
    /// Display title.
    title: String,
    /// Link target path.
    path: String,
}

impl From<BreadcrumbItem> for BreadcrumbResponse {
    fn from(item: BreadcrumbItem) -> Self {
        Self {
            title: item.title,
            path: to_url_path(&item.path),
        }
    }
}

/// Table of contents entry for serialization.
#[derive(Serialize)]
struct TocResponse {
    /// Heading level (2-6).
    level: u8,
    /// Heading text.
    title: String,
    /// Anchor ID.
    id: String,
}

impl From<&TocEntry> for TocResponse {
    fn from(entry: &TocEntry) -> Self {
        Self {
            level: entry.level,
            title: entry.title.clone(),
            id: entry.id.clone(),
        }
    }
}

/// Handle GET /api/pages/ (root page).
pub(crate) async fn get_root_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
    get_page_impl(String::new(), state, headers)
}

/// Handle GET /api/pages/{path}.
pub(crate) async fn get_page(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
    get_page_impl(path, state, headers)
}

/// Shared implementation for page rendering.
#[allow(clippy::needless_pass_by_value)]
fn get_page_impl(
    path: String,
    state: Arc<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
    let access = access_from_headers(&headers);

    // Render the page (path is already without leading slash)
    let result = state.site.render(&path, access)?;

    // Log warnings in verbose mode
    if state.verbose && !result.warnings.is_empty() {
        for warning in &result.warnings {
            tracing::warn!(path = %path, warning = %warning, "Page render warning");
        }
    }

    // The access state is part of the ETag because the same URL renders
    // differently per entitlement.
    let etag = compute_etag(&state.version, access_label(access), &result.html);

    // Check If-None-Match header for conditional request
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok((
            [(header::VARY, ENTITLEMENT_HEADER.to_owned())],
            StatusCode::NOT_MODIFIED,
        )
            .into_response());
    }

    // Get last modified time from render result
    let source_mtime = UNIX_EPOCH + Duration::from_secs_f64(result.source_mtime);
    let last_modified: DateTime<Utc> = source_mtime.into();

    // Build response using render result fields directly
    // Add leading slash to path for JSON response (clients expect URLs with leading slash)
    let response = PageResponse {
        meta: PageMeta {
            title: result.title,
            path: to_url_path(&path),
            last_modified: last_modified.to_rfc3339(),
            description: result.meta.description,
            date: result.meta.date,
        },
        breadcrumbs: result
            .breadcrumbs
            .into_iter()
            .map(BreadcrumbResponse::from)
            .collect(),
        toc: result.toc.iter().map(TocResponse::from).collect(),
        content: result.html,
    };

    Ok((
        [
            (header::ETAG, etag),
            (
                header::LAST_MODIFIED,
                last_modified
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string(),
            ),
            (header::CACHE_CONTROL, "private, max-age=60".to_string()),
            (header::VARY, ENTITLEMENT_HEADER.to_owned()),
        ],
        Json(response),
    )
        .into_response())
}

/// Compute `ETag` from version, access state, and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars) - sufficient for
/// cache invalidation with negligible collision probability.
fn compute_etag(version: &str, access: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{access}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
