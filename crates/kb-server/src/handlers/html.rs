//! Server-rendered page endpoints.
//!
//! Wraps rendered pages in the shared chrome shell. Unknown paths get an
//! HTML 404 page instead of the JSON error the API returns.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use kb_site::{NavItem, PageShell, RenderError, render_page};

use crate::handlers::{ENTITLEMENT_HEADER, access_from_headers};
use crate::state::AppState;

/// Handle GET / (root page).
pub(crate) async fn get_root_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    get_page_impl(String::new(), state, headers)
}

/// Handle GET /{path}.
pub(crate) async fn get_page(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    get_page_impl(path, state, headers)
}

/// Shared implementation for page rendering.
#[allow(clippy::needless_pass_by_value)]
fn get_page_impl(path: String, state: Arc<AppState>, headers: HeaderMap) -> Response {
    let access = access_from_headers(&headers);
    let navigation = state.site.navigation();

    match state.site.render(&path, access) {
        Ok(result) => {
            if state.verbose && !result.warnings.is_empty() {
                for warning in &result.warnings {
                    tracing::warn!(path = %path, warning = %warning, "Page render warning");
                }
            }

            let shell = PageShell {
                chrome: &state.chrome,
                navigation: &navigation,
                title: &result.title,
                description: result.meta.description.as_deref(),
                breadcrumbs: &result.breadcrumbs,
                toc: &result.toc,
                content: &result.html,
            };
            (
                [(header::VARY, ENTITLEMENT_HEADER.to_owned())],
                Html(render_page(&shell)),
            )
                .into_response()
        }
        Err(RenderError::PageNotFound(_) | RenderError::FileNotFound(_)) => {
            not_found_page(&state, &navigation)
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Failed to render page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Internal server error</h1>".to_string()),
            )
                .into_response()
        }
    }
}

/// Render the HTML 404 page inside the chrome shell.
fn not_found_page(state: &AppState, navigation: &[NavItem]) -> Response {
    let shell = PageShell {
        chrome: &state.chrome,
        navigation,
        title: "Page not found",
        description: None,
        breadcrumbs: &[],
        toc: &[],
        content: "<h1>Page not found</h1>\n<p>The page you are looking for does not exist.</p>",
    };
    (StatusCode::NOT_FOUND, Html(render_page(&shell))).into_response()
}
