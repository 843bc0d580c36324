//! Server error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kb_site::RenderError;

/// Errors returned by API handlers, serialized as JSON.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Requested page does not exist.
    #[error("Page not found: {0}")]
    PageNotFound(String),
    /// Page rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::PageNotFound(_)
            | Self::Render(RenderError::PageNotFound(_) | RenderError::FileNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Render(RenderError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
