//! Navigation API endpoint.
//!
//! Returns the navigation tree derived from the content directory.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use kb_site::NavItem;
use serde::Serialize;

use crate::handlers::to_url_path;
use crate::state::AppState;

/// Response for GET /api/navigation.
#[derive(Serialize)]
pub(crate) struct NavigationResponse {
    /// Navigation tree items.
    items: Vec<NavItemResponse>,
}

/// Navigation item for serialization.
#[derive(Serialize)]
struct NavItemResponse {
    /// Display title.
    title: String,
    /// URL path.
    path: String,
    /// Child items.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NavItemResponse>,
}

impl From<NavItem> for NavItemResponse {
    fn from(item: NavItem) -> Self {
        Self {
            title: item.title,
            path: to_url_path(&item.path),
            children: item.children.into_iter().map(Self::from).collect(),
        }
    }
}

/// Handle GET /api/navigation.
pub(crate) async fn get_navigation(State(state): State<Arc<AppState>>) -> Json<NavigationResponse> {
    let items = state
        .site
        .navigation()
        .into_iter()
        .map(NavItemResponse::from)
        .collect();
    Json(NavigationResponse { items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_navigation_paths_get_leading_slash() {
        let item = NavItem {
            title: "Guide".to_string(),
            path: "guide".to_string(),
            children: vec![NavItem {
                title: "Setup".to_string(),
                path: "guide/setup".to_string(),
                children: vec![],
            }],
        };

        let mapped = NavItemResponse::from(item);

        assert_eq!(mapped.path, "/guide");
        assert_eq!(mapped.children[0].path, "/guide/setup");
    }

    #[test]
    fn test_navigation_response_serialization() {
        let response = NavigationResponse {
            items: vec![NavItemResponse {
                title: "Guide".to_string(),
                path: "/guide".to_string(),
                children: vec![],
            }],
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["items"][0]["title"], "Guide");
        assert_eq!(json["items"][0]["path"], "/guide");
        // Empty children are omitted entirely
        assert!(json["items"][0].get("children").is_none());
    }
}
