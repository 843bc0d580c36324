//! Site API endpoint.
//!
//! Returns the site chrome (title, nav links, footer, search settings) so
//! clients can draw the frame without scraping HTML.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use kb_site::SiteChrome;

use crate::state::AppState;

/// Handle GET /api/site.
pub(crate) async fn get_site(State(state): State<Arc<AppState>>) -> Json<SiteChrome> {
    Json(state.chrome.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kb_site::{Site, SiteOptions};
    use kb_storage::MockStorage;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_site_returns_chrome() {
        let chrome = SiteChrome {
            title: "KB Docs".to_string(),
            ..SiteChrome::default()
        };
        let state = Arc::new(AppState {
            site: Arc::new(Site::new(
                Arc::new(MockStorage::new()),
                SiteOptions::default(),
            )),
            chrome,
            verbose: false,
            version: String::new(),
        });

        let Json(returned) = tokio_test::block_on(get_site(State(state)));

        assert_eq!(returned.title, "KB Docs");
        // Unconfigured chrome serves empty collections, not an error
        assert!(returned.nav.is_empty());
        assert!(returned.sidebar.is_empty());
    }
}
