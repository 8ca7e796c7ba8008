pub mod community;
pub mod health;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /community/...      courses, sections, lessons, uploads, reorder
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/community", community::router())
}
