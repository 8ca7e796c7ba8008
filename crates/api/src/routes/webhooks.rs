//! Provider webhook routes.
//!
//! Mounted at `/api/webhooks`, outside `/api/v1`: the provider authenticates
//! with a body signature rather than a user token.

use axum::routing::post;
use axum::Router;

use crate::handlers::mux_webhook;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/mux", post(mux_webhook::receive))
}
