//! Receiver for the video provider's webhooks.
//!
//! The raw body is verified against the signature header before it is
//! parsed, then handed to the reconciler. Deliveries that match no lesson
//! are acknowledged so the provider does not retry them.

use academy_core::error::CoreError;
use academy_core::signature::{verify_signature, SIGNATURE_HEADER};
use academy_mux::messages::parse_event;
use academy_mux::processor;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Acknowledgement body returned to the provider.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/webhooks/mux
///
/// | Status | When |
/// |---|---|
/// | 200 | Verified and processed, including unknown kinds and unmatched ids |
/// | 400 | Verified body that does not decode (not retried by the provider) |
/// | 401 | Missing, malformed, expired, or mismatched signature |
/// | 500 | No webhook secret configured, or a store/provider failure |
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let Some(secret) = state.config.mux.webhook_secret.as_deref() else {
        return Err(AppError::InternalError(
            "Video webhook secret is not configured".into(),
        ));
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let now = chrono::Utc::now().timestamp();
    verify_signature(
        secret,
        signature,
        &body,
        now,
        state.config.mux.signature_tolerance_secs,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected video webhook");
        AppError::Core(CoreError::Unauthorized(
            "Invalid webhook signature".into(),
        ))
    })?;

    let webhook = parse_event(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    let outcome = processor::reconcile(&state.pool, state.video.as_ref(), &webhook).await?;
    tracing::info!(
        kind = webhook.event.kind(),
        ?outcome,
        "Video webhook processed",
    );

    Ok(Json(WebhookAck { received: true }))
}
