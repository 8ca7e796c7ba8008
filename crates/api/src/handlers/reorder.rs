//! Handler for bulk reordering of sections or lessons.

use academy_core::reorder::parse_reorder_request;
use academy_db::repositories::ReorderRepo;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for a committed reorder.
#[derive(Debug, Serialize)]
pub struct ReorderResult {
    pub message: String,
    pub updated: u64,
}

/// PUT /api/v1/community/reorder
///
/// Applies every `{id, ordem}` pair in one transaction (admin only). The
/// whole body is validated before anything is written; an id that matches
/// no row rolls the batch back and yields 404.
pub async fn reorder(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<DataResponse<ReorderResult>>> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
    let batch = parse_reorder_request(&value)?;

    let updated = ReorderRepo::apply(&state.pool, &batch).await?;

    let entity = batch.collection.entity_name();
    tracing::info!(
        entity,
        updated,
        admin_id = %admin.user_id,
        "Reorder applied",
    );

    Ok(Json(DataResponse {
        data: ReorderResult {
            message: format!("{entity} order updated"),
            updated,
        },
    }))
}
