//! Handlers for lessons and their video uploads.

use academy_core::error::CoreError;
use academy_core::types::DbId;
use academy_db::models::lesson::{CreateLesson, Lesson};
use academy_db::repositories::{LessonRepo, SectionRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for POST /lessons/{id}/upload.
#[derive(Debug, Serialize)]
pub struct UploadStarted {
    pub upload_id: String,
    /// URL the client PUTs the video file to.
    pub upload_url: String,
}

/// POST /api/v1/community/sections/{section_id}/lessons
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
    Json(input): Json<CreateLesson>,
) -> AppResult<(StatusCode, Json<DataResponse<Lesson>>)> {
    ensure_section_exists(&state, section_id).await?;
    let lesson = LessonRepo::create(&state.pool, section_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lesson })))
}

/// GET /api/v1/community/sections/{section_id}/lessons
pub async fn list_by_section(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Lesson>>>> {
    ensure_section_exists(&state, section_id).await?;
    let lessons = LessonRepo::list_by_section(&state.pool, section_id).await?;
    Ok(Json(DataResponse { data: lessons }))
}

/// GET /api/v1/community/lessons/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Lesson>>> {
    let lesson = LessonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(lesson_not_found(id))?;
    Ok(Json(DataResponse { data: lesson }))
}

/// POST /api/v1/community/lessons/{id}/upload
///
/// Opens a direct-upload session at the video provider and attaches its id
/// to the lesson. The asset status is advanced by the provider's webhooks.
pub async fn start_upload(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<UploadStarted>>)> {
    LessonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(lesson_not_found(id))?;

    let session = state
        .video
        .create_upload(&state.config.mux.upload_cors_origin)
        .await?;

    LessonRepo::set_upload_id(&state.pool, id, &session.id)
        .await?
        .ok_or(lesson_not_found(id))?;

    tracing::info!(
        lesson_id = %id,
        upload_id = %session.id,
        admin_id = %admin.user_id,
        "Lesson upload session created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadStarted {
                upload_id: session.id,
                upload_url: session.url,
            },
        }),
    ))
}

async fn ensure_section_exists(state: &AppState, section_id: DbId) -> AppResult<()> {
    SectionRepo::find_by_id(&state.pool, section_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id: section_id,
        }))?;
    Ok(())
}

fn lesson_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Lesson",
        id,
    })
}
