//! Handlers for sections nested under a course.

use academy_core::error::CoreError;
use academy_core::types::DbId;
use academy_db::models::section::{CreateSection, Section};
use academy_db::repositories::{CourseRepo, SectionRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/community/courses/{course_id}/sections
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateSection>,
) -> AppResult<(StatusCode, Json<DataResponse<Section>>)> {
    ensure_course_exists(&state, course_id).await?;
    let section = SectionRepo::create(&state.pool, course_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: section })))
}

/// GET /api/v1/community/courses/{course_id}/sections
pub async fn list_by_course(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Section>>>> {
    ensure_course_exists(&state, course_id).await?;
    let sections = SectionRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(DataResponse { data: sections }))
}

async fn ensure_course_exists(state: &AppState, course_id: DbId) -> AppResult<()> {
    CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;
    Ok(())
}
