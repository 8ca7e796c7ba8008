//! Route definitions for the community course area.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{course, lesson, reorder, section};
use crate::state::AppState;

/// Routes mounted at `/community`.
///
/// ```text
/// GET, POST  /courses
/// GET        /courses/{id}
/// GET, POST  /courses/{id}/sections
/// GET, POST  /sections/{id}/lessons
/// GET        /lessons/{id}
/// POST       /lessons/{id}/upload
/// PUT        /reorder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(course::list).post(course::create))
        .route("/courses/{id}", get(course::get_by_id))
        .route(
            "/courses/{id}/sections",
            get(section::list_by_course).post(section::create),
        )
        .route(
            "/sections/{id}/lessons",
            get(lesson::list_by_section).post(lesson::create),
        )
        .route("/lessons/{id}", get(lesson::get_by_id))
        .route("/lessons/{id}/upload", post(lesson::start_upload))
        .route("/reorder", put(reorder::reorder))
}
