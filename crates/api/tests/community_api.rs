//! HTTP-level integration tests for the course, section, and lesson endpoints.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{admin_token, body_json, get, member_token, post_json, FakeVideoProvider, WEBHOOK_SECRET};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a course, a section, and a lesson through the API.
/// Returns `(course_id, section_id, lesson_id)`.
async fn create_tree(pool: &PgPool) -> (String, String, String) {
    let token = admin_token();

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/community/courses",
        &token,
        json!({"title": "Rust 101"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let course_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/community/courses/{course_id}/sections"),
        &token,
        json!({"title": "Ownership", "ordem": 2}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let section_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/community/sections/{section_id}/lessons"),
        &token,
        json!({"title": "Borrowing", "ordem": 1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let lesson_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    (course_id, section_id, lesson_id)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn course_detail_includes_sections(pool: PgPool) {
    let (course_id, section_id, _) = create_tree(&pool).await;

    let app = common::build_test_app(pool);
    let response = get(
        app,
        &format!("/api/v1/community/courses/{course_id}"),
        Some(&member_token()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Rust 101");
    assert_eq!(json["data"]["sections"][0]["id"], section_id.as_str());
    assert_eq!(json["data"]["sections"][0]["ordem"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn new_lesson_has_no_video(pool: PgPool) {
    let (_, section_id, lesson_id) = create_tree(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        &format!("/api/v1/community/lessons/{lesson_id}"),
        Some(&member_token()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["asset_status"], "none");
    assert!(json["data"]["external_playback_id"].is_null());
    assert!(json["data"].get("asset_event_at").is_none());

    let app = common::build_test_app(pool);
    let response = get(
        app,
        &format!("/api/v1/community/sections/{section_id}/lessons"),
        Some(&member_token()),
    )
    .await;
    let json = body_json(response).await;
    assert_matches!(json["data"].as_array(), Some(lessons) if lessons.len() == 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_resources_return_404(pool: PgPool) {
    let token = member_token();
    let missing = Uuid::new_v4();

    for uri in [
        format!("/api/v1/community/lessons/{missing}"),
        format!("/api/v1/community/courses/{missing}"),
        format!("/api/v1/community/sections/{missing}/lessons"),
    ] {
        let app = common::build_test_app(pool.clone());
        let response = get(app, &uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reading_requires_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/community/courses", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn authoring_requires_admin(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/community/courses",
        &member_token(),
        json!({"title": "Nope"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn start_upload_attaches_session_without_touching_status(pool: PgPool) {
    let (_, _, lesson_id) = create_tree(&pool).await;
    let video = Arc::new(FakeVideoProvider::default());

    let app = common::build_test_app_with(pool.clone(), Arc::clone(&video), Some(WEBHOOK_SECRET));
    let response = post_json(
        app,
        &format!("/api/v1/community/lessons/{lesson_id}/upload"),
        &admin_token(),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["upload_id"], "upload-1");
    assert_eq!(json["data"]["upload_url"], "https://storage.example/upload-1");

    let app = common::build_test_app(pool);
    let response = get(
        app,
        &format!("/api/v1/community/lessons/{lesson_id}"),
        Some(&member_token()),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["external_upload_id"], "upload-1");
    assert_eq!(json["data"]["asset_status"], "none");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn start_upload_for_missing_lesson_is_404(pool: PgPool) {
    let video = Arc::new(FakeVideoProvider::default());
    let app = common::build_test_app_with(pool, Arc::clone(&video), Some(WEBHOOK_SECRET));
    let response = post_json(
        app,
        &format!("/api/v1/community/lessons/{}/upload", Uuid::new_v4()),
        &admin_token(),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
