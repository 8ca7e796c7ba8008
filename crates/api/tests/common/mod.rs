#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use academy_api::auth::jwt::{generate_access_token, JwtConfig};
use academy_api::config::{MuxConfig, ServerConfig};
use academy_api::router::build_app_router;
use academy_api::state::AppState;
use academy_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use academy_core::signature::{signature_header_value, DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER};
use academy_mux::api::MuxApiError;
use academy_mux::provider::{AssetInfo, UploadSession, VideoProvider};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(webhook_secret: Option<&str>) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        mux: MuxConfig {
            token_id: "token-id".to_string(),
            token_secret: "token-secret".to_string(),
            webhook_secret: webhook_secret.map(str::to_string),
            api_base_url: "http://127.0.0.1:1".to_string(),
            upload_cors_origin: "http://localhost:5173".to_string(),
            signature_tolerance_secs: DEFAULT_TOLERANCE_SECS,
        },
    }
}

// ---------------------------------------------------------------------------
// Fake video provider
// ---------------------------------------------------------------------------

/// In-memory [`VideoProvider`] that records every call.
#[derive(Default)]
pub struct FakeVideoProvider {
    uploads_created: AtomicUsize,
    /// Assets `retrieve_asset` knows about.
    pub assets: Mutex<HashMap<String, AssetInfo>>,
    /// Every id passed to `delete_asset`, in call order.
    pub deleted: Mutex<Vec<String>>,
    /// Ids whose deletion fails with a provider error.
    pub failing_deletes: Mutex<Vec<String>>,
}

impl FakeVideoProvider {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn insert_asset(&self, asset: AssetInfo) {
        self.assets.lock().unwrap().insert(asset.id.clone(), asset);
    }
}

#[async_trait]
impl VideoProvider for FakeVideoProvider {
    async fn create_upload(&self, _cors_origin: &str) -> Result<UploadSession, MuxApiError> {
        let n = self.uploads_created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(UploadSession {
            id: format!("upload-{n}"),
            url: format!("https://storage.example/upload-{n}"),
        })
    }

    async fn retrieve_asset(&self, asset_id: &str) -> Result<AssetInfo, MuxApiError> {
        self.assets
            .lock()
            .unwrap()
            .get(asset_id)
            .cloned()
            .ok_or_else(|| MuxApiError::ApiError {
                status: 404,
                body: "not found".to_string(),
            })
    }

    async fn delete_asset(&self, asset_id: &str) -> Result<(), MuxApiError> {
        self.deleted.lock().unwrap().push(asset_id.to_string());
        if self.failing_deletes.lock().unwrap().iter().any(|id| id == asset_id) {
            return Err(MuxApiError::ApiError {
                status: 500,
                body: "delete failed".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the full application router (same middleware stack as production)
/// with a fresh fake provider and the test webhook secret.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(FakeVideoProvider::default()), Some(WEBHOOK_SECRET))
}

/// Build the application router around a caller-owned fake provider.
pub fn build_test_app_with(
    pool: PgPool,
    video: Arc<FakeVideoProvider>,
    webhook_secret: Option<&str>,
) -> Router {
    let config = test_config(webhook_secret);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        video,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn admin_token() -> String {
    token_for(ROLE_ADMIN)
}

pub fn member_token() -> String {
    token_for(ROLE_MEMBER)
}

fn token_for(role: &str) -> String {
    generate_access_token(Uuid::new_v4(), role, &test_config(None).jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, "POST", uri, token, body.to_string()).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, "PUT", uri, token, body.to_string()).await
}

/// PUT an arbitrary (possibly malformed) body.
pub async fn put_raw(app: Router, uri: &str, token: &str, body: &str) -> Response<Body> {
    send_json(app, "PUT", uri, token, body.to_string()).await
}

async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    token: &str,
    body: String,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a webhook body signed with `secret` at the current time.
pub async fn post_webhook(app: Router, body: &str, secret: &str) -> Response<Body> {
    let now = chrono::Utc::now().timestamp();
    let signature = signature_header_value(secret, now, body.as_bytes());
    post_webhook_raw(app, body, Some(&signature)).await
}

/// POST a webhook body with an explicit (or missing) signature header.
pub async fn post_webhook_raw(
    app: Router,
    body: &str,
    signature: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/mux")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}
