//! REST API client for the video hosting provider.
//!
//! Wraps the provider's HTTP API (direct uploads, asset retrieval, asset
//! deletion) using [`reqwest`] with HTTP basic auth.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::provider::{AssetInfo, UploadSession, VideoProvider};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.mux.com";

/// HTTP request timeout for a single API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client for the provider's video API.
pub struct MuxApi {
    client: reqwest::Client,
    base_url: String,
    token_id: String,
    token_secret: String,
}

/// Errors from the provider REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum MuxApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Video API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Every provider response wraps its payload in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

impl MuxApi {
    /// Create a new API client.
    ///
    /// * `base_url` - e.g. [`DEFAULT_BASE_URL`]; a trailing slash is ignored.
    pub fn new(
        base_url: impl Into<String>,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Result<Self, MuxApiError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url, token_id, token_secret))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token_id: token_id.into(),
            token_secret: token_secret.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.token_id, Some(&self.token_secret))
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`MuxApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, MuxApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MuxApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful `{ "data": T }` response body.
    async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, MuxApiError> {
        let response = Self::ensure_success(response).await?;
        let envelope = response.json::<DataEnvelope<T>>().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl VideoProvider for MuxApi {
    async fn create_upload(&self, cors_origin: &str) -> Result<UploadSession, MuxApiError> {
        let body = serde_json::json!({
            "cors_origin": cors_origin,
            "new_asset_settings": {
                "playback_policy": ["public"],
            },
        });

        let response = self
            .authed(self.client.post(self.url("/video/v1/uploads")))
            .json(&body)
            .send()
            .await?;

        Self::parse_data(response).await
    }

    async fn retrieve_asset(&self, asset_id: &str) -> Result<AssetInfo, MuxApiError> {
        let response = self
            .authed(self.client.get(self.url(&format!("/video/v1/assets/{asset_id}"))))
            .send()
            .await?;

        Self::parse_data(response).await
    }

    async fn delete_asset(&self, asset_id: &str) -> Result<(), MuxApiError> {
        let response = self
            .authed(
                self.client
                    .delete(self.url(&format!("/video/v1/assets/{asset_id}"))),
            )
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(asset_id, "Asset already deleted at provider");
            return Ok(());
        }
        Self::ensure_success(response).await?;
        Ok(())
    }
}
