use academy_core::signature::DEFAULT_TOLERANCE_SECS;
use academy_mux::api::DEFAULT_BASE_URL;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except secrets have defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for the database pool to drain on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Video provider credentials and webhook settings.
    pub mux: MuxConfig,
}

/// Video provider settings.
#[derive(Debug, Clone)]
pub struct MuxConfig {
    /// API access token id (basic auth username).
    pub token_id: String,
    /// API access token secret (basic auth password).
    pub token_secret: String,
    /// Shared secret for webhook signatures. Webhooks are refused while unset.
    pub webhook_secret: Option<String>,
    /// API base URL.
    pub api_base_url: String,
    /// Origin allowed to PUT to direct-upload URLs.
    pub upload_cors_origin: String,
    /// Maximum age of a webhook signature timestamp, in seconds.
    pub signature_tolerance_secs: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            mux: MuxConfig::from_env(),
        }
    }
}

impl MuxConfig {
    /// Load provider settings from environment variables.
    ///
    /// | Env Var                        | Required | Default               |
    /// |--------------------------------|----------|-----------------------|
    /// | `MUX_TOKEN_ID`                 | **yes**  | --                    |
    /// | `MUX_TOKEN_SECRET`             | **yes**  | --                    |
    /// | `MUX_WEBHOOK_SECRET`           | no       | unset                 |
    /// | `MUX_API_BASE_URL`             | no       | `https://api.mux.com` |
    /// | `MUX_UPLOAD_CORS_ORIGIN`       | no       | `*`                   |
    /// | `MUX_SIGNATURE_TOLERANCE_SECS` | no       | `300`                 |
    ///
    /// # Panics
    ///
    /// Panics if the token id or secret is missing.
    pub fn from_env() -> Self {
        let token_id =
            std::env::var("MUX_TOKEN_ID").expect("MUX_TOKEN_ID must be set in the environment");
        let token_secret = std::env::var("MUX_TOKEN_SECRET")
            .expect("MUX_TOKEN_SECRET must be set in the environment");

        let webhook_secret = std::env::var("MUX_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());
        if webhook_secret.is_none() {
            tracing::warn!("MUX_WEBHOOK_SECRET is not set; video webhooks will be rejected");
        }

        let api_base_url =
            std::env::var("MUX_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let upload_cors_origin =
            std::env::var("MUX_UPLOAD_CORS_ORIGIN").unwrap_or_else(|_| "*".into());

        let signature_tolerance_secs: i64 = std::env::var("MUX_SIGNATURE_TOLERANCE_SECS")
            .unwrap_or_else(|_| DEFAULT_TOLERANCE_SECS.to_string())
            .parse()
            .expect("MUX_SIGNATURE_TOLERANCE_SECS must be a valid i64");

        Self {
            token_id,
            token_secret,
            webhook_secret,
            api_base_url,
            upload_cors_origin,
            signature_tolerance_secs,
        }
    }
}
