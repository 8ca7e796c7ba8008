//! The outbound operations the service needs from the video provider.
//!
//! Handlers and the event processor depend on [`VideoProvider`] rather than
//! on [`crate::api::MuxApi`] directly so tests can substitute a recording fake.

use academy_core::asset::PlaybackEntry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::MuxApiError;

/// A direct-upload session the client can PUT a video file to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    /// Provider upload id; later events correlate on it.
    pub id: String,
    /// Client-usable upload URL.
    pub url: String,
}

/// The subset of a provider asset the service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetInfo {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub playback_ids: Vec<PlaybackEntry>,
    pub duration: Option<f64>,
}

/// Outbound calls to the video hosting provider.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Open a direct-upload session whose asset gets a public playback id.
    async fn create_upload(&self, cors_origin: &str) -> Result<UploadSession, MuxApiError>;

    /// Fetch an asset's current state.
    async fn retrieve_asset(&self, asset_id: &str) -> Result<AssetInfo, MuxApiError>;

    /// Delete an asset. Deleting an asset that no longer exists succeeds.
    async fn delete_asset(&self, asset_id: &str) -> Result<(), MuxApiError>;
}
