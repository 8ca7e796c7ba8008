//! Provider webhook event types and parser.
//!
//! The provider posts JSON envelopes shaped like
//! `{"type": "<kind>", "data": {...}, "created_at": "<rfc3339>"}`. Only the
//! kinds the reconciler acts on are decoded into typed variants; everything
//! else becomes [`MuxEvent::Unhandled`] so it can be acknowledged.

use academy_core::asset::PlaybackEntry;
use academy_core::types::Timestamp;
use serde::Deserialize;

pub const UPLOAD_CREATED: &str = "video.upload.created";
pub const UPLOAD_ASSET_CREATED: &str = "video.upload.asset_created";
pub const UPLOAD_ERRORED: &str = "video.upload.errored";
pub const UPLOAD_CANCELLED: &str = "video.upload.cancelled";
pub const ASSET_READY: &str = "video.asset.ready";
pub const ASSET_ERRORED: &str = "video.asset.errored";

/// Raw envelope; `data` stays untyped until the kind is known.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    created_at: Option<Timestamp>,
}

/// A decoded webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub event: MuxEvent,
    /// Provider-side event time, used to discard out-of-order deliveries.
    pub created_at: Option<Timestamp>,
}

/// Webhook kinds the reconciler understands.
#[derive(Debug, Clone)]
pub enum MuxEvent {
    /// A direct-upload session was created.
    UploadCreated(UploadData),
    /// The provider created an asset from an upload.
    UploadAssetCreated(UploadAssetCreatedData),
    /// The upload failed before an asset was created.
    UploadErrored(UploadData),
    /// The upload was cancelled before an asset was created.
    UploadCancelled(UploadData),
    /// An asset finished processing and is playable.
    AssetReady(AssetData),
    /// An asset failed processing.
    AssetErrored(AssetData),
    /// Any other kind; acknowledged without side effects.
    Unhandled(String),
}

impl MuxEvent {
    /// The envelope `type` this variant was decoded from.
    pub fn kind(&self) -> &str {
        match self {
            MuxEvent::UploadCreated(_) => UPLOAD_CREATED,
            MuxEvent::UploadAssetCreated(_) => UPLOAD_ASSET_CREATED,
            MuxEvent::UploadErrored(_) => UPLOAD_ERRORED,
            MuxEvent::UploadCancelled(_) => UPLOAD_CANCELLED,
            MuxEvent::AssetReady(_) => ASSET_READY,
            MuxEvent::AssetErrored(_) => ASSET_ERRORED,
            MuxEvent::Unhandled(kind) => kind,
        }
    }
}

/// Payload of upload events; `id` is the upload id.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadData {
    pub id: String,
}

/// Payload of `video.upload.asset_created`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadAssetCreatedData {
    /// Upload id.
    pub id: String,
    pub asset_id: String,
}

/// Payload of asset events; `id` is the asset id.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetData {
    pub id: String,
    #[serde(default)]
    pub playback_ids: Vec<PlaybackEntry>,
    /// Duration in (fractional) seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Parse a raw webhook body into a typed event.
///
/// Returns `Err` for malformed JSON, a missing `type`, or a known kind whose
/// `data` lacks required fields. Unknown kinds parse successfully.
pub fn parse_event(body: &[u8]) -> Result<WebhookEvent, serde_json::Error> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    let data = envelope.data;

    let event = match envelope.kind.as_str() {
        UPLOAD_CREATED => MuxEvent::UploadCreated(serde_json::from_value(data)?),
        UPLOAD_ASSET_CREATED => MuxEvent::UploadAssetCreated(serde_json::from_value(data)?),
        UPLOAD_ERRORED => MuxEvent::UploadErrored(serde_json::from_value(data)?),
        UPLOAD_CANCELLED => MuxEvent::UploadCancelled(serde_json::from_value(data)?),
        ASSET_READY => MuxEvent::AssetReady(serde_json::from_value(data)?),
        ASSET_ERRORED => MuxEvent::AssetErrored(serde_json::from_value(data)?),
        _ => MuxEvent::Unhandled(envelope.kind),
    };

    Ok(WebhookEvent {
        event,
        created_at: envelope.created_at,
    })
}
