//! Lesson entity model, DTOs, and the reconciliation outcome types.

use academy_core::asset::AssetStatus;
use academy_core::error::CoreError;
use academy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lessons` table.
///
/// The `external_*` columns and `asset_status` are written only by the
/// webhook reconciler; user-facing flows may set `external_upload_id` when
/// starting a new upload.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: DbId,
    pub section_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub ordem: i32,
    pub external_upload_id: Option<String>,
    pub external_asset_id: Option<String>,
    pub external_playback_id: Option<String>,
    pub asset_status: String,
    pub duration_seconds: Option<i32>,
    #[serde(skip_serializing)]
    pub asset_upload_id: Option<String>,
    #[serde(skip_serializing)]
    pub asset_event_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Lesson {
    /// Parse the stored status string.
    pub fn status(&self) -> Result<AssetStatus, CoreError> {
        self.asset_status.parse()
    }
}

/// DTO for creating a lesson. `section_id` comes from the request path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLesson {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `0` when omitted.
    pub ordem: Option<i32>,
}

/// Field values written when an asset becomes ready.
#[derive(Debug, Clone)]
pub struct AssetReady<'a> {
    pub asset_id: &'a str,
    pub playback_id: Option<&'a str>,
    pub duration_seconds: Option<i32>,
    pub event_at: Option<Timestamp>,
}

/// Result of applying an "asset ready" transition.
#[derive(Debug, Clone)]
pub struct ReadyOutcome {
    pub lesson: Lesson,
    /// Previously attached asset ids captured (and cleared) by this transition.
    pub superseded_asset_ids: Vec<String>,
}

/// Result of applying a provider event to the lesson it correlates with.
#[derive(Debug, Clone)]
pub enum Transition<T> {
    /// The event was applied; carries the updated state.
    Applied(T),
    /// A lesson matched but the event is stale or would regress its state.
    Ignored,
    /// No lesson carries the correlation id.
    NoMatch,
}

impl<T> Transition<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }
}
