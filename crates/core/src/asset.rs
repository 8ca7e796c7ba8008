//! Video asset lifecycle state and the pure helpers the reconciler uses to
//! derive a lesson's target state from a provider event.
//!
//! The status values must match the `lessons.asset_status` CHECK constraint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Playback policy the provider uses for publicly streamable playback ids.
pub const PUBLIC_PLAYBACK_POLICY: &str = "public";

/// Lifecycle of the video attached to a lesson.
///
/// Moves forward along `none -> uploading -> processing -> ready | errored`.
/// Starting a new upload resets a lesson to `uploading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    None,
    Uploading,
    Processing,
    Ready,
    Errored,
}

impl AssetStatus {
    /// The string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetStatus::None => "none",
            AssetStatus::Uploading => "uploading",
            AssetStatus::Processing => "processing",
            AssetStatus::Ready => "ready",
            AssetStatus::Errored => "errored",
        }
    }

    /// Whether the provider has finished with the current asset (successfully or not).
    pub fn is_settled(self) -> bool {
        matches!(self, AssetStatus::Ready | AssetStatus::Errored)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AssetStatus::None),
            "uploading" => Ok(AssetStatus::Uploading),
            "processing" => Ok(AssetStatus::Processing),
            "ready" => Ok(AssetStatus::Ready),
            "errored" => Ok(AssetStatus::Errored),
            other => Err(CoreError::Validation(format!(
                "Unknown asset status '{other}'"
            ))),
        }
    }
}

/// A provider-issued playback identifier and the policy it is served under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackEntry {
    pub id: String,
    pub policy: String,
}

/// Pick the playback id to expose for a ready asset.
///
/// Prefers the first entry with the `public` policy, otherwise falls back to
/// the first entry. Returns `None` when the list is empty.
pub fn select_playback_id(entries: &[PlaybackEntry]) -> Option<&str> {
    entries
        .iter()
        .find(|e| e.policy == PUBLIC_PLAYBACK_POLICY)
        .or_else(|| entries.first())
        .map(|e| e.id.as_str())
}

/// Convert the provider's fractional duration into whole seconds.
///
/// Rounds half away from zero (`12.5 -> 13`). Missing, negative, or
/// non-finite durations yield `None` so the stored duration stays unset.
pub fn round_duration_secs(duration: Option<f64>) -> Option<i32> {
    let secs = duration?;
    if !secs.is_finite() || secs < 0.0 || secs > f64::from(i32::MAX) {
        return None;
    }
    Some(secs.round() as i32)
}

/// A lesson's asset columns as read just before applying a provider event.
#[derive(Debug, Clone, Copy)]
pub struct AssetState<'a> {
    pub status: AssetStatus,
    pub asset_id: Option<&'a str>,
    /// Upload session the current asset was created from.
    pub asset_upload_id: Option<&'a str>,
    /// Provider timestamp of the last event applied to this lesson.
    pub last_event_at: Option<Timestamp>,
}

/// Whether an incoming event predates the last one applied.
///
/// Events without a timestamp are never considered stale (last write wins).
pub fn is_stale_event(last_applied: Option<Timestamp>, incoming: Option<Timestamp>) -> bool {
    matches!((last_applied, incoming), (Some(last), Some(incoming)) if incoming < last)
}

/// "Upload created": the lesson moves to `uploading`.
///
/// Skipped once the upload has already produced the lesson's current asset,
/// so a late delivery cannot pull a lesson back from `processing` or `ready`.
pub fn accepts_upload_created(
    state: &AssetState<'_>,
    upload_id: &str,
    event_at: Option<Timestamp>,
) -> bool {
    !is_stale_event(state.last_event_at, event_at) && state.asset_upload_id != Some(upload_id)
}

/// "Asset created from upload": the lesson moves to `processing` with the new asset.
///
/// A redelivery for an asset that already settled is ignored.
pub fn accepts_asset_created(
    state: &AssetState<'_>,
    asset_id: &str,
    event_at: Option<Timestamp>,
) -> bool {
    if is_stale_event(state.last_event_at, event_at) {
        return false;
    }
    !(state.asset_id == Some(asset_id) && state.status.is_settled())
}

/// "Asset ready" / "asset errored" for the lesson's current asset.
pub fn accepts_asset_settled(state: &AssetState<'_>, event_at: Option<Timestamp>) -> bool {
    !is_stale_event(state.last_event_at, event_at)
}

/// "Upload errored" / "upload cancelled": only meaningful before an asset exists.
pub fn accepts_upload_failed(state: &AssetState<'_>, event_at: Option<Timestamp>) -> bool {
    !is_stale_event(state.last_event_at, event_at) && state.status == AssetStatus::Uploading
}

/// The asset id retired when `replacement` is attached, if any.
pub fn superseded_asset<'a>(previous: Option<&'a str>, replacement: &str) -> Option<&'a str> {
    previous.filter(|prev| *prev != replacement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn entry(id: &str, policy: &str) -> PlaybackEntry {
        PlaybackEntry {
            id: id.to_string(),
            policy: policy.to_string(),
        }
    }

    fn state(status: AssetStatus, asset_id: Option<&str>, last: Option<i64>) -> AssetState<'_> {
        AssetState {
            status,
            asset_id,
            asset_upload_id: None,
            last_event_at: last.map(ts),
        }
    }

    fn ts(secs: i64) -> Timestamp {
        chrono::DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn status_string_form_matches_parse() {
        for status in [
            AssetStatus::None,
            AssetStatus::Uploading,
            AssetStatus::Processing,
            AssetStatus::Ready,
            AssetStatus::Errored,
        ] {
            assert_eq!(status.as_str().parse::<AssetStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        assert_matches!("deleted".parse::<AssetStatus>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn settled_statuses() {
        assert!(AssetStatus::Ready.is_settled());
        assert!(AssetStatus::Errored.is_settled());
        assert!(!AssetStatus::Processing.is_settled());
        assert!(!AssetStatus::None.is_settled());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&AssetStatus::Processing).unwrap();
        assert_eq!(json, r#""processing""#);
    }

    #[test]
    fn public_playback_is_preferred() {
        let entries = vec![entry("signed-1", "signed"), entry("pub-1", "public")];
        assert_eq!(select_playback_id(&entries), Some("pub-1"));
    }

    #[test]
    fn first_playback_used_without_public() {
        let entries = vec![entry("signed-1", "signed"), entry("signed-2", "signed")];
        assert_eq!(select_playback_id(&entries), Some("signed-1"));
    }

    #[test]
    fn no_playback_entries() {
        assert_eq!(select_playback_id(&[]), None);
    }

    #[test]
    fn duration_rounds_to_nearest_second() {
        assert_eq!(round_duration_secs(Some(12.7)), Some(13));
        assert_eq!(round_duration_secs(Some(12.2)), Some(12));
        assert_eq!(round_duration_secs(Some(12.5)), Some(13));
        assert_eq!(round_duration_secs(Some(0.0)), Some(0));
    }

    #[test]
    fn missing_or_invalid_duration_is_unset() {
        assert_eq!(round_duration_secs(None), None);
        assert_eq!(round_duration_secs(Some(-1.0)), None);
        assert_eq!(round_duration_secs(Some(f64::NAN)), None);
        assert_eq!(round_duration_secs(Some(f64::INFINITY)), None);
    }

    #[test]
    fn stale_only_when_both_timestamps_known() {
        assert!(is_stale_event(Some(ts(200)), Some(ts(100))));
        assert!(!is_stale_event(Some(ts(100)), Some(ts(100))));
        assert!(!is_stale_event(Some(ts(100)), Some(ts(200))));
        assert!(!is_stale_event(None, Some(ts(100))));
        assert!(!is_stale_event(Some(ts(100)), None));
    }

    #[test]
    fn upload_created_skips_uploads_that_already_produced_the_asset() {
        assert!(accepts_upload_created(
            &state(AssetStatus::None, None, None),
            "u1",
            None
        ));

        // Replacement upload on a ready lesson.
        let mut current = state(AssetStatus::Ready, Some("a1"), Some(100));
        current.asset_upload_id = Some("u1");
        assert!(accepts_upload_created(&current, "u2", Some(ts(150))));

        // Late redelivery for the upload behind the current asset.
        assert!(!accepts_upload_created(&current, "u1", None));
        current.status = AssetStatus::Processing;
        assert!(!accepts_upload_created(&current, "u1", None));
    }

    #[test]
    fn upload_created_respects_event_order() {
        let current = state(AssetStatus::Errored, Some("a1"), Some(100));
        assert!(!accepts_upload_created(&current, "u2", Some(ts(50))));
    }

    #[test]
    fn asset_created_replaces_settled_asset() {
        let current = state(AssetStatus::Ready, Some("a1"), Some(100));
        assert!(accepts_asset_created(&current, "a2", Some(ts(200))));
    }

    #[test]
    fn asset_created_redelivery_does_not_regress() {
        let current = state(AssetStatus::Ready, Some("a2"), None);
        assert!(!accepts_asset_created(&current, "a2", None));

        let current = state(AssetStatus::Processing, Some("a2"), None);
        assert!(accepts_asset_created(&current, "a2", None));
    }

    #[test]
    fn stale_events_are_rejected() {
        let current = state(AssetStatus::Ready, Some("a1"), Some(200));
        assert!(!accepts_asset_settled(&current, Some(ts(100))));
        assert!(!accepts_asset_created(&current, "a9", Some(ts(100))));
        assert!(accepts_asset_settled(&current, Some(ts(300))));
    }

    #[test]
    fn upload_failure_only_while_uploading() {
        assert!(accepts_upload_failed(
            &state(AssetStatus::Uploading, None, None),
            None
        ));
        assert!(!accepts_upload_failed(
            &state(AssetStatus::Processing, Some("a1"), None),
            None
        ));
    }

    #[test]
    fn superseded_asset_ignores_same_id() {
        assert_eq!(superseded_asset(Some("a1"), "a2"), Some("a1"));
        assert_eq!(superseded_asset(Some("a2"), "a2"), None);
        assert_eq!(superseded_asset(None, "a2"), None);
    }
}
