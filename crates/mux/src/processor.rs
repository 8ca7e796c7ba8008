//! Provider event processing.
//!
//! [`reconcile`] maps a verified, parsed webhook onto the lesson it
//! correlates with via the `LessonRepo::apply_*` transitions. After an
//! "asset ready" transition commits, [`reap_superseded`] deletes the assets
//! the lesson no longer references.

use academy_core::asset::{round_duration_secs, select_playback_id};
use academy_core::types::DbId;
use academy_db::models::lesson::{AssetReady, Transition};
use academy_db::repositories::LessonRepo;
use sqlx::PgPool;

use crate::api::MuxApiError;
use crate::messages::{AssetData, MuxEvent, WebhookEvent};
use crate::provider::VideoProvider;

/// Failures that should make the provider redeliver the event.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Video provider error: {0}")]
    Provider(#[from] MuxApiError),
}

/// What a single event did to the lesson store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A lesson was updated.
    Applied,
    /// A lesson matched but the event was stale or redundant.
    Ignored,
    /// No lesson carries the event's correlation id.
    NoMatch,
    /// The event kind is not one the service acts on.
    Unhandled,
}

impl<T> From<&Transition<T>> for ReconcileOutcome {
    fn from(transition: &Transition<T>) -> Self {
        match transition {
            Transition::Applied(_) => ReconcileOutcome::Applied,
            Transition::Ignored => ReconcileOutcome::Ignored,
            Transition::NoMatch => ReconcileOutcome::NoMatch,
        }
    }
}

/// Apply one provider event.
///
/// Events that match no lesson are a successful no-op. A successful "asset
/// ready" transition triggers deletion of superseded assets; those deletions
/// never fail the call.
pub async fn reconcile(
    pool: &PgPool,
    provider: &dyn VideoProvider,
    webhook: &WebhookEvent,
) -> Result<ReconcileOutcome, ReconcileError> {
    let event_at = webhook.created_at;

    let outcome = match &webhook.event {
        MuxEvent::UploadCreated(data) => {
            let result = LessonRepo::apply_upload_created(pool, &data.id, event_at).await?;
            if let Transition::Applied(lesson) = &result {
                tracing::info!(lesson_id = %lesson.id, upload_id = %data.id, "Lesson upload started");
            }
            ReconcileOutcome::from(&result)
        }
        MuxEvent::UploadAssetCreated(data) => {
            let result =
                LessonRepo::apply_asset_created(pool, &data.id, &data.asset_id, event_at).await?;
            if let Transition::Applied(lesson) = &result {
                tracing::info!(
                    lesson_id = %lesson.id,
                    upload_id = %data.id,
                    asset_id = %data.asset_id,
                    "Lesson asset processing",
                );
            }
            ReconcileOutcome::from(&result)
        }
        MuxEvent::UploadErrored(data) | MuxEvent::UploadCancelled(data) => {
            let result = LessonRepo::apply_upload_failed(pool, &data.id, event_at).await?;
            if let Transition::Applied(lesson) = &result {
                tracing::warn!(
                    lesson_id = %lesson.id,
                    upload_id = %data.id,
                    kind = webhook.event.kind(),
                    "Lesson upload failed",
                );
            }
            ReconcileOutcome::from(&result)
        }
        MuxEvent::AssetReady(data) => handle_asset_ready(pool, provider, data, webhook).await?,
        MuxEvent::AssetErrored(data) => {
            let result = LessonRepo::apply_asset_errored(pool, &data.id, event_at).await?;
            if let Transition::Applied(lesson) = &result {
                tracing::warn!(lesson_id = %lesson.id, asset_id = %data.id, "Lesson asset errored");
            }
            ReconcileOutcome::from(&result)
        }
        MuxEvent::Unhandled(kind) => {
            tracing::debug!(kind = %kind, "Ignoring unhandled video webhook");
            ReconcileOutcome::Unhandled
        }
    };

    if matches!(outcome, ReconcileOutcome::NoMatch) {
        tracing::debug!(kind = webhook.event.kind(), "Video webhook matched no lesson");
    } else if matches!(outcome, ReconcileOutcome::Ignored) {
        tracing::debug!(kind = webhook.event.kind(), "Video webhook ignored as stale");
    }

    Ok(outcome)
}

async fn handle_asset_ready(
    pool: &PgPool,
    provider: &dyn VideoProvider,
    data: &AssetData,
    webhook: &WebhookEvent,
) -> Result<ReconcileOutcome, ReconcileError> {
    // Avoid a provider round trip for assets no lesson references.
    if LessonRepo::find_by_asset_id(pool, &data.id).await?.is_none() {
        return Ok(ReconcileOutcome::NoMatch);
    }

    let fetched;
    let playback_ids = if data.playback_ids.is_empty() {
        fetched = provider.retrieve_asset(&data.id).await?;
        &fetched.playback_ids
    } else {
        &data.playback_ids
    };

    let ready = AssetReady {
        asset_id: &data.id,
        playback_id: select_playback_id(playback_ids),
        duration_seconds: round_duration_secs(data.duration),
        event_at: webhook.created_at,
    };

    let result = LessonRepo::apply_asset_ready(pool, &ready).await?;
    if let Transition::Applied(outcome) = &result {
        tracing::info!(
            lesson_id = %outcome.lesson.id,
            asset_id = %data.id,
            playback_id = ?ready.playback_id,
            duration_seconds = ?ready.duration_seconds,
            superseded = outcome.superseded_asset_ids.len(),
            "Lesson asset ready",
        );
        reap_superseded(provider, outcome.lesson.id, &outcome.superseded_asset_ids).await;
    }
    Ok(ReconcileOutcome::from(&result))
}

/// Delete assets a lesson no longer references.
///
/// Each id is attempted once. Failures are logged and swallowed: the lesson
/// is already in its new state and an orphaned asset only costs storage.
/// Returns the number of successful deletions.
pub async fn reap_superseded(
    provider: &dyn VideoProvider,
    lesson_id: DbId,
    asset_ids: &[String],
) -> usize {
    let mut deleted = 0;
    for asset_id in asset_ids {
        match provider.delete_asset(asset_id).await {
            Ok(()) => {
                deleted += 1;
                tracing::info!(%lesson_id, asset_id = %asset_id, "Deleted superseded asset");
            }
            Err(e) => {
                tracing::warn!(
                    %lesson_id,
                    asset_id = %asset_id,
                    error = %e,
                    "Failed to delete superseded asset",
                );
            }
        }
    }
    deleted
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::provider::{AssetInfo, UploadSession};

    /// Records delete calls; ids listed in `failing` return an API error.
    struct RecordingProvider {
        deleted: Mutex<Vec<String>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl VideoProvider for RecordingProvider {
        async fn create_upload(&self, _cors_origin: &str) -> Result<UploadSession, MuxApiError> {
            unreachable!("not used by the reaper")
        }

        async fn retrieve_asset(&self, _asset_id: &str) -> Result<AssetInfo, MuxApiError> {
            unreachable!("not used by the reaper")
        }

        async fn delete_asset(&self, asset_id: &str) -> Result<(), MuxApiError> {
            self.deleted.lock().unwrap().push(asset_id.to_string());
            if self.failing.iter().any(|id| id == asset_id) {
                return Err(MuxApiError::ApiError {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn reaper_attempts_every_id_once() {
        let provider = RecordingProvider {
            deleted: Mutex::new(Vec::new()),
            failing: vec!["a-2".to_string()],
        };
        let ids = vec!["a-1".to_string(), "a-2".to_string(), "a-3".to_string()];

        let deleted = reap_superseded(&provider, DbId::nil(), &ids).await;

        assert_eq!(deleted, 2);
        assert_eq!(*provider.deleted.lock().unwrap(), ids);
    }

    #[tokio::test]
    async fn reaper_with_nothing_to_delete_makes_no_calls() {
        let provider = RecordingProvider {
            deleted: Mutex::new(Vec::new()),
            failing: Vec::new(),
        };

        assert_eq!(reap_superseded(&provider, DbId::nil(), &[]).await, 0);
        assert!(provider.deleted.lock().unwrap().is_empty());
    }

    #[test]
    fn outcome_from_transition() {
        assert_eq!(
            ReconcileOutcome::from(&Transition::Applied(())),
            ReconcileOutcome::Applied
        );
        assert_eq!(
            ReconcileOutcome::from(&Transition::<()>::Ignored),
            ReconcileOutcome::Ignored
        );
        assert_eq!(
            ReconcileOutcome::from(&Transition::<()>::NoMatch),
            ReconcileOutcome::NoMatch
        );
    }
}
