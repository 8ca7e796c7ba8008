//! Repository for the `lessons` table and its superseded-asset bookkeeping.
//!
//! The `apply_*` methods are the only writers of a lesson's asset columns.
//! Each runs in its own transaction: the correlated row is locked, the
//! transition is checked against the row's current state, and the full
//! target state is written in one statement.

use academy_core::asset::{self, AssetState, AssetStatus};
use academy_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::lesson::{AssetReady, CreateLesson, Lesson, ReadyOutcome, Transition};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, section_id, title, description, ordem, external_upload_id, \
    external_asset_id, external_playback_id, asset_upload_id, asset_status, duration_seconds, \
    asset_event_at, created_at, updated_at";

/// Correlation columns a provider event can be matched on.
#[derive(Debug, Clone, Copy)]
enum Correlation {
    Upload,
    Asset,
}

impl Correlation {
    fn column(self) -> &'static str {
        match self {
            Correlation::Upload => "external_upload_id",
            Correlation::Asset => "external_asset_id",
        }
    }
}

/// Provides CRUD and reconciliation operations for lessons.
pub struct LessonRepo;

impl LessonRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Insert a new lesson under `section_id` with asset status `none`.
    pub async fn create(
        pool: &PgPool,
        section_id: DbId,
        input: &CreateLesson,
    ) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons (section_id, title, description, ordem)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(section_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.ordem)
            .fetch_one(pool)
            .await
    }

    /// Find a lesson by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the lesson currently attached to a provider asset.
    pub async fn find_by_asset_id(
        pool: &PgPool,
        asset_id: &str,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE external_asset_id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(asset_id)
            .fetch_optional(pool)
            .await
    }

    /// List a section's lessons in display order.
    pub async fn list_by_section(
        pool: &PgPool,
        section_id: DbId,
    ) -> Result<Vec<Lesson>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lessons
             WHERE section_id = $1
             ORDER BY ordem, created_at"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(section_id)
            .fetch_all(pool)
            .await
    }

    /// Attach a freshly created provider upload session to a lesson.
    ///
    /// This is the only asset-related column user-facing flows may write.
    /// Returns `None` if the lesson does not exist.
    pub async fn set_upload_id(
        pool: &PgPool,
        id: DbId,
        upload_id: &str,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!(
            "UPDATE lessons SET external_upload_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(upload_id)
            .fetch_optional(pool)
            .await
    }

    /// Asset ids retired from a lesson and still awaiting deletion.
    pub async fn list_superseded_assets(
        pool: &PgPool,
        lesson_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT asset_id FROM lesson_superseded_assets \
             WHERE lesson_id = $1 ORDER BY created_at, asset_id",
        )
        .bind(lesson_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // ── Provider event transitions ───────────────────────────────────

    /// Upload session created: the lesson moves to `uploading`.
    pub async fn apply_upload_created(
        pool: &PgPool,
        upload_id: &str,
        event_at: Option<Timestamp>,
    ) -> Result<Transition<Lesson>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = lock_lesson(&mut tx, Correlation::Upload, upload_id).await? else {
            return Ok(Transition::NoMatch);
        };
        if !asset::accepts_upload_created(&state_of(&current)?, upload_id, event_at) {
            return Ok(Transition::Ignored);
        }

        let lesson = write_status(&mut tx, current.id, AssetStatus::Uploading, event_at).await?;
        tx.commit().await?;
        Ok(Transition::Applied(lesson))
    }

    /// Asset created from an upload: attach the new asset, move to
    /// `processing`, and retire the previously attached asset (if any).
    pub async fn apply_asset_created(
        pool: &PgPool,
        upload_id: &str,
        asset_id: &str,
        event_at: Option<Timestamp>,
    ) -> Result<Transition<Lesson>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = lock_lesson(&mut tx, Correlation::Upload, upload_id).await? else {
            return Ok(Transition::NoMatch);
        };
        if !asset::accepts_asset_created(&state_of(&current)?, asset_id, event_at) {
            return Ok(Transition::Ignored);
        }

        if let Some(previous) =
            asset::superseded_asset(current.external_asset_id.as_deref(), asset_id)
        {
            sqlx::query(
                "INSERT INTO lesson_superseded_assets (lesson_id, asset_id) VALUES ($1, $2) \
                 ON CONFLICT ON CONSTRAINT uq_lesson_superseded_assets DO NOTHING",
            )
            .bind(current.id)
            .bind(previous)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "UPDATE lessons SET
                external_asset_id = $2,
                asset_upload_id = $3,
                asset_status = $4,
                asset_event_at = COALESCE($5, asset_event_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let lesson = sqlx::query_as::<_, Lesson>(&query)
            .bind(current.id)
            .bind(asset_id)
            .bind(upload_id)
            .bind(AssetStatus::Processing.as_str())
            .bind(event_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Transition::Applied(lesson))
    }

    /// Asset ready: publish playback, record duration, and capture (clearing)
    /// the superseded asset ids so the caller can delete them.
    ///
    /// The returned ids never include the newly ready asset.
    pub async fn apply_asset_ready(
        pool: &PgPool,
        ready: &AssetReady<'_>,
    ) -> Result<Transition<ReadyOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = lock_lesson(&mut tx, Correlation::Asset, ready.asset_id).await? else {
            return Ok(Transition::NoMatch);
        };
        if !asset::accepts_asset_settled(&state_of(&current)?, ready.event_at) {
            return Ok(Transition::Ignored);
        }

        let captured: Vec<(String,)> = sqlx::query_as(
            "DELETE FROM lesson_superseded_assets WHERE lesson_id = $1 RETURNING asset_id",
        )
        .bind(current.id)
        .fetch_all(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE lessons SET
                external_playback_id = $2,
                duration_seconds = $3,
                asset_status = $4,
                asset_event_at = COALESCE($5, asset_event_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let lesson = sqlx::query_as::<_, Lesson>(&query)
            .bind(current.id)
            .bind(ready.playback_id)
            .bind(ready.duration_seconds)
            .bind(AssetStatus::Ready.as_str())
            .bind(ready.event_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut superseded_asset_ids: Vec<String> = captured
            .into_iter()
            .map(|(id,)| id)
            .filter(|id| id != ready.asset_id)
            .collect();
        superseded_asset_ids.sort();

        Ok(Transition::Applied(ReadyOutcome {
            lesson,
            superseded_asset_ids,
        }))
    }

    /// Asset errored: the lesson moves to `errored`.
    pub async fn apply_asset_errored(
        pool: &PgPool,
        asset_id: &str,
        event_at: Option<Timestamp>,
    ) -> Result<Transition<Lesson>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = lock_lesson(&mut tx, Correlation::Asset, asset_id).await? else {
            return Ok(Transition::NoMatch);
        };
        if !asset::accepts_asset_settled(&state_of(&current)?, event_at) {
            return Ok(Transition::Ignored);
        }

        let lesson = write_status(&mut tx, current.id, AssetStatus::Errored, event_at).await?;
        tx.commit().await?;
        Ok(Transition::Applied(lesson))
    }

    /// Upload errored or cancelled before an asset was created.
    pub async fn apply_upload_failed(
        pool: &PgPool,
        upload_id: &str,
        event_at: Option<Timestamp>,
    ) -> Result<Transition<Lesson>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(current) = lock_lesson(&mut tx, Correlation::Upload, upload_id).await? else {
            return Ok(Transition::NoMatch);
        };
        if !asset::accepts_upload_failed(&state_of(&current)?, event_at) {
            return Ok(Transition::Ignored);
        }

        let lesson = write_status(&mut tx, current.id, AssetStatus::Errored, event_at).await?;
        tx.commit().await?;
        Ok(Transition::Applied(lesson))
    }
}

// ── private helpers ──────────────────────────────────────────────────

async fn lock_lesson(
    tx: &mut Transaction<'_, Postgres>,
    correlation: Correlation,
    value: &str,
) -> Result<Option<Lesson>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNS} FROM lessons WHERE {} = $1 FOR UPDATE",
        correlation.column()
    );
    sqlx::query_as::<_, Lesson>(&query)
        .bind(value)
        .fetch_optional(&mut **tx)
        .await
}

async fn write_status(
    tx: &mut Transaction<'_, Postgres>,
    id: DbId,
    status: AssetStatus,
    event_at: Option<Timestamp>,
) -> Result<Lesson, sqlx::Error> {
    let query = format!(
        "UPDATE lessons SET
            asset_status = $2,
            asset_event_at = COALESCE($3, asset_event_at)
         WHERE id = $1
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Lesson>(&query)
        .bind(id)
        .bind(status.as_str())
        .bind(event_at)
        .fetch_one(&mut **tx)
        .await
}

fn state_of(lesson: &Lesson) -> Result<AssetState<'_>, sqlx::Error> {
    let status = lesson
        .status()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(AssetState {
        status,
        asset_id: lesson.external_asset_id.as_deref(),
        asset_upload_id: lesson.asset_upload_id.as_deref(),
        last_event_at: lesson.asset_event_at,
    })
}
