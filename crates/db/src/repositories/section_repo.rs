//! Repository for the `course_sections` table.

use academy_core::types::DbId;
use sqlx::PgPool;

use crate::models::section::{CreateSection, Section};

const COLUMNS: &str = "id, course_id, title, ordem, created_at, updated_at";

/// Provides CRUD operations for course sections.
pub struct SectionRepo;

impl SectionRepo {
    /// Insert a new section under `course_id`.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateSection,
    ) -> Result<Section, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_sections (course_id, title, ordem)
             VALUES ($1, $2, COALESCE($3, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(course_id)
            .bind(&input.title)
            .bind(input.ordem)
            .fetch_one(pool)
            .await
    }

    /// Find a section by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_sections WHERE id = $1");
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a course's sections in display order.
    ///
    /// `ordem` is not unique, so ties fall back to creation order.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_sections
             WHERE course_id = $1
             ORDER BY ordem, created_at"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }
}
