//! Course section entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use academy_core::types::{DbId, Timestamp};

/// A row from the `course_sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Section {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub ordem: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a section. `course_id` comes from the request path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSection {
    pub title: String,
    /// Defaults to `0` when omitted.
    pub ordem: Option<i32>,
}
