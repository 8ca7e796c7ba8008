//! Atomic drag-and-drop reorder of sibling sections or lessons.

use academy_core::reorder::{ReorderBatch, ReorderCollection};
use sqlx::PgPool;

/// Applies reorder batches inside a single transaction.
pub struct ReorderRepo;

impl ReorderRepo {
    /// Write every `(id, ordem)` pair of `batch`, all or nothing.
    ///
    /// Values are written through as given: no contiguity or uniqueness
    /// check. Ids not in the batch are untouched. If any id matches no row
    /// the transaction is rolled back and [`sqlx::Error::RowNotFound`] is
    /// returned. Returns the number of rows updated.
    pub async fn apply(pool: &PgPool, batch: &ReorderBatch) -> Result<u64, sqlx::Error> {
        let query = match batch.collection {
            ReorderCollection::Sections => "UPDATE course_sections SET ordem = $2 WHERE id = $1",
            ReorderCollection::Lessons => "UPDATE lessons SET ordem = $2 WHERE id = $1",
        };

        let mut tx = pool.begin().await?;
        let mut updated = 0;

        for item in &batch.items {
            let result = sqlx::query(query)
                .bind(item.id)
                .bind(item.ordem)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                tracing::warn!(
                    entity = batch.collection.entity_name(),
                    id = %item.id,
                    "Reorder references a missing row, rolling back batch",
                );
                // Dropping `tx` without commit rolls back earlier updates.
                return Err(sqlx::Error::RowNotFound);
            }
            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }
}
