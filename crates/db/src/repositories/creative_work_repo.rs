//! Repository for the `creative_works` table.

use sqlx::PgPool;

use crate::models::creative_work::{CreateCreativeWork, CreativeWork};

/// Column list for `creative_works` queries.
const COLUMNS: &str = "\
    id, creator_id, title, description, content_type, media_url, source_task_id, \
    is_public, is_featured, view_count, like_count, comment_count, \
    created_at, updated_at";

/// Provides query operations for generated works.
pub struct CreativeWorkRepo;

impl CreativeWorkRepo {
    /// Insert a work, returning the stored row.
    ///
    /// A work is recorded once per source task: inserting the same
    /// `source_task_id` again returns the existing row unchanged.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCreativeWork,
    ) -> Result<CreativeWork, sqlx::Error> {
        let query = format!(
            "INSERT INTO creative_works \
                (creator_id, title, description, content_type, media_url, source_task_id, \
                 is_public, is_featured, view_count, like_count, comment_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 0, 0) \
             ON CONFLICT ON CONSTRAINT uq_creative_works_source_task_id \
             DO UPDATE SET source_task_id = EXCLUDED.source_task_id \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CreativeWork>(&query)
            .bind(input.creator_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.content_type)
            .bind(&input.media_url)
            .bind(&input.source_task_id)
            .bind(input.is_public)
            .bind(input.is_featured)
            .fetch_one(pool)
            .await
    }

    /// Find the work recorded for a gateway task, if any.
    pub async fn find_by_task_id(
        pool: &PgPool,
        task_id: &str,
    ) -> Result<Option<CreativeWork>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM creative_works WHERE source_task_id = $1");
        sqlx::query_as::<_, CreativeWork>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }
}
