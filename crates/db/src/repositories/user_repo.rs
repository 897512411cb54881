//! Repository for the `users` table.

use sqlx::PgPool;
use studio_core::types::DbId;

/// Lookups used to resolve the owner of generated content.
pub struct UserRepo;

impl UserRepo {
    /// Resolve a username to its row ID.
    pub async fn find_id_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }
}
