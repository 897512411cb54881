//! Creative work models and DTOs.
//!
//! A creative work is the durable record of a generated artifact (image,
//! audio, video or text) owned by a user.

use serde::Serialize;
use sqlx::FromRow;
use studio_core::types::{DbId, Timestamp};

/// Content type stored for generated images.
pub const CONTENT_TYPE_IMAGE: &str = "image";

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `creative_works` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreativeWork {
    pub id: DbId,
    pub creator_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub content_type: String,
    pub media_url: String,
    pub source_task_id: Option<String>,
    pub is_public: bool,
    pub is_featured: bool,
    pub view_count: i32,
    pub like_count: i32,
    pub comment_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a creative work. Counters always start at zero.
#[derive(Debug, Clone)]
pub struct CreateCreativeWork {
    pub creator_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub content_type: String,
    pub media_url: String,
    pub source_task_id: Option<String>,
    pub is_public: bool,
    pub is_featured: bool,
}
