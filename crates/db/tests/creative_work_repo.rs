//! Repository tests against a real PostgreSQL instance.
//!
//! `#[sqlx::test]` creates a fresh database per test from `DATABASE_URL`
//! and applies the migrations.

use sqlx::PgPool;
use studio_db::models::creative_work::{CreateCreativeWork, CONTENT_TYPE_IMAGE};
use studio_db::repositories::{CreativeWorkRepo, UserRepo};

fn new_work(creator_id: i64, task_id: &str) -> CreateCreativeWork {
    CreateCreativeWork {
        creator_id,
        title: "a red cat".to_string(),
        description: Some("a red cat".to_string()),
        content_type: CONTENT_TYPE_IMAGE.to_string(),
        media_url: "https://x/y.png".to_string(),
        source_task_id: Some(task_id.to_string()),
        is_public: true,
        is_featured: false,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn default_creator_is_seeded(pool: PgPool) {
    let id = UserRepo::find_id_by_username(&pool, "admin").await.unwrap();
    assert!(id.is_some());

    let missing = UserRepo::find_id_by_username(&pool, "nobody").await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn created_work_starts_with_zero_counters(pool: PgPool) {
    let admin = UserRepo::find_id_by_username(&pool, "admin")
        .await
        .unwrap()
        .unwrap();

    let work = CreativeWorkRepo::create(&pool, &new_work(admin, "abc123"))
        .await
        .unwrap();

    assert_eq!(work.creator_id, admin);
    assert_eq!(work.content_type, "image");
    assert_eq!(work.media_url, "https://x/y.png");
    assert!(work.is_public);
    assert!(!work.is_featured);
    assert_eq!((work.view_count, work.like_count, work.comment_count), (0, 0, 0));
}

#[sqlx::test(migrations = "./migrations")]
async fn same_task_is_recorded_once(pool: PgPool) {
    let admin = UserRepo::find_id_by_username(&pool, "admin")
        .await
        .unwrap()
        .unwrap();

    let first = CreativeWorkRepo::create(&pool, &new_work(admin, "abc123"))
        .await
        .unwrap();
    let second = CreativeWorkRepo::create(&pool, &new_work(admin, "abc123"))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let found = CreativeWorkRepo::find_by_task_id(&pool, "abc123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);
}
