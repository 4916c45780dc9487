//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `backtalk_test`)
//!   `TEST_DB_PASSWORD` (default: `backtalk_test`)
//!   `TEST_DB_NAME` (default: `backtalk_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use backtalk_db::entities::{
    comment::{self, CommentStatus},
    profile,
};
use backtalk_db::repositories::{CommentRepository, CommentVisibility, ProfileRepository};
use backtalk_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;
use std::sync::Arc;

fn profile_model(id: &str) -> profile::ActiveModel {
    profile::ActiveModel {
        id: Set(id.to_string()),
        username: Set(Some(id.to_string())),
        avatar_url: Set(None),
        is_moderator: Set(false),
        is_trusted: Set(false),
        is_banned: Set(false),
        suspended_until: Set(None),
        created_at: Set(chrono::Utc::now().into()),
    }
}

fn comment_model(id: &str, user_id: &str, parent_id: Option<&str>) -> comment::ActiveModel {
    comment::ActiveModel {
        id: Set(id.to_string()),
        post_id: Set("p1".to_string()),
        user_id: Set(user_id.to_string()),
        parent_id: Set(parent_id.map(ToString::to_string)),
        content: Set(format!("comment {id}")),
        mentions: Set(serde_json::json!([])),
        status: Set(CommentStatus::Approved),
        created_at: Set(chrono::Utc::now().into()),
    }
}

async fn migrated_db() -> TestDatabase {
    let db = TestDatabase::create_unique()
        .await
        .expect("Failed to create test database");
    backtalk_db::migrate(db.connection())
        .await
        .expect("Migrations failed");
    db
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_profile_round_trip() {
    let db = migrated_db().await;
    let repo = ProfileRepository::new(db.connection_arc());

    repo.create(profile_model("u1")).await.unwrap();

    let loaded = repo.get_by_id("u1").await.unwrap();
    assert_eq!(loaded.username.as_deref(), Some("u1"));
    assert!(!loaded.is_trusted);

    // Setting a flag twice is idempotent
    for _ in 0..2 {
        let mut model: profile::ActiveModel = repo.get_by_id("u1").await.unwrap().into();
        model.is_trusted = Set(true);
        let updated = repo.update(model).await.unwrap();
        assert!(updated.is_trusted);
    }

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_visibility_filters() {
    let db = migrated_db().await;
    let conn = db.connection_arc();
    let profiles = ProfileRepository::new(Arc::clone(&conn));
    let comments = CommentRepository::new(conn);

    profiles.create(profile_model("u1")).await.unwrap();
    profiles.create(profile_model("u2")).await.unwrap();

    comments.create(comment_model("a", "u1", None)).await.unwrap();
    let mut pending_own = comment_model("b", "u1", None);
    pending_own.status = Set(CommentStatus::Pending);
    comments.create(pending_own).await.unwrap();
    let mut pending_other = comment_model("c", "u2", None);
    pending_other.status = Set(CommentStatus::Pending);
    comments.create(pending_other).await.unwrap();
    let mut rejected = comment_model("d", "u2", None);
    rejected.status = Set(CommentStatus::Rejected);
    comments.create(rejected).await.unwrap();

    let anon = comments
        .count_for_post("p1", &CommentVisibility::Approved)
        .await
        .unwrap();
    assert_eq!(anon, 1);

    let own = comments
        .count_for_post(
            "p1",
            &CommentVisibility::ApprovedOrOwnPending {
                viewer_id: "u1".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(own, 2);

    let all = comments
        .count_for_post("p1", &CommentVisibility::All)
        .await
        .unwrap();
    assert_eq!(all, 4);

    assert_eq!(
        comments.count_by_status(CommentStatus::Pending).await.unwrap(),
        2
    );

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_delete_by_ids_removes_rows() {
    let db = migrated_db().await;
    let conn = db.connection_arc();
    let profiles = ProfileRepository::new(Arc::clone(&conn));
    let comments = CommentRepository::new(conn);

    profiles.create(profile_model("u1")).await.unwrap();
    comments.create(comment_model("root", "u1", None)).await.unwrap();
    comments
        .create(comment_model("reply", "u1", Some("root")))
        .await
        .unwrap();

    let deleted = comments
        .delete_by_ids(&["reply".to_string(), "root".to_string()])
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert!(comments.find_by_id("root").await.unwrap().is_none());

    db.drop_database().await.unwrap();
}
