//! Tests for database initialization

use coursehub_common::db::{init_database, SCHEMA_VERSION};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("coursehub.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("coursehub.db");

    let pool1 = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('keep', '', 'x')")
        .execute(&pool1)
        .await
        .unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'keep'")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1, "Existing data must survive re-initialization");
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("coursehub.db")).await.unwrap();

    for table in [
        "users",
        "sessions",
        "courses",
        "lessons",
        "enrollments",
        "course_progress",
        "progress_lessons",
        "forum_threads",
        "forum_replies",
        "blog_posts",
        "ai_projects",
        "comments",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "Missing table {}", table);
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_foreign_keys_enforced_on_every_connection() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("coursehub.db")).await.unwrap();

    // Hold several connections so the insert below may land on any of them
    let mut held = Vec::new();
    for _ in 0..3 {
        held.push(pool.acquire().await.unwrap());
    }
    for conn in held.iter_mut() {
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
