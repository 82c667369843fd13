//! Forum, blog, AI project and comment queries

use crate::models::{AiProject, BlogPost, Comment, CommentTarget, ForumReply, ForumThread};
use crate::{Error, Result};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

fn missing_parent(e: sqlx::Error, what: &str) -> Error {
    match e.as_database_error() {
        Some(db_err) if db_err.is_foreign_key_violation() => Error::NotFound(format!("{} not found", what)),
        _ => Error::Database(e),
    }
}

// ========================================
// Forum threads
// ========================================

const THREAD_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

pub async fn create_thread(pool: &SqlitePool, user_id: i64, title: &str, content: &str) -> Result<ForumThread> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO forum_threads (user_id, title, content, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING {}",
        THREAD_COLUMNS
    );
    let thread = sqlx::query_as::<_, ForumThread>(&sql)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    Ok(thread)
}

pub async fn get_thread(pool: &SqlitePool, id: i64) -> Result<Option<ForumThread>> {
    let sql = format!("SELECT {} FROM forum_threads WHERE id = ?", THREAD_COLUMNS);
    Ok(sqlx::query_as::<_, ForumThread>(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn list_threads(pool: &SqlitePool) -> Result<Vec<ForumThread>> {
    let sql = format!("SELECT {} FROM forum_threads ORDER BY id DESC", THREAD_COLUMNS);
    Ok(sqlx::query_as::<_, ForumThread>(&sql).fetch_all(pool).await?)
}

pub async fn update_thread(pool: &SqlitePool, id: i64, title: &str, content: &str) -> Result<ForumThread> {
    let sql = format!(
        "UPDATE forum_threads SET title = ?, content = ?, updated_at = ? WHERE id = ? RETURNING {}",
        THREAD_COLUMNS
    );
    sqlx::query_as::<_, ForumThread>(&sql)
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Thread not found".to_string()))
}

pub async fn delete_thread(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM forum_threads WHERE id = ?").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

// ========================================
// Forum replies
// ========================================

const REPLY_COLUMNS: &str = "id, thread_id, user_id, content, created_at, updated_at";

pub async fn create_reply(pool: &SqlitePool, thread_id: i64, user_id: i64, content: &str) -> Result<ForumReply> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO forum_replies (thread_id, user_id, content, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING {}",
        REPLY_COLUMNS
    );
    sqlx::query_as::<_, ForumReply>(&sql)
        .bind(thread_id)
        .bind(user_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| missing_parent(e, "Thread"))
}

pub async fn get_reply(pool: &SqlitePool, id: i64) -> Result<Option<ForumReply>> {
    let sql = format!("SELECT {} FROM forum_replies WHERE id = ?", REPLY_COLUMNS);
    Ok(sqlx::query_as::<_, ForumReply>(&sql).bind(id).fetch_optional(pool).await?)
}

/// Replies, optionally restricted to one thread, oldest first
pub async fn list_replies(pool: &SqlitePool, thread_id: Option<i64>) -> Result<Vec<ForumReply>> {
    let sql = format!(
        "SELECT {} FROM forum_replies WHERE (?1 IS NULL OR thread_id = ?1) ORDER BY id",
        REPLY_COLUMNS
    );
    Ok(sqlx::query_as::<_, ForumReply>(&sql).bind(thread_id).fetch_all(pool).await?)
}

pub async fn update_reply(pool: &SqlitePool, id: i64, content: &str) -> Result<ForumReply> {
    let sql = format!(
        "UPDATE forum_replies SET content = ?, updated_at = ? WHERE id = ? RETURNING {}",
        REPLY_COLUMNS
    );
    sqlx::query_as::<_, ForumReply>(&sql)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Reply not found".to_string()))
}

pub async fn delete_reply(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM forum_replies WHERE id = ?").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

// ========================================
// Blog posts
// ========================================

const POST_COLUMNS: &str = "id, author_id, title, content, tags, created_at, updated_at";

pub async fn create_post(
    pool: &SqlitePool,
    author_id: i64,
    title: &str,
    content: &str,
    tags: &[String],
) -> Result<BlogPost> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO blog_posts (author_id, title, content, tags, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        POST_COLUMNS
    );
    let post = sqlx::query_as::<_, BlogPost>(&sql)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(Json(tags))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    Ok(post)
}

pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<BlogPost>> {
    let sql = format!("SELECT {} FROM blog_posts WHERE id = ?", POST_COLUMNS);
    Ok(sqlx::query_as::<_, BlogPost>(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn list_posts(pool: &SqlitePool) -> Result<Vec<BlogPost>> {
    let sql = format!("SELECT {} FROM blog_posts ORDER BY id DESC", POST_COLUMNS);
    Ok(sqlx::query_as::<_, BlogPost>(&sql).fetch_all(pool).await?)
}

pub async fn update_post(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    content: &str,
    tags: &[String],
) -> Result<BlogPost> {
    let sql = format!(
        "UPDATE blog_posts SET title = ?, content = ?, tags = ?, updated_at = ? WHERE id = ? RETURNING {}",
        POST_COLUMNS
    );
    sqlx::query_as::<_, BlogPost>(&sql)
        .bind(title)
        .bind(content)
        .bind(Json(tags))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Blog post not found".to_string()))
}

pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

// ========================================
// AI projects
// ========================================

const PROJECT_COLUMNS: &str = "id, user_id, title, description, github_repo_url, created_at, updated_at";

pub async fn create_project(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
    description: &str,
    github_repo_url: &str,
) -> Result<AiProject> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO ai_projects (user_id, title, description, github_repo_url, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        PROJECT_COLUMNS
    );
    let project = sqlx::query_as::<_, AiProject>(&sql)
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(github_repo_url)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    Ok(project)
}

pub async fn get_project(pool: &SqlitePool, id: i64) -> Result<Option<AiProject>> {
    let sql = format!("SELECT {} FROM ai_projects WHERE id = ?", PROJECT_COLUMNS);
    Ok(sqlx::query_as::<_, AiProject>(&sql).bind(id).fetch_optional(pool).await?)
}

pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<AiProject>> {
    let sql = format!("SELECT {} FROM ai_projects ORDER BY id DESC", PROJECT_COLUMNS);
    Ok(sqlx::query_as::<_, AiProject>(&sql).fetch_all(pool).await?)
}

pub async fn update_project(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    description: &str,
    github_repo_url: &str,
) -> Result<AiProject> {
    let sql = format!(
        "UPDATE ai_projects SET title = ?, description = ?, github_repo_url = ?, updated_at = ? \
         WHERE id = ? RETURNING {}",
        PROJECT_COLUMNS
    );
    sqlx::query_as::<_, AiProject>(&sql)
        .bind(title)
        .bind(description)
        .bind(github_repo_url)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))
}

pub async fn delete_project(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM ai_projects WHERE id = ?").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

// ========================================
// Comments
// ========================================

const COMMENT_COLUMNS: &str = "id, user_id, content_type, object_id, content, created_at, updated_at";

pub async fn create_comment(
    pool: &SqlitePool,
    user_id: i64,
    content_type: CommentTarget,
    object_id: i64,
    content: &str,
) -> Result<Comment> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO comments (user_id, content_type, object_id, content, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        COMMENT_COLUMNS
    );
    let comment = sqlx::query_as::<_, Comment>(&sql)
        .bind(user_id)
        .bind(content_type)
        .bind(object_id)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

    Ok(comment)
}

pub async fn get_comment(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let sql = format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS);
    Ok(sqlx::query_as::<_, Comment>(&sql).bind(id).fetch_optional(pool).await?)
}

/// Comments, optionally filtered by target kind and id, oldest first
pub async fn list_comments(
    pool: &SqlitePool,
    content_type: Option<CommentTarget>,
    object_id: Option<i64>,
) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT {} FROM comments \
         WHERE (?1 IS NULL OR content_type = ?1) AND (?2 IS NULL OR object_id = ?2) \
         ORDER BY id",
        COMMENT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Comment>(&sql)
        .bind(content_type)
        .bind(object_id)
        .fetch_all(pool)
        .await?)
}

pub async fn update_comment(pool: &SqlitePool, id: i64, content: &str) -> Result<Comment> {
    let sql = format!(
        "UPDATE comments SET content = ?, updated_at = ? WHERE id = ? RETURNING {}",
        COMMENT_COLUMNS
    );
    sqlx::query_as::<_, Comment>(&sql)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Comment not found".to_string()))
}

pub async fn delete_comment(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
