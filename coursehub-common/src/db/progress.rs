//! Progress record storage
//!
//! The completed-lesson set lives in `progress_lessons`, one row per
//! (record, lesson). Functions taking `&mut SqliteConnection` are meant to run
//! inside the tracker's write transaction.

use crate::models::ProgressRecord;
use crate::Result;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

pub async fn get_progress(
    pool: &SqlitePool,
    user_id: i64,
    course_id: i64,
) -> Result<Option<ProgressRecord>> {
    let record = sqlx::query_as::<_, ProgressRecord>(
        r#"
        SELECT id, user_id, course_id, progress_percentage, completed, last_accessed
        FROM course_progress
        WHERE user_id = ? AND course_id = ?
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Get-or-create the record for (user, course) and touch `last_accessed`
///
/// This is a write, so issuing it first in a transaction takes the database
/// write lock before anything is read.
pub async fn upsert_progress(conn: &mut SqliteConnection, user_id: i64, course_id: i64) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO course_progress (user_id, course_id, last_accessed)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, course_id) DO UPDATE SET last_accessed = excluded.last_accessed
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// Add a lesson to the completed set (no-op if already present)
pub async fn add_completed_lesson(conn: &mut SqliteConnection, progress_id: i64, lesson_id: i64) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO progress_lessons (progress_id, lesson_id, completed_at) VALUES (?, ?, ?)",
    )
    .bind(progress_id)
    .bind(lesson_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Size of the completed set restricted to lessons of `course_id`
pub async fn completed_lesson_count<'c, E>(executor: E, progress_id: i64, course_id: i64) -> Result<i64>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM progress_lessons pl
        JOIN lessons l ON l.id = pl.lesson_id
        WHERE pl.progress_id = ? AND l.course_id = ?
        "#,
    )
    .bind(progress_id)
    .bind(course_id)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

pub async fn lesson_count(conn: &mut SqliteConnection, course_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

pub async fn store_percentage(
    conn: &mut SqliteConnection,
    progress_id: i64,
    percentage: f64,
    completed: bool,
) -> Result<()> {
    sqlx::query("UPDATE course_progress SET progress_percentage = ?, completed = ? WHERE id = ?")
        .bind(percentage)
        .bind(completed)
        .bind(progress_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Ids of every progress record for a course
pub async fn progress_ids_for_course(conn: &mut SqliteConnection, course_id: i64) -> Result<Vec<i64>> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM course_progress WHERE course_id = ? ORDER BY id")
        .bind(course_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(ids)
}
