//! Lesson queries

use crate::models::Lesson;
use crate::{Error, Result};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

const LESSON_COLUMNS: &str =
    "id, course_id, title, video_url, content, position, created_at, updated_at";

/// Values for creating or fully replacing a lesson
#[derive(Debug, Clone)]
pub struct LessonInput {
    pub course_id: i64,
    pub title: String,
    pub video_url: String,
    pub content: String,
    pub position: i64,
}

/// Editable lesson fields
#[derive(Debug, Clone)]
pub struct LessonChanges {
    pub title: String,
    pub video_url: String,
    pub content: String,
    pub position: i64,
}

fn position_conflict(e: sqlx::Error, input: &LessonInput) -> Error {
    match e.as_database_error() {
        Some(db_err) if db_err.is_foreign_key_violation() => {
            Error::NotFound("Course not found".to_string())
        }
        _ => Error::from_unique(
            e,
            format!(
                "Course {} already has a lesson at position {}",
                input.course_id, input.position
            ),
        ),
    }
}

pub async fn create_lesson(
    tx: &mut Transaction<'_, Sqlite>,
    input: &LessonInput,
) -> Result<Lesson> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO lessons (course_id, title, video_url, content, position, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
        LESSON_COLUMNS
    );

    sqlx::query_as::<_, Lesson>(&sql)
        .bind(input.course_id)
        .bind(&input.title)
        .bind(&input.video_url)
        .bind(&input.content)
        .bind(input.position)
        .bind(now)
        .bind(now)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| position_conflict(e, input))
}

pub async fn get_lesson(pool: &SqlitePool, id: i64) -> Result<Option<Lesson>> {
    let sql = format!("SELECT {} FROM lessons WHERE id = ?", LESSON_COLUMNS);
    let lesson = sqlx::query_as::<_, Lesson>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(lesson)
}

/// Whether `lesson_id` exists and belongs to `course_id`
pub async fn lesson_in_course(pool: &SqlitePool, course_id: i64, lesson_id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM lessons WHERE id = ? AND course_id = ?)",
    )
    .bind(lesson_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Lessons of a course in ordinal order
pub async fn list_course_lessons(pool: &SqlitePool, course_id: i64) -> Result<Vec<Lesson>> {
    let sql = format!(
        "SELECT {} FROM lessons WHERE course_id = ? ORDER BY position, id",
        LESSON_COLUMNS
    );
    let lessons = sqlx::query_as::<_, Lesson>(&sql)
        .bind(course_id)
        .fetch_all(pool)
        .await?;

    Ok(lessons)
}

pub async fn list_lessons(pool: &SqlitePool) -> Result<Vec<Lesson>> {
    let sql = format!(
        "SELECT {} FROM lessons ORDER BY course_id, position, id",
        LESSON_COLUMNS
    );
    let lessons = sqlx::query_as::<_, Lesson>(&sql).fetch_all(pool).await?;

    Ok(lessons)
}

/// Replace a lesson's editable fields; the lesson stays in its course
pub async fn update_lesson(pool: &SqlitePool, id: i64, changes: &LessonChanges) -> Result<Lesson> {
    let sql = format!(
        "UPDATE lessons SET title = ?, video_url = ?, content = ?, position = ?, updated_at = ? \
         WHERE id = ? RETURNING {}",
        LESSON_COLUMNS
    );

    sqlx::query_as::<_, Lesson>(&sql)
        .bind(&changes.title)
        .bind(&changes.video_url)
        .bind(&changes.content)
        .bind(changes.position)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            Error::from_unique(
                e,
                format!("Another lesson in this course is already at position {}", changes.position),
            )
        })?
        .ok_or_else(|| Error::NotFound("Lesson not found".to_string()))
}

/// Delete a lesson; returns the course it belonged to, if it existed
pub async fn delete_lesson(tx: &mut Transaction<'_, Sqlite>, id: i64) -> Result<Option<i64>> {
    let course_id: Option<i64> =
        sqlx::query_scalar("DELETE FROM lessons WHERE id = ? RETURNING course_id")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

    Ok(course_id)
}
