//! Lesson changes that move a course's lesson count
//!
//! Adding or removing a lesson changes the denominator of every progress
//! record in the course, so both happen in one transaction with the re-score.

use crate::db::lessons::{self, LessonInput};
use crate::models::Lesson;
use crate::progress::rescore_course;
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Create a lesson and re-score the course's progress records
pub async fn add_lesson(pool: &SqlitePool, input: &LessonInput) -> Result<Lesson> {
    let mut tx = pool.begin().await?;
    let lesson = lessons::create_lesson(&mut tx, input).await?;
    rescore_course(&mut tx, lesson.course_id).await?;
    tx.commit().await?;

    info!(lesson_id = lesson.id, course_id = lesson.course_id, "Lesson created");
    Ok(lesson)
}

/// Delete a lesson and re-score its course; returns false if it did not exist
pub async fn remove_lesson(pool: &SqlitePool, lesson_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;
    let Some(course_id) = lessons::delete_lesson(&mut tx, lesson_id).await? else {
        return Ok(false);
    };
    rescore_course(&mut tx, course_id).await?;
    tx.commit().await?;

    info!(lesson_id, course_id, "Lesson deleted");
    Ok(true)
}
