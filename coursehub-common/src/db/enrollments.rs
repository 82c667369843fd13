//! Enrollment registry queries

use crate::models::{Course, UserSummary};
use crate::Result;
use chrono::Utc;
use sqlx::SqlitePool;

/// Get-or-create the enrollment row for (user, course)
///
/// Returns true if a new row was inserted. The UNIQUE(user_id, course_id)
/// constraint makes concurrent first-time enrollment safe.
pub async fn enroll(pool: &SqlitePool, user_id: i64, course_id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO enrollments (user_id, course_id, enrolled_at)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, course_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_enrolled(pool: &SqlitePool, user_id: i64, course_id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = ? AND course_id = ?)",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Courses the user is enrolled in, in enrollment order
pub async fn enrolled_courses(pool: &SqlitePool, user_id: i64) -> Result<Vec<Course>> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT c.id, c.title, c.description, c.instructor_id, u.username AS instructor_username,
               c.price, c.access_type, c.created_at, c.updated_at
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        JOIN users u ON u.id = c.instructor_id
        WHERE e.user_id = ?
        ORDER BY e.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

/// Identity summaries of every user enrolled in a course
pub async fn enrolled_users(pool: &SqlitePool, course_id: i64) -> Result<Vec<UserSummary>> {
    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT u.id, u.username, u.email
        FROM enrollments e
        JOIN users u ON u.id = e.user_id
        WHERE e.course_id = ?
        ORDER BY e.id
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
