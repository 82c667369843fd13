//! Course catalog queries

use crate::models::{AccessType, Course};
use crate::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;

const COURSE_SELECT: &str = r#"
    SELECT c.id, c.title, c.description, c.instructor_id, u.username AS instructor_username,
           c.price, c.access_type, c.created_at, c.updated_at
    FROM courses c
    JOIN users u ON u.id = c.instructor_id
"#;

/// Values for creating or fully replacing a course
#[derive(Debug, Clone)]
pub struct CourseInput {
    pub title: String,
    pub description: String,
    pub instructor_id: i64,
    pub price: Option<f64>,
    pub access_type: AccessType,
}

/// A foreign-key failure on write means the instructor id is unknown
fn unknown_instructor(e: sqlx::Error, input: &CourseInput) -> Error {
    match e.as_database_error() {
        Some(db_err) if db_err.is_foreign_key_violation() => {
            Error::InvalidInput(format!("Instructor {} does not exist", input.instructor_id))
        }
        _ => Error::Database(e),
    }
}

pub async fn create_course(pool: &SqlitePool, input: &CourseInput) -> Result<Course> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO courses (title, description, instructor_id, price, access_type, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.instructor_id)
    .bind(input.price)
    .bind(input.access_type)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| unknown_instructor(e, input))?;

    get_course(pool, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Course {} vanished after insert", id)))
}

pub async fn get_course(pool: &SqlitePool, id: i64) -> Result<Option<Course>> {
    let sql = format!("{} WHERE c.id = ?", COURSE_SELECT);
    let course = sqlx::query_as::<_, Course>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(course)
}

pub async fn course_exists(pool: &SqlitePool, id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = ?)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>> {
    let sql = format!("{} ORDER BY c.id", COURSE_SELECT);
    let courses = sqlx::query_as::<_, Course>(&sql).fetch_all(pool).await?;

    Ok(courses)
}

pub async fn update_course(pool: &SqlitePool, id: i64, input: &CourseInput) -> Result<Course> {
    let result = sqlx::query(
        r#"
        UPDATE courses
        SET title = ?, description = ?, instructor_id = ?, price = ?, access_type = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.instructor_id)
    .bind(input.price)
    .bind(input.access_type)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| unknown_instructor(e, input))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Course not found".to_string()));
    }

    get_course(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound("Course not found".to_string()))
}

/// Delete a course; lessons, enrollments and progress cascade
pub async fn delete_course(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
