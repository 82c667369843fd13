//! Shared fixtures for coursehub-common integration tests

#![allow(dead_code)]

use coursehub_common::{catalog, db};
use coursehub_common::db::courses::CourseInput;
use coursehub_common::db::lessons::LessonInput;
use coursehub_common::models::{AccessType, Course, Lesson, User};
use coursehub_common::Role;
use sqlx::SqlitePool;

pub async fn memory_db() -> SqlitePool {
    db::init_memory_database()
        .await
        .expect("Failed to create in-memory database")
}

pub async fn user(pool: &SqlitePool, username: &str, role: Role) -> User {
    db::users::create_user(pool, username, &format!("{}@example.com", username), "x", role)
        .await
        .expect("Failed to create user")
}

pub async fn course(pool: &SqlitePool, instructor: &User, title: &str) -> Course {
    db::courses::create_course(
        pool,
        &CourseInput {
            title: title.to_string(),
            description: format!("About {}", title),
            instructor_id: instructor.id,
            price: None,
            access_type: AccessType::Free,
        },
    )
    .await
    .expect("Failed to create course")
}

pub async fn lesson(pool: &SqlitePool, course: &Course, position: i64) -> Lesson {
    catalog::add_lesson(
        pool,
        &LessonInput {
            course_id: course.id,
            title: format!("Lesson {}", position),
            video_url: format!("https://videos.example.com/{}/{}", course.id, position),
            content: String::new(),
            position,
        },
    )
    .await
    .expect("Failed to create lesson")
}

/// A course with `n` lessons at positions 1..=n
pub async fn course_with_lessons(
    pool: &SqlitePool,
    instructor: &User,
    title: &str,
    n: i64,
) -> (Course, Vec<Lesson>) {
    let course = course(pool, instructor, title).await;
    let mut lessons = Vec::new();
    for position in 1..=n {
        lessons.push(lesson(pool, &course, position).await);
    }
    (course, lessons)
}
