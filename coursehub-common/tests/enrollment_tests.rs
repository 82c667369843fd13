//! Integration tests for the enrollment registry

mod helpers;

use coursehub_common::{db, Role};

#[tokio::test]
async fn test_enroll_twice_keeps_one_row() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let course = helpers::course(&pool, &admin, "Rust 101").await;

    assert!(db::enrollments::enroll(&pool, student.id, course.id).await.unwrap());
    assert!(!db::enrollments::enroll(&pool, student.id, course.id).await.unwrap());

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM enrollments WHERE user_id = ? AND course_id = ?",
    )
    .bind(student.id)
    .bind(course.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_is_enrolled_before_and_after() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let course = helpers::course(&pool, &admin, "Rust 101").await;

    assert!(!db::enrollments::is_enrolled(&pool, student.id, course.id).await.unwrap());
    db::enrollments::enroll(&pool, student.id, course.id).await.unwrap();
    assert!(db::enrollments::is_enrolled(&pool, student.id, course.id).await.unwrap());
}

#[tokio::test]
async fn test_enrolled_courses_projects_to_courses() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let first = helpers::course(&pool, &admin, "First").await;
    let _skipped = helpers::course(&pool, &admin, "Skipped").await;
    let third = helpers::course(&pool, &admin, "Third").await;

    db::enrollments::enroll(&pool, student.id, third.id).await.unwrap();
    db::enrollments::enroll(&pool, student.id, first.id).await.unwrap();

    let courses = db::enrollments::enrolled_courses(&pool, student.id).await.unwrap();
    let titles: Vec<_> = courses.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Third", "First"]);
    assert_eq!(courses[0].instructor_username, "admin");
}

#[tokio::test]
async fn test_enrolled_users_is_exact_set() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let alice = helpers::user(&pool, "alice", Role::Free).await;
    let bob = helpers::user(&pool, "bob", Role::Premium).await;
    let _carol = helpers::user(&pool, "carol", Role::Free).await;
    let course = helpers::course(&pool, &admin, "Rust 101").await;
    let other = helpers::course(&pool, &admin, "Other").await;

    db::enrollments::enroll(&pool, alice.id, course.id).await.unwrap();
    db::enrollments::enroll(&pool, bob.id, course.id).await.unwrap();
    db::enrollments::enroll(&pool, bob.id, other.id).await.unwrap();

    let users = db::enrollments::enrolled_users(&pool, course.id).await.unwrap();
    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert_eq!(users[0].email, "alice@example.com");
}

#[tokio::test]
async fn test_enroll_in_missing_course_fails_foreign_key() {
    let pool = helpers::memory_db().await;
    let student = helpers::user(&pool, "student", Role::Free).await;

    assert!(db::enrollments::enroll(&pool, student.id, 4242).await.is_err());
}
