//! Integration tests for course progress tracking
//!
//! Tests cover:
//! - Percentage and completion after marking lessons
//! - Idempotent re-marking
//! - Rejection of lessons from another course
//! - Default "not started" answer
//! - Re-scoring when lessons are added or removed
//! - Concurrent completions against a file-backed database

mod helpers;

use coursehub_common::progress::{compute_percentage, ProgressTracker};
use coursehub_common::{catalog, db, Error, Role};
use std::sync::Arc;

// =============================================================================
// Marking lessons complete
// =============================================================================

#[tokio::test]
async fn test_four_lesson_walkthrough() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course, lessons) = helpers::course_with_lessons(&pool, &admin, "Rust 101", 4).await;
    let tracker = ProgressTracker::new(pool.clone());

    db::enrollments::enroll(&pool, student.id, course.id).await.unwrap();

    tracker.mark_lesson_complete(student.id, course.id, lessons[0].id).await.unwrap();
    let snapshot = tracker
        .mark_lesson_complete(student.id, course.id, lessons[1].id)
        .await
        .unwrap();
    assert_eq!(snapshot.progress, 50.0);
    assert!(!snapshot.completed);
    assert_eq!(snapshot.completed_lessons, 2);

    let snapshot = tracker
        .mark_lesson_complete(student.id, course.id, lessons[2].id)
        .await
        .unwrap();
    assert_eq!(snapshot.progress, 75.0);
    assert!(!snapshot.completed);

    let snapshot = tracker
        .mark_lesson_complete(student.id, course.id, lessons[3].id)
        .await
        .unwrap();
    assert_eq!(snapshot.progress, 100.0);
    assert!(snapshot.completed);

    // Re-marking an already completed lesson changes nothing
    let snapshot = tracker
        .mark_lesson_complete(student.id, course.id, lessons[0].id)
        .await
        .unwrap();
    assert_eq!(snapshot.progress, 100.0);
    assert!(snapshot.completed);
    assert_eq!(snapshot.completed_lessons, 4);

    let stored = tracker.get_progress(student.id, course.id).await.unwrap();
    assert_eq!(stored.progress, 100.0);
    assert!(stored.completed);
    assert!(stored.started);
}

#[tokio::test]
async fn test_remarking_is_idempotent() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course, lessons) = helpers::course_with_lessons(&pool, &admin, "Three", 3).await;
    let tracker = ProgressTracker::new(pool.clone());

    let once = tracker
        .mark_lesson_complete(student.id, course.id, lessons[1].id)
        .await
        .unwrap();
    let twice = tracker
        .mark_lesson_complete(student.id, course.id, lessons[1].id)
        .await
        .unwrap();

    assert_eq!(once.progress, 33.33);
    assert_eq!(twice.progress, once.progress);
    assert_eq!(twice.completed_lessons, 1);
}

#[tokio::test]
async fn test_percentage_matches_formula_for_every_subset_size() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let (course, lessons) = helpers::course_with_lessons(&pool, &admin, "Seven", 7).await;
    let tracker = ProgressTracker::new(pool.clone());

    for done in 1..=lessons.len() {
        let student = helpers::user(&pool, &format!("student{}", done), Role::Free).await;
        let mut last = None;
        for lesson in &lessons[..done] {
            last = Some(
                tracker
                    .mark_lesson_complete(student.id, course.id, lesson.id)
                    .await
                    .unwrap(),
            );
        }
        let snapshot = last.unwrap();
        assert_eq!(snapshot.progress, compute_percentage(done as i64, 7));
        assert_eq!(snapshot.completed, done == lessons.len());
    }
}

#[tokio::test]
async fn test_lesson_from_other_course_is_rejected() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course_a, _) = helpers::course_with_lessons(&pool, &admin, "A", 2).await;
    let (_course_b, lessons_b) = helpers::course_with_lessons(&pool, &admin, "B", 2).await;
    let tracker = ProgressTracker::new(pool.clone());

    let err = tracker
        .mark_lesson_complete(student.id, course_a.id, lessons_b[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(ref msg) if msg.contains("Lesson")));

    // No record was created for course A
    assert!(db::progress::get_progress(&pool, student.id, course_a.id)
        .await
        .unwrap()
        .is_none());
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_progress")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn test_wrong_course_does_not_touch_existing_record() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course_a, lessons_a) = helpers::course_with_lessons(&pool, &admin, "A", 4).await;
    let (_course_b, lessons_b) = helpers::course_with_lessons(&pool, &admin, "B", 1).await;
    let tracker = ProgressTracker::new(pool.clone());

    tracker
        .mark_lesson_complete(student.id, course_a.id, lessons_a[0].id)
        .await
        .unwrap();
    let before = tracker.get_progress(student.id, course_a.id).await.unwrap();

    assert!(tracker
        .mark_lesson_complete(student.id, course_a.id, lessons_b[0].id)
        .await
        .is_err());

    let after = tracker.get_progress(student.id, course_a.id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_missing_course_and_lesson() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course, _) = helpers::course_with_lessons(&pool, &admin, "A", 1).await;
    let tracker = ProgressTracker::new(pool.clone());

    let err = tracker.mark_lesson_complete(student.id, 9999, 1).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(ref msg) if msg == "Course not found"));

    let err = tracker
        .mark_lesson_complete(student.id, course.id, 9999)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

// =============================================================================
// Reading progress
// =============================================================================

#[tokio::test]
async fn test_unstarted_progress_is_default() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    // Course with zero lessons
    let course = helpers::course(&pool, &admin, "Empty").await;
    let tracker = ProgressTracker::new(pool.clone());

    let snapshot = tracker.get_progress(student.id, course.id).await.unwrap();
    assert_eq!(snapshot.progress, 0.0);
    assert!(!snapshot.started);
    assert!(!snapshot.completed);
    assert_eq!(snapshot.completed_lessons, 0);
    assert!(snapshot.last_accessed.is_none());
}

#[tokio::test]
async fn test_progress_is_per_user() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let alice = helpers::user(&pool, "alice", Role::Free).await;
    let bob = helpers::user(&pool, "bob", Role::Premium).await;
    let (course, lessons) = helpers::course_with_lessons(&pool, &admin, "Shared", 2).await;
    let tracker = ProgressTracker::new(pool.clone());

    tracker
        .mark_lesson_complete(alice.id, course.id, lessons[0].id)
        .await
        .unwrap();

    assert_eq!(tracker.get_progress(alice.id, course.id).await.unwrap().progress, 50.0);
    assert!(!tracker.get_progress(bob.id, course.id).await.unwrap().started);
}

// =============================================================================
// Catalog changes
// =============================================================================

#[tokio::test]
async fn test_adding_lesson_rescores_completed_course() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course, lessons) = helpers::course_with_lessons(&pool, &admin, "Growing", 2).await;
    let tracker = ProgressTracker::new(pool.clone());

    for lesson in &lessons {
        tracker
            .mark_lesson_complete(student.id, course.id, lesson.id)
            .await
            .unwrap();
    }
    assert!(tracker.get_progress(student.id, course.id).await.unwrap().completed);

    helpers::lesson(&pool, &course, 3).await;

    let snapshot = tracker.get_progress(student.id, course.id).await.unwrap();
    assert_eq!(snapshot.progress, 66.67);
    assert!(!snapshot.completed);
}

#[tokio::test]
async fn test_removing_lesson_rescores_and_drops_it_from_set() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course, lessons) = helpers::course_with_lessons(&pool, &admin, "Shrinking", 4).await;
    let tracker = ProgressTracker::new(pool.clone());

    tracker
        .mark_lesson_complete(student.id, course.id, lessons[0].id)
        .await
        .unwrap();
    tracker
        .mark_lesson_complete(student.id, course.id, lessons[1].id)
        .await
        .unwrap();

    // Remove one completed and one pending lesson
    assert!(catalog::remove_lesson(&pool, lessons[0].id).await.unwrap());
    assert!(catalog::remove_lesson(&pool, lessons[3].id).await.unwrap());
    assert!(!catalog::remove_lesson(&pool, lessons[3].id).await.unwrap());

    let snapshot = tracker.get_progress(student.id, course.id).await.unwrap();
    assert_eq!(snapshot.completed_lessons, 1);
    assert_eq!(snapshot.progress, 50.0);
}

#[tokio::test]
async fn test_deleting_course_cascades_progress() {
    let pool = helpers::memory_db().await;
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course, lessons) = helpers::course_with_lessons(&pool, &admin, "Doomed", 1).await;
    let tracker = ProgressTracker::new(pool.clone());

    tracker
        .mark_lesson_complete(student.id, course.id, lessons[0].id)
        .await
        .unwrap();
    assert!(db::courses::delete_course(&pool, course.id).await.unwrap());

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progress_lessons")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
    assert!(!tracker.get_progress(student.id, course.id).await.unwrap().started);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_completions_do_not_lose_updates() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::init_database(&dir.path().join("progress.db")).await.unwrap();
    let admin = helpers::user(&pool, "admin", Role::Admin).await;
    let student = helpers::user(&pool, "student", Role::Free).await;
    let (course, lessons) = helpers::course_with_lessons(&pool, &admin, "Race", 8).await;
    let tracker = Arc::new(ProgressTracker::new(pool.clone()));

    let handles: Vec<_> = lessons
        .iter()
        .map(|lesson| {
            let tracker = Arc::clone(&tracker);
            let (user_id, course_id, lesson_id) = (student.id, course.id, lesson.id);
            tokio::spawn(async move {
                tracker
                    .mark_lesson_complete(user_id, course_id, lesson_id)
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let snapshot = tracker.get_progress(student.id, course.id).await.unwrap();
    assert_eq!(snapshot.completed_lessons, 8);
    assert_eq!(snapshot.progress, 100.0);
    assert!(snapshot.completed);

    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_progress")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records, 1);
}
