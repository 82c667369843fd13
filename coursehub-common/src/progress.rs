//! Course progress tracking
//!
//! Records which lessons a user has completed in a course and keeps the
//! derived completion percentage in step with it:
//!
//! `percentage = round(100 * |completed ∩ course.lessons| / |course.lessons|, 2)`
//!
//! A record is created on the first completion for a (user, course) pair and
//! only moves forward; there is no "uncomplete". A record is completed
//! exactly when its stored percentage is 100.0, so on very large courses the
//! rounding can mark it complete with a lesson to spare. A course with no
//! lessons scores 0% and is never complete.
//!
//! # Concurrency
//!
//! Each completion runs in one transaction that starts with a write (the
//! record upsert), so SQLite's single-writer lock serializes completions and
//! the percentage is always computed from the committed lesson set.

use crate::db;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Completion percentage rounded to two decimals; 0 for an empty course
pub fn compute_percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = 100.0 * completed as f64 / total as f64;
    (raw * 100.0).round() / 100.0
}

/// Completion follows the rounded percentage; an empty course scores 0 and never completes
pub fn is_complete(percentage: f64) -> bool {
    percentage >= 100.0
}

/// Progress as reported to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub course_id: i64,
    /// Completion percentage (0.0 - 100.0)
    pub progress: f64,
    pub completed: bool,
    /// Number of completed lessons still present in the course
    pub completed_lessons: i64,
    /// False until the first lesson is marked complete
    pub started: bool,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    /// The "0%, not started" answer for a user with no record
    pub fn not_started(course_id: i64) -> Self {
        Self {
            course_id,
            progress: 0.0,
            completed: false,
            completed_lessons: 0,
            started: false,
            last_accessed: None,
        }
    }
}

/// Per-user course progress over the shared database
#[derive(Clone)]
pub struct ProgressTracker {
    db: SqlitePool,
}

impl ProgressTracker {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Mark `lesson_id` of `course_id` complete for `user_id`
    ///
    /// Idempotent on the lesson set; the percentage is recomputed either way.
    ///
    /// # Errors
    /// - `Error::NotFound` if the course does not exist, or the lesson does
    ///   not exist under that course. Nothing is written in either case.
    pub async fn mark_lesson_complete(
        &self,
        user_id: i64,
        course_id: i64,
        lesson_id: i64,
    ) -> Result<ProgressSnapshot> {
        if !db::courses::course_exists(&self.db, course_id).await? {
            return Err(Error::NotFound("Course not found".to_string()));
        }
        if !db::lessons::lesson_in_course(&self.db, course_id, lesson_id).await? {
            return Err(Error::NotFound("Lesson not found in this course".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let progress_id = db::progress::upsert_progress(&mut tx, user_id, course_id).await?;
        db::progress::add_completed_lesson(&mut tx, progress_id, lesson_id).await?;
        let (progress, completed, completed_lessons) =
            rescore_record(&mut tx, progress_id, course_id).await?;

        tx.commit().await?;

        info!(
            user_id,
            course_id, lesson_id, progress, completed, "Lesson marked complete"
        );

        Ok(ProgressSnapshot {
            course_id,
            progress,
            completed,
            completed_lessons,
            started: true,
            last_accessed: Some(Utc::now()),
        })
    }

    /// Current progress of `user_id` in `course_id`
    ///
    /// A missing record is the natural initial state, not an error.
    pub async fn get_progress(&self, user_id: i64, course_id: i64) -> Result<ProgressSnapshot> {
        let Some(record) = db::progress::get_progress(&self.db, user_id, course_id).await? else {
            debug!(user_id, course_id, "No progress record; reporting not started");
            return Ok(ProgressSnapshot::not_started(course_id));
        };

        let completed_lessons =
            db::progress::completed_lesson_count(&self.db, record.id, course_id).await?;

        Ok(ProgressSnapshot {
            course_id,
            progress: record.progress_percentage,
            completed: record.completed,
            completed_lessons,
            started: true,
            last_accessed: Some(record.last_accessed),
        })
    }
}

/// Recompute and store one record's percentage from its committed lesson set
///
/// Returns `(percentage, completed, completed_lessons)`.
async fn rescore_record(
    conn: &mut SqliteConnection,
    progress_id: i64,
    course_id: i64,
) -> Result<(f64, bool, i64)> {
    let done = db::progress::completed_lesson_count(&mut *conn, progress_id, course_id).await?;
    let total = db::progress::lesson_count(conn, course_id).await?;

    let percentage = compute_percentage(done, total);
    let completed = is_complete(percentage);
    db::progress::store_percentage(conn, progress_id, percentage, completed).await?;

    Ok((percentage, completed, done))
}

/// Re-score every record of a course after its lesson count changed
///
/// Called by the catalog inside the same transaction that added or removed
/// the lesson.
pub async fn rescore_course(conn: &mut SqliteConnection, course_id: i64) -> Result<usize> {
    let ids = db::progress::progress_ids_for_course(conn, course_id).await?;
    for progress_id in &ids {
        rescore_record(conn, *progress_id, course_id).await?;
    }

    if !ids.is_empty() {
        debug!(course_id, records = ids.len(), "Re-scored course progress");
    }

    Ok(ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert_eq!(compute_percentage(1, 3), 33.33);
        assert_eq!(compute_percentage(2, 3), 66.67);
        assert_eq!(compute_percentage(1, 4), 25.0);
    }

    #[test]
    fn test_full_course_is_exactly_one_hundred() {
        for total in (1..=50).chain([20_001, 40_000, 100_000]) {
            assert_eq!(compute_percentage(total, total), 100.0);
            assert!(is_complete(compute_percentage(total, total)));
        }
        assert!(!is_complete(compute_percentage(49, 50)));
    }

    #[test]
    fn test_completed_agrees_with_rounded_percentage() {
        for total in [3, 7, 20_001, 40_000, 100_000] {
            for done in [total - 1, total] {
                let percentage = compute_percentage(done, total);
                assert_eq!(is_complete(percentage), percentage == 100.0);
            }
        }
        // One lesson short of a 40 000-lesson course rounds to 100
        assert_eq!(compute_percentage(39_999, 40_000), 100.0);
        assert!(is_complete(compute_percentage(39_999, 40_000)));
    }

    #[test]
    fn test_empty_course_scores_zero() {
        assert_eq!(compute_percentage(0, 0), 0.0);
        assert!(!is_complete(compute_percentage(0, 0)));
    }

    #[test]
    fn test_not_started_snapshot() {
        let snapshot = ProgressSnapshot::not_started(7);
        assert_eq!(snapshot.course_id, 7);
        assert_eq!(snapshot.progress, 0.0);
        assert!(!snapshot.started);
        assert!(!snapshot.completed);
    }
}
