//! Lesson completion and course progress endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use coursehub_common::progress::ProgressSnapshot;
use serde::Serialize;

use super::AuthUser;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub message: String,
    /// Updated completion percentage
    pub progress: f64,
}

/// POST /api/courses/:id/lessons/:lesson_id/complete
///
/// **Response:** `{"message": "Lesson marked as complete", "progress": 50.0}`
///
/// **Errors:**
/// - 404 Not Found: course missing, or lesson missing or not in this course
pub async fn complete_lesson(
    State(state): State<AppState>,
    caller: AuthUser,
    Path((course_id, lesson_id)): Path<(i64, i64)>,
) -> ApiResult<Json<CompleteResponse>> {
    let snapshot = state
        .tracker
        .mark_lesson_complete(caller.id(), course_id, lesson_id)
        .await?;

    Ok(Json(CompleteResponse {
        message: "Lesson marked as complete".to_string(),
        progress: snapshot.progress,
    }))
}

/// GET /api/courses/:id/progress
///
/// A user who has not started the course gets `progress: 0` and
/// `started: false` rather than an error.
pub async fn get_progress(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(course_id): Path<i64>,
) -> ApiResult<Json<ProgressSnapshot>> {
    Ok(Json(state.tracker.get_progress(caller.id(), course_id).await?))
}

/// Build progress routes
pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/courses/:id/lessons/:lesson_id/complete",
            post(complete_lesson),
        )
        .route("/api/courses/:id/progress", get(get_progress))
}
