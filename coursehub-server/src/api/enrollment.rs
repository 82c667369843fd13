//! Course enrollment endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use coursehub_common::db::{courses, enrollments};
use coursehub_common::models::{Course, UserSummary};
use coursehub_common::Capability;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AuthUser, MessageResponse};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: i64,
}

#[derive(Debug, Serialize)]
pub struct EnrolledResponse {
    pub enrolled: bool,
}

async fn enroll_caller(state: &AppState, caller: &AuthUser, course_id: i64) -> ApiResult<Json<MessageResponse>> {
    if !courses::course_exists(&state.db, course_id).await? {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    if enrollments::enroll(&state.db, caller.id(), course_id).await? {
        info!(user_id = caller.id(), course_id, "User enrolled");
    }

    Ok(Json(MessageResponse::new("Enrolled successfully")))
}

/// POST /api/courses/:id/enroll
///
/// Enrolling twice is not an error; the second call changes nothing.
pub async fn enroll(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(course_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    enroll_caller(&state, &caller, course_id).await
}

/// POST /api/enroll with `{"course_id": ...}`
pub async fn enroll_by_body(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<EnrollRequest>,
) -> ApiResult<Json<MessageResponse>> {
    enroll_caller(&state, &caller, request.course_id).await
}

/// GET /api/courses/:id/enrolled
pub async fn is_enrolled(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(course_id): Path<i64>,
) -> ApiResult<Json<EnrolledResponse>> {
    let enrolled = enrollments::is_enrolled(&state.db, caller.id(), course_id).await?;
    Ok(Json(EnrolledResponse { enrolled }))
}

/// GET /api/my-courses
pub async fn my_courses(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(enrollments::enrolled_courses(&state.db, caller.id()).await?))
}

/// GET /api/courses/:id/enrolled-users (admin)
///
/// **Errors:**
/// - 403 Forbidden: caller may not view enrollments (checked before any lookup)
/// - 404 Not Found: course does not exist
pub async fn enrolled_users(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(course_id): Path<i64>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    caller.require(Capability::ViewEnrollments)?;

    if !courses::course_exists(&state.db, course_id).await? {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    Ok(Json(enrollments::enrolled_users(&state.db, course_id).await?))
}

/// Build enrollment routes
pub fn enrollment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/courses/:id/enroll", post(enroll))
        .route("/api/enroll", post(enroll_by_body))
        .route("/api/courses/:id/enrolled", get(is_enrolled))
        .route("/api/courses/:id/enrolled-users", get(enrolled_users))
        .route("/api/my-courses", get(my_courses))
}
