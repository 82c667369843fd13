//! Course and lesson catalog
//!
//! Reads are open to any signed-in user; writes need
//! [`Capability::ManageCourses`]. Lesson creation and deletion go through
//! [`coursehub_common::catalog`] so progress percentages are re-scored in
//! the same transaction.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use coursehub_common::catalog;
use coursehub_common::db::courses::{self, CourseInput};
use coursehub_common::db::lessons::{self, LessonChanges, LessonInput};
use coursehub_common::models::{AccessType, Course, Lesson};
use coursehub_common::Capability;
use serde::Deserialize;
use tracing::info;

use super::AuthUser;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to the caller on create, and to the current instructor on update
    pub instructor_id: Option<i64>,
    pub price: Option<f64>,
    #[serde(default)]
    pub access_type: AccessType,
}

#[derive(Debug, Deserialize)]
pub struct LessonRequest {
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub content: String,
    pub order: i64,
}

#[derive(Debug, Deserialize)]
pub struct LessonUpdateRequest {
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub content: String,
    pub order: i64,
}

/// Query parameters for GET /api/lessons
#[derive(Debug, Deserialize)]
pub struct LessonFilter {
    pub course_id: Option<i64>,
}

fn course_not_found() -> ApiError {
    ApiError::NotFound("Course not found".to_string())
}

fn validate_course(request: &CourseRequest) -> ApiResult<()> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Course title is required".to_string()));
    }
    if matches!(request.price, Some(price) if price < 0.0) {
        return Err(ApiError::BadRequest("Price cannot be negative".to_string()));
    }
    Ok(())
}

fn validate_lesson(title: &str, order: i64) -> ApiResult<()> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("Lesson title is required".to_string()));
    }
    if order < 0 {
        return Err(ApiError::BadRequest("Lesson order cannot be negative".to_string()));
    }
    Ok(())
}

// ========================================
// Courses
// ========================================

/// GET /api/courses
pub async fn list_courses(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(courses::list_courses(&state.db).await?))
}

/// GET /api/courses/:id
pub async fn get_course(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Course>> {
    let course = courses::get_course(&state.db, id)
        .await?
        .ok_or_else(course_not_found)?;

    Ok(Json(course))
}

/// POST /api/courses (admin)
pub async fn create_course(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<CourseRequest>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    caller.require(Capability::ManageCourses)?;
    validate_course(&request)?;

    let input = CourseInput {
        title: request.title,
        description: request.description,
        instructor_id: request.instructor_id.unwrap_or(caller.id()),
        price: request.price,
        access_type: request.access_type,
    };
    let course = courses::create_course(&state.db, &input).await?;

    info!(course_id = course.id, by = caller.id(), "Created course");
    Ok((StatusCode::CREATED, Json(course)))
}

/// PUT /api/courses/:id (admin)
pub async fn update_course(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<CourseRequest>,
) -> ApiResult<Json<Course>> {
    caller.require(Capability::ManageCourses)?;
    validate_course(&request)?;

    let current = courses::get_course(&state.db, id)
        .await?
        .ok_or_else(course_not_found)?;

    let input = CourseInput {
        title: request.title,
        description: request.description,
        instructor_id: request.instructor_id.unwrap_or(current.instructor_id),
        price: request.price,
        access_type: request.access_type,
    };
    let course = courses::update_course(&state.db, id, &input).await?;

    Ok(Json(course))
}

/// DELETE /api/courses/:id (admin)
///
/// Lessons, enrollments and progress records go with the course.
pub async fn delete_course(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    caller.require(Capability::ManageCourses)?;

    if !courses::delete_course(&state.db, id).await? {
        return Err(course_not_found());
    }

    info!(course_id = id, by = caller.id(), "Deleted course");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/courses/:id/lessons
///
/// Lessons ordered by position.
pub async fn list_course_lessons(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Lesson>>> {
    if !courses::course_exists(&state.db, id).await? {
        return Err(course_not_found());
    }

    Ok(Json(lessons::list_course_lessons(&state.db, id).await?))
}

// ========================================
// Lessons
// ========================================

/// GET /api/lessons?course_id=
pub async fn list_lessons(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(filter): Query<LessonFilter>,
) -> ApiResult<Json<Vec<Lesson>>> {
    let lessons = match filter.course_id {
        Some(course_id) => lessons::list_course_lessons(&state.db, course_id).await?,
        None => lessons::list_lessons(&state.db).await?,
    };

    Ok(Json(lessons))
}

/// GET /api/lessons/:id
pub async fn get_lesson(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Lesson>> {
    let lesson = lessons::get_lesson(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;

    Ok(Json(lesson))
}

/// POST /api/lessons (admin)
///
/// **Errors:**
/// - 404 Not Found: course does not exist
/// - 409 Conflict: the course already has a lesson at this `order`
pub async fn create_lesson(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<LessonRequest>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    caller.require(Capability::ManageCourses)?;
    validate_lesson(&request.title, request.order)?;

    let input = LessonInput {
        course_id: request.course_id,
        title: request.title,
        video_url: request.video_url,
        content: request.content,
        position: request.order,
    };
    let lesson = catalog::add_lesson(&state.db, &input).await?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// PUT /api/lessons/:id (admin)
pub async fn update_lesson(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<LessonUpdateRequest>,
) -> ApiResult<Json<Lesson>> {
    caller.require(Capability::ManageCourses)?;
    validate_lesson(&request.title, request.order)?;

    let changes = LessonChanges {
        title: request.title,
        video_url: request.video_url,
        content: request.content,
        position: request.order,
    };

    Ok(Json(lessons::update_lesson(&state.db, id, &changes).await?))
}

/// DELETE /api/lessons/:id (admin)
pub async fn delete_lesson(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    caller.require(Capability::ManageCourses)?;

    if !catalog::remove_lesson(&state.db, id).await? {
        return Err(ApiError::NotFound("Lesson not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route(
            "/api/courses/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/api/courses/:id/lessons", get(list_course_lessons))
        .route("/api/lessons", get(list_lessons).post(create_lesson))
        .route(
            "/api/lessons/:id",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
}
