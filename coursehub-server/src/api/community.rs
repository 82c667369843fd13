//! Forum, blog, AI project and comment endpoints
//!
//! Creation records the caller as the author. Update and delete are allowed
//! to the author or to roles with [`Capability::ModerateContent`].
//!
//! [`Capability::ModerateContent`]: coursehub_common::Capability::ModerateContent

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use coursehub_common::db::community;
use coursehub_common::models::{AiProject, BlogPost, Comment, CommentTarget, ForumReply, ForumThread};
use serde::Deserialize;
use tracing::info;

use super::AuthUser;
use crate::{ApiError, ApiResult, AppState};

fn require_text(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

fn not_found(what: &str) -> ApiError {
    ApiError::NotFound(format!("{} not found", what))
}

// ========================================
// Forum threads
// ========================================

#[derive(Debug, Deserialize)]
pub struct ThreadRequest {
    pub title: String,
    pub content: String,
}

/// GET /api/forum-threads
pub async fn list_threads(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> ApiResult<Json<Vec<ForumThread>>> {
    Ok(Json(community::list_threads(&state.db).await?))
}

/// GET /api/forum-threads/:id
pub async fn get_thread(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ForumThread>> {
    let thread = community::get_thread(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Thread"))?;
    Ok(Json(thread))
}

/// POST /api/forum-threads
pub async fn create_thread(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<ThreadRequest>,
) -> ApiResult<(StatusCode, Json<ForumThread>)> {
    require_text("Title", &request.title)?;
    require_text("Content", &request.content)?;

    let thread = community::create_thread(&state.db, caller.id(), &request.title, &request.content).await?;
    info!(thread_id = thread.id, user_id = caller.id(), "Created forum thread");
    Ok((StatusCode::CREATED, Json(thread)))
}

/// PUT /api/forum-threads/:id
pub async fn update_thread(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<ThreadRequest>,
) -> ApiResult<Json<ForumThread>> {
    let thread = community::get_thread(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Thread"))?;
    caller.require_owner_or_moderator(thread.user_id)?;
    require_text("Title", &request.title)?;
    require_text("Content", &request.content)?;

    Ok(Json(
        community::update_thread(&state.db, id, &request.title, &request.content).await?,
    ))
}

/// DELETE /api/forum-threads/:id
///
/// Replies to the thread are deleted with it.
pub async fn delete_thread(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let thread = community::get_thread(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Thread"))?;
    caller.require_owner_or_moderator(thread.user_id)?;

    community::delete_thread(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========================================
// Forum replies
// ========================================

#[derive(Debug, Deserialize)]
pub struct ReplyFilter {
    pub thread_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub thread_id: i64,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

/// GET /api/forum-replies?thread_id=
pub async fn list_replies(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(filter): Query<ReplyFilter>,
) -> ApiResult<Json<Vec<ForumReply>>> {
    Ok(Json(community::list_replies(&state.db, filter.thread_id).await?))
}

/// GET /api/forum-replies/:id
pub async fn get_reply(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ForumReply>> {
    let reply = community::get_reply(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Reply"))?;
    Ok(Json(reply))
}

/// POST /api/forum-replies
///
/// 404 if the thread does not exist.
pub async fn create_reply(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<ReplyRequest>,
) -> ApiResult<(StatusCode, Json<ForumReply>)> {
    require_text("Content", &request.content)?;

    let reply = community::create_reply(&state.db, request.thread_id, caller.id(), &request.content).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

/// PUT /api/forum-replies/:id
pub async fn update_reply(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<ContentRequest>,
) -> ApiResult<Json<ForumReply>> {
    let reply = community::get_reply(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Reply"))?;
    caller.require_owner_or_moderator(reply.user_id)?;
    require_text("Content", &request.content)?;

    Ok(Json(community::update_reply(&state.db, id, &request.content).await?))
}

/// DELETE /api/forum-replies/:id
pub async fn delete_reply(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let reply = community::get_reply(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Reply"))?;
    caller.require_owner_or_moderator(reply.user_id)?;

    community::delete_reply(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========================================
// Blog posts (public reads)
// ========================================

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// GET /api/blog-posts (no auth)
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<BlogPost>>> {
    Ok(Json(community::list_posts(&state.db).await?))
}

/// GET /api/blog-posts/:id (no auth)
pub async fn get_post(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<BlogPost>> {
    let post = community::get_post(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Blog post"))?;
    Ok(Json(post))
}

/// POST /api/blog-posts
pub async fn create_post(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<PostRequest>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    require_text("Title", &request.title)?;
    require_text("Content", &request.content)?;

    let post = community::create_post(
        &state.db,
        caller.id(),
        &request.title,
        &request.content,
        &request.tags,
    )
    .await?;
    info!(post_id = post.id, author_id = caller.id(), "Published blog post");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/blog-posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<PostRequest>,
) -> ApiResult<Json<BlogPost>> {
    let post = community::get_post(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Blog post"))?;
    caller.require_owner_or_moderator(post.author_id)?;
    require_text("Title", &request.title)?;
    require_text("Content", &request.content)?;

    Ok(Json(
        community::update_post(&state.db, id, &request.title, &request.content, &request.tags).await?,
    ))
}

/// DELETE /api/blog-posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let post = community::get_post(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Blog post"))?;
    caller.require_owner_or_moderator(post.author_id)?;

    community::delete_post(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========================================
// AI projects
// ========================================

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub title: String,
    pub description: String,
    pub github_repo_url: String,
}

fn validate_project(request: &ProjectRequest) -> ApiResult<()> {
    require_text("Title", &request.title)?;
    require_text("Description", &request.description)?;
    let url = request.github_repo_url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ApiError::BadRequest("github_repo_url must be an http(s) URL".to_string()));
    }
    Ok(())
}

/// GET /api/ai-projects
pub async fn list_projects(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> ApiResult<Json<Vec<AiProject>>> {
    Ok(Json(community::list_projects(&state.db).await?))
}

/// GET /api/ai-projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<AiProject>> {
    let project = community::get_project(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Project"))?;
    Ok(Json(project))
}

/// POST /api/ai-projects
pub async fn create_project(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<AiProject>)> {
    validate_project(&request)?;

    let project = community::create_project(
        &state.db,
        caller.id(),
        &request.title,
        &request.description,
        request.github_repo_url.trim(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/ai-projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<ProjectRequest>,
) -> ApiResult<Json<AiProject>> {
    let project = community::get_project(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Project"))?;
    caller.require_owner_or_moderator(project.user_id)?;
    validate_project(&request)?;

    Ok(Json(
        community::update_project(
            &state.db,
            id,
            &request.title,
            &request.description,
            request.github_repo_url.trim(),
        )
        .await?,
    ))
}

/// DELETE /api/ai-projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let project = community::get_project(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Project"))?;
    caller.require_owner_or_moderator(project.user_id)?;

    community::delete_project(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========================================
// Comments
// ========================================

#[derive(Debug, Deserialize)]
pub struct CommentFilter {
    pub content_type: Option<CommentTarget>,
    pub object_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content_type: CommentTarget,
    pub object_id: i64,
    pub content: String,
}

/// GET /api/comments?content_type=&object_id=
pub async fn list_comments(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(filter): Query<CommentFilter>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(
        community::list_comments(&state.db, filter.content_type, filter.object_id).await?,
    ))
}

/// GET /api/comments/:id
pub async fn get_comment(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Comment>> {
    let comment = community::get_comment(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Comment"))?;
    Ok(Json(comment))
}

/// POST /api/comments
pub async fn create_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    require_text("Content", &request.content)?;

    let comment = community::create_comment(
        &state.db,
        caller.id(),
        request.content_type,
        request.object_id,
        &request.content,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PUT /api/comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<ContentRequest>,
) -> ApiResult<Json<Comment>> {
    let comment = community::get_comment(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Comment"))?;
    caller.require_owner_or_moderator(comment.user_id)?;
    require_text("Content", &request.content)?;

    Ok(Json(community::update_comment(&state.db, id, &request.content).await?))
}

/// DELETE /api/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let comment = community::get_comment(&state.db, id)
        .await?
        .ok_or_else(|| not_found("Comment"))?;
    caller.require_owner_or_moderator(comment.user_id)?;

    community::delete_comment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build community content routes
pub fn community_routes() -> Router<AppState> {
    Router::new()
        .route("/api/forum-threads", get(list_threads).post(create_thread))
        .route(
            "/api/forum-threads/:id",
            get(get_thread).put(update_thread).delete(delete_thread),
        )
        .route("/api/forum-replies", get(list_replies).post(create_reply))
        .route(
            "/api/forum-replies/:id",
            get(get_reply).put(update_reply).delete(delete_reply),
        )
        .route("/api/blog-posts", get(list_posts).post(create_post))
        .route(
            "/api/blog-posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/ai-projects", get(list_projects).post(create_project))
        .route(
            "/api/ai-projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/comments", get(list_comments).post(create_comment))
        .route(
            "/api/comments/:id",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
}
