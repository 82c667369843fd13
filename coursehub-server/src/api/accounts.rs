//! Registration, login, sessions and user administration

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use coursehub_common::auth;
use coursehub_common::db::{sessions, users};
use coursehub_common::models::User;
use coursehub_common::{Capability, Role};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AuthUser, MessageResponse};
use crate::{ApiError, ApiResult, AppState};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

/// Identity embedded in token responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserInfo,
}

/// Check a username against the length limits
pub fn validate_username(username: &str) -> ApiResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(ApiError::BadRequest(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}

/// Argon2 is CPU-bound; keep it off the async workers
pub async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn verify_password(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password check task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn issue_token(state: &AppState, user: User) -> ApiResult<TokenResponse> {
    let session = sessions::create_session(&state.db, user.id, state.session_ttl).await?;

    Ok(TokenResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: user.into(),
    })
}

/// POST /api/register
///
/// New accounts always get the `free` role; a `role` field in the body is
/// ignored.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let username = request.username.trim().to_string();
    validate_username(&username)?;
    validate_password(&request.password)?;

    let password_hash = hash_password(request.password).await?;
    let user = users::create_user(&state.db, &username, &request.email, &password_hash, Role::Free).await?;

    info!(user_id = user.id, username = %user.username, "Registered user");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/token
///
/// **Request:** `{"username": "...", "password": "..."}`
/// **Response:** `{"token": "...", "expires_at": "...", "user": {...}}`
///
/// **Errors:**
/// - 401 Unauthorized: unknown user or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let (user_id, password_hash) = users::get_password_hash(&state.db, &request.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(request.password, password_hash).await? {
        return Err(invalid());
    }

    let user = users::get_user(&state.db, user_id).await?.ok_or_else(invalid)?;
    info!(user_id, "User logged in");

    Ok(Json(issue_token(&state, user).await?))
}

/// POST /api/token/refresh
///
/// Issues a fresh token and revokes the one presented.
pub async fn refresh_token(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<TokenResponse>> {
    let response = issue_token(&state, caller.user).await?;
    sessions::revoke_session(&state.db, &caller.token).await?;

    Ok(Json(response))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    sessions::revoke_session(&state.db, &caller.token).await?;
    info!(user_id = caller.id(), "User logged out");

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// GET /api/user-data
pub async fn user_data(caller: AuthUser) -> Json<User> {
    Json(caller.user)
}

/// PUT /api/profile
///
/// The role is not part of the profile and cannot be changed here.
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<ProfileRequest>,
) -> ApiResult<Json<User>> {
    let username = request.username.map(|u| u.trim().to_string());
    if let Some(username) = &username {
        validate_username(username)?;
    }

    let update = users::ProfileUpdate {
        username,
        email: request.email,
        profile_picture: request.profile_picture,
    };
    let user = users::update_profile(&state.db, caller.id(), &update).await?;

    Ok(Json(user))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>, _caller: AuthUser) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(users::list_users(&state.db).await?))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = users::get_user(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// PUT /api/users/:id/role (admin)
pub async fn set_role(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<Json<User>> {
    caller.require(Capability::ManageUsers)?;

    let role: Role = request.role.parse()?;
    let user = users::set_role(&state.db, id, role).await?;

    info!(user_id = id, role = %role, by = caller.id(), "Changed user role");
    Ok(Json(user))
}

/// DELETE /api/users/:id (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    caller.require(Capability::ManageUsers)?;

    if !users::delete_user(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = id, by = caller.id(), "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}

/// Build account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/token", post(login))
        .route("/api/token/refresh", post(refresh_token))
        .route("/api/logout", post(logout))
        .route("/api/user-data", get(user_data))
        .route("/api/profile", put(update_profile))
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user).delete(delete_user))
        .route("/api/users/:id/role", put(set_role))
}
