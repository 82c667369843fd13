//! Bearer-token authentication
//!
//! Handlers that need a caller take [`AuthUser`] as an argument; requests
//! without a valid `Authorization: Bearer <token>` header are rejected with
//! 401 before the handler body runs.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use coursehub_common::db::sessions;
use coursehub_common::models::User;
use coursehub_common::Capability;
use tracing::debug;

use crate::{ApiError, AppState};

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Token presented with this request (needed for logout and refresh)
    pub token: String,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    /// Fail with 403 unless the caller's role grants `capability`
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        self.user.role.require(capability).map_err(ApiError::from)
    }

    /// Fail with 403 unless the caller owns the item or may moderate content
    pub fn require_owner_or_moderator(&self, owner_id: i64) -> Result<(), ApiError> {
        if self.user.id == owner_id || self.user.role.can(Capability::ModerateContent) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "You do not have permission to modify this content".to_string(),
            ))
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Authentication credentials were not provided".to_string())
        })?;

        let user = sessions::resolve_session(&state.db, token)
            .await?
            .ok_or_else(|| {
                debug!("Rejected unknown or expired token");
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })?;

        Ok(AuthUser {
            user,
            token: token.to_string(),
        })
    }
}
