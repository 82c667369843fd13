//! Bearer-token sessions

use crate::auth::{generate_token, hash_token};
use crate::models::User;
use crate::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;
use tracing::debug;

/// A freshly issued session; `token` is only ever returned here
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issue a new session token for `user_id` valid for `ttl`
pub async fn create_session(pool: &SqlitePool, user_id: i64, ttl: Duration) -> Result<IssuedSession> {
    let token = generate_token();
    let now = Utc::now();
    let expires_at = now + ttl;

    sqlx::query("INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(now)
        .bind(expires_at.timestamp())
        .execute(pool)
        .await?;

    debug!(user_id, "Issued session token");

    // Round-trip through epoch seconds so the reported expiry matches storage
    let expires_at = Utc
        .timestamp_opt(expires_at.timestamp(), 0)
        .single()
        .unwrap_or(expires_at);

    Ok(IssuedSession { token, expires_at })
}

/// Resolve a presented token to its user, ignoring expired sessions
pub async fn resolve_session(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.email, u.role, u.profile_picture, u.created_at, u.updated_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = ? AND s.expires_at > ?
        "#,
    )
    .bind(hash_token(token))
    .bind(Utc::now().timestamp())
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Revoke a single token; returns false if it was unknown
pub async fn revoke_session(pool: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(hash_token(token))
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every expired session; returns the number removed
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
