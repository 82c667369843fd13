//! User account queries

use crate::models::User;
use crate::roles::Role;
use crate::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;

const USER_COLUMNS: &str =
    "id, username, email, role, profile_picture, created_at, updated_at";

/// Fields a user may change on their own profile
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<String>,
}

/// Insert a new user
///
/// Returns `Error::Conflict` if the username is taken.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO users (username, email, password_hash, role, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        USER_COLUMNS
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| Error::from_unique(e, format!("Username '{}' is already taken", username)))
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Load the stored password hash for `username`
pub async fn get_password_hash(pool: &SqlitePool, username: &str) -> Result<Option<(i64, String)>> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    Ok(row)
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
    let users = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;

    Ok(users)
}

/// Apply a self-service profile update
///
/// The role column is deliberately absent from this statement.
pub async fn update_profile(pool: &SqlitePool, id: i64, update: &ProfileUpdate) -> Result<User> {
    let sql = format!(
        "UPDATE users SET \
            username = COALESCE(?, username), \
            email = COALESCE(?, email), \
            profile_picture = COALESCE(?, profile_picture), \
            updated_at = ? \
         WHERE id = ? RETURNING {}",
        USER_COLUMNS
    );

    let username = update.username.clone().unwrap_or_default();
    sqlx::query_as::<_, User>(&sql)
        .bind(&update.username)
        .bind(&update.email)
        .bind(&update.profile_picture)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::from_unique(e, format!("Username '{}' is already taken", username)))?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}

pub async fn set_role(pool: &SqlitePool, id: i64, role: Role) -> Result<User> {
    let sql = format!(
        "UPDATE users SET role = ?, updated_at = ? WHERE id = ? RETURNING {}",
        USER_COLUMNS
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(role)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
}

pub async fn set_password_hash(pool: &SqlitePool, id: i64, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a user; returns false if no such user existed
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
