//! Tests for bearer-token sessions and user accounts

mod helpers;

use chrono::Duration;
use coursehub_common::db::users::{self, ProfileUpdate};
use coursehub_common::db::sessions;
use coursehub_common::{auth, Error, Role};

#[tokio::test]
async fn test_session_round_trip() {
    let pool = helpers::memory_db().await;
    let user = helpers::user(&pool, "alice", Role::Premium).await;

    let issued = sessions::create_session(&pool, user.id, Duration::hours(1)).await.unwrap();
    let resolved = sessions::resolve_session(&pool, &issued.token).await.unwrap().unwrap();
    assert_eq!(resolved.id, user.id);
    assert_eq!(resolved.role, Role::Premium);

    // Only the digest is stored
    let stored: String = sqlx::query_scalar("SELECT token_hash FROM sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_ne!(stored, issued.token);
    assert_eq!(stored, auth::hash_token(&issued.token));
}

#[tokio::test]
async fn test_expired_session_is_ignored_and_purged() {
    let pool = helpers::memory_db().await;
    let user = helpers::user(&pool, "alice", Role::Free).await;

    let issued = sessions::create_session(&pool, user.id, Duration::seconds(-5)).await.unwrap();
    assert!(sessions::resolve_session(&pool, &issued.token).await.unwrap().is_none());
    assert_eq!(sessions::purge_expired(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_revoked_session_stops_resolving() {
    let pool = helpers::memory_db().await;
    let user = helpers::user(&pool, "alice", Role::Free).await;

    let issued = sessions::create_session(&pool, user.id, Duration::hours(1)).await.unwrap();
    assert!(sessions::revoke_session(&pool, &issued.token).await.unwrap());
    assert!(sessions::resolve_session(&pool, &issued.token).await.unwrap().is_none());
    assert!(!sessions::revoke_session(&pool, &issued.token).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let pool = helpers::memory_db().await;
    helpers::user(&pool, "alice", Role::Free).await;

    let err = users::create_user(&pool, "alice", "other@example.com", "x", Role::Free)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn test_profile_update_keeps_role_and_unset_fields() {
    let pool = helpers::memory_db().await;
    let user = helpers::user(&pool, "alice", Role::Free).await;

    let updated = users::update_profile(
        &pool,
        user.id,
        &ProfileUpdate {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.username, "alice");
    assert_eq!(updated.email, "new@example.com");
    assert_eq!(updated.role, Role::Free);
}

#[tokio::test]
async fn test_deleting_user_removes_sessions() {
    let pool = helpers::memory_db().await;
    let user = helpers::user(&pool, "alice", Role::Free).await;
    let issued = sessions::create_session(&pool, user.id, Duration::hours(1)).await.unwrap();

    assert!(users::delete_user(&pool, user.id).await.unwrap());
    assert!(sessions::resolve_session(&pool, &issued.token).await.unwrap().is_none());
}
