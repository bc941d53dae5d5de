//! HTTP-level integration tests for registration, login, session leases,
//! heartbeat renewal, and logout side effects.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{
    body_json, build_test_app, create_test_user, get_auth, login_user, post_auth, post_json,
    post_json_auth,
};
use sqlx::PgPool;

use scribepad_api::auth::jwt::hash_session_token;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Successful registration returns 201 with the public user shape.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_success(pool: PgPool) {
    let app = build_test_app(pool);

    let body = serde_json::json!({
        "username": "alpha",
        "email": "alpha@test.com",
        "password": "long-enough-password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "alpha");
    assert_eq!(json["data"]["role"], "user");
    assert!(json["data"]["id"].is_number());
    assert!(
        json["data"].get("password_hash").is_none(),
        "password hash must never be serialized"
    );
}

/// Registering a taken username returns 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_duplicate_username(pool: PgPool) {
    create_test_user(&pool, "alpha", "user").await;
    let app = build_test_app(pool);

    let body = serde_json::json!({
        "username": "alpha",
        "email": "other@test.com",
        "password": "long-enough-password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// A short password is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_short_password(pool: PgPool) {
    let app = build_test_app(pool);

    let body = serde_json::json!({
        "username": "alpha",
        "email": "alpha@test.com",
        "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// An unknown role is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn register_invalid_role(pool: PgPool) {
    let app = build_test_app(pool);

    let body = serde_json::json!({
        "username": "alpha",
        "email": "alpha@test.com",
        "password": "long-enough-password",
        "role": "superuser",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns a token, lease expiry, and user info, and opens
/// a session row.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_success(pool: PgPool) {
    let (user_id, password) = create_test_user(&pool, "alpha", "user").await;
    let app = build_test_app(pool.clone());

    let body = serde_json::json!({ "username": "alpha", "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["token"].is_string());
    assert!(json["data"]["expires_at"].is_string());
    assert_eq!(json["data"]["user"]["id"], user_id);
    assert_eq!(json["data"]["user"]["username"], "alpha");
    assert_eq!(json["data"]["user"]["role"], "user");

    let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(sessions, 1);
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_wrong_password(pool: PgPool) {
    create_test_user(&pool, "alpha", "user").await;
    let app = build_test_app(pool);

    let body = serde_json::json!({ "username": "alpha", "password": "incorrect" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login with a nonexistent username returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn login_nonexistent_user(pool: PgPool) {
    let app = build_test_app(pool);

    let body = serde_json::json!({ "username": "ghost", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Each login opens its own lease: one user may hold several sessions.
#[sqlx::test(migrations = "../db/migrations")]
async fn concurrent_sessions_per_user(pool: PgPool) {
    let (user_id, password) = create_test_user(&pool, "alpha", "user").await;
    let app = build_test_app(pool.clone());

    login_user(app.clone(), "alpha", &password).await;
    login_user(app, "alpha", &password).await;

    let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(sessions, 2);
}

// ---------------------------------------------------------------------------
// Authenticated access and heartbeat
// ---------------------------------------------------------------------------

/// Requests without a token are rejected with 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn protected_route_requires_token(pool: PgPool) {
    let app = build_test_app(pool);

    let response = common::get(app, "/api/v1/notes").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A syntactically invalid token is rejected with 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get_auth(app, "/api/v1/notes", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Heartbeat renews the lease: expires_at never moves backwards and every
/// authenticated call extends it.
#[sqlx::test(migrations = "../db/migrations")]
async fn heartbeat_extends_the_lease(pool: PgPool) {
    let (_user_id, password) = create_test_user(&pool, "alpha", "user").await;
    let app = build_test_app(pool);

    let token = login_user(app.clone(), "alpha", &password).await;

    let first = body_json(post_auth(app.clone(), "/api/v1/auth/heartbeat", &token).await).await;
    let second = body_json(post_auth(app, "/api/v1/auth/heartbeat", &token).await).await;

    let first_expiry: DateTime<Utc> =
        first["data"]["expires_at"].as_str().unwrap().parse().unwrap();
    let second_expiry: DateTime<Utc> =
        second["data"]["expires_at"].as_str().unwrap().parse().unwrap();

    assert!(second_expiry >= first_expiry);
}

/// A lapsed lease is rejected with 401 and its row is deleted on discovery.
#[sqlx::test(migrations = "../db/migrations")]
async fn expired_session_is_rejected_and_reaped(pool: PgPool) {
    let (_user_id, password) = create_test_user(&pool, "alpha", "user").await;
    let app = build_test_app(pool.clone());

    let token = login_user(app.clone(), "alpha", &password).await;

    // Lapse the lease behind the token's back.
    sqlx::query(
        "UPDATE sessions SET expires_at = NOW() - interval '1 minute',
                             last_activity = NOW() - interval '31 minutes'
         WHERE token_hash = $1",
    )
    .bind(hash_session_token(&token))
    .execute(&pool)
    .await
    .unwrap();

    let response = get_auth(app, "/api/v1/notes", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "SESSION_EXPIRED");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE token_hash = $1")
        .bind(hash_session_token(&token))
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0, "expired lease must be deleted on discovery");
}

/// GET /auth/session returns the lease backing the request.
#[sqlx::test(migrations = "../db/migrations")]
async fn session_info_returns_current_lease(pool: PgPool) {
    let (user_id, password) = create_test_user(&pool, "alpha", "user").await;
    let app = build_test_app(pool);

    let token = login_user(app.clone(), "alpha", &password).await;
    let response = get_auth(app, "/api/v1/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["session"]["user_id"], user_id);
    assert_eq!(json["data"]["user"]["username"], "alpha");
    assert!(
        json["data"]["session"].get("token_hash").is_none(),
        "token hash must never be serialized"
    );
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// Logout revokes the lease, invalidates the token, and releases every lock
/// the user held.
#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_session_and_releases_locks(pool: PgPool) {
    let (user_id, password) = create_test_user(&pool, "alpha", "user").await;
    let app = build_test_app(pool.clone());

    let token = login_user(app.clone(), "alpha", &password).await;

    // Create and lock a note.
    let created = post_json_auth(
        app.clone(),
        "/api/v1/notes",
        &token,
        serde_json::json!({ "title": "draft" }),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let note_id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let locked = post_auth(app.clone(), &format!("/api/v1/notes/{note_id}/lock"), &token).await;
    assert_eq!(locked.status(), StatusCode::OK);

    // Logout.
    let response = post_auth(app.clone(), "/api/v1/auth/logout", &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The token no longer authenticates.
    let response = get_auth(app, "/api/v1/notes", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The lock is gone.
    let locked_by: Option<i64> = sqlx::query_scalar("SELECT locked_by FROM notes WHERE id = $1")
        .bind(note_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(locked_by, None, "logout must release user {user_id}'s locks");
}
