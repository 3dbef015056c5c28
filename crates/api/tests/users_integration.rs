//! Integration tests for login and user management.
//!
//! Tests cover:
//! - POST /api/auth/login
//! - GET/POST /api/users
//! - PUT/DELETE /api/users/:id
//! - Master account protections

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_token, fake_login, json_request, request_with_auth, send, spawn_app, TestApp,
    MASTER_LOGIN, MASTER_PASSWORD,
};
use serde_json::{json, Value};

async fn login(app: &TestApp, login: &str, password: &str) -> (StatusCode, Value) {
    send(
        &app.router,
        json_request(
            Method::POST,
            "/api/auth/login",
            &json!({"login": login, "password": password}),
            None,
        ),
    )
    .await
}

async fn create_user(app: &TestApp, login: &str, password: &str, role: &str) -> (StatusCode, Value) {
    let token = admin_token(app);
    send(
        &app.router,
        json_request(
            Method::POST,
            "/api/users",
            &json!({"login": login, "password": password, "role": role}),
            Some(&token),
        ),
    )
    .await
}

async fn master_id(app: &TestApp) -> String {
    let (_, body) = login(app, MASTER_LOGIN, MASTER_PASSWORD).await;
    body["user"]["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_master_can_login() {
    let app = spawn_app().await;

    let (status, body) = login(&app, MASTER_LOGIN, MASTER_PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["isMaster"], true);
    assert!(body["user"].get("passwordHash").is_none());

    let token = body["accessToken"].as_str().unwrap();
    let claims = app.state.jwt.validate_token(token).unwrap();
    assert_eq!(claims.role, "admin");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let (status, body) = login(&app, MASTER_LOGIN, "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = login(&app, &fake_login(), "whatever").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/auth/login", &json!({"login": "x"}), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Login and password are required");
}

#[tokio::test]
async fn test_login_token_grants_admin_routes() {
    let app = spawn_app().await;
    let (_, body) = login(&app, MASTER_LOGIN, MASTER_PASSWORD).await;
    let token = body["accessToken"].as_str().unwrap();

    let (status, _) = send(&app.router, request_with_auth(Method::GET, "/api/users", token)).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// User management
// ============================================================================

#[tokio::test]
async fn test_create_user_and_login() {
    let app = spawn_app().await;
    let name = fake_login();

    let (status, body) = create_user(&app, &name, "s3cret-pass", "user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["login"], name.as_str());
    assert_eq!(body["user"]["isMaster"], false);

    let (status, body) = login(&app, &name, "s3cret-pass").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn test_regular_user_cannot_manage_users() {
    let app = spawn_app().await;
    let name = fake_login();
    create_user(&app, &name, "pass", "user").await;
    let (_, body) = login(&app, &name, "pass").await;
    let token = body["accessToken"].as_str().unwrap();

    let (status, _) = send(&app.router, request_with_auth(Method::GET, "/api/users", token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_user_rejects_duplicate_login() {
    let app = spawn_app().await;
    let name = fake_login();
    create_user(&app, &name, "pass", "user").await;

    let (status, body) = create_user(&app, &name, "other", "admin").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Login already exists");
}

#[tokio::test]
async fn test_create_user_requires_role() {
    let app = spawn_app().await;
    let token = admin_token(&app);

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/users",
            &json!({"login": fake_login(), "password": "pass"}),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Role is required");
}

#[tokio::test]
async fn test_list_hides_master() {
    let app = spawn_app().await;
    let token = admin_token(&app);
    create_user(&app, &fake_login(), "pass", "admin").await;

    let (status, body) = send(&app.router, request_with_auth(Method::GET, "/api/users", &token)).await;

    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users.iter().all(|u| u["login"] != MASTER_LOGIN));
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;
    let token = admin_token(&app);
    let name = fake_login();
    let (_, body) = create_user(&app, &name, "old-pass", "user").await;
    let uri = format!("/api/users/{}", body["user"]["id"].as_str().unwrap());

    let (status, _) = send(
        &app.router,
        json_request(Method::PUT, &uri, &json!({"password": "new-pass"}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(login(&app, &name, "old-pass").await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, &name, "new-pass").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_user() {
    let app = spawn_app().await;
    let token = admin_token(&app);
    let (_, body) = create_user(&app, &fake_login(), "pass", "user").await;
    let uri = format!("/api/users/{}", body["user"]["id"].as_str().unwrap());

    let (status, body) = send(&app.router, request_with_auth(Method::DELETE, &uri, &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app.router, request_with_auth(Method::DELETE, &uri, &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_master_cannot_be_modified() {
    let app = spawn_app().await;
    let token = admin_token(&app);
    let uri = format!("/api/users/{}", master_id(&app).await);

    let (status, _) = send(
        &app.router,
        json_request(Method::PUT, &uri, &json!({"password": "hijack"}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app.router, request_with_auth(Method::DELETE, &uri, &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(login(&app, MASTER_LOGIN, MASTER_PASSWORD).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_user_id_is_not_found() {
    let app = spawn_app().await;
    let token = admin_token(&app);

    let (status, _) = send(
        &app.router,
        request_with_auth(Method::DELETE, "/api/users/42", &token),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
