//! Common test utilities for integration tests.
//!
//! The app is built on the in-memory stores and a scripted status source, so
//! no database or ping engine is needed.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use domain::models::{HostStatus, Role};
use domain::services::{MockStatusSource, ProbeMap, ProbeResult};
use fake::faker::internet::en::Username;
use fake::Fake;
use hostwatch_api::app::{create_app, AppState, Stores};
use hostwatch_api::config::Config;
use hostwatch_api::services::bootstrap_master;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const MASTER_LOGIN: &str = "admin";
pub const MASTER_PASSWORD: &str = "master-password";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub source: Arc<MockStatusSource>,
}

/// Defaults plus the overrides every test needs.
pub fn test_config() -> Config {
    Config::load_for_test(&[
        ("storage.backend", "memory"),
        ("auth.jwt_secret", "integration-test-secret"),
        ("auth.master_login", MASTER_LOGIN),
        ("auth.master_password", MASTER_PASSWORD),
    ])
    .expect("test configuration must load")
}

/// App with a reachable status source that knows no IPs and a master user.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_source(MockStatusSource::new()).await
}

pub async fn spawn_app_with_source(source: MockStatusSource) -> TestApp {
    let config = test_config();
    let stores = Stores::in_memory();
    bootstrap_master(stores.users.as_ref(), &config.auth)
        .await
        .expect("master bootstrap");

    let source = Arc::new(source);
    let state = AppState::new(config, stores, source.clone()).expect("app state");
    TestApp {
        router: create_app(state.clone()),
        state,
        source,
    }
}

pub fn token_for(app: &TestApp, role: Role) -> String {
    app.state
        .jwt
        .generate_access_token(Uuid::new_v4(), role.as_str())
        .expect("token")
        .0
}

pub fn admin_token(app: &TestApp) -> String {
    token_for(app, Role::Admin)
}

pub fn fake_login() -> String {
    let base: String = Username().fake();
    format!("{}_{}", base, &Uuid::new_v4().simple().to_string()[..6])
}

pub fn probes(entries: &[(&str, HostStatus, Option<f64>)]) -> ProbeMap {
    entries
        .iter()
        .map(|(ip, status, response_time)| {
            let mut probe = ProbeResult::new(*status).with_uptime(120.0);
            if let Some(ms) = response_time {
                probe = probe.with_response_time(*ms);
            }
            (ip.to_string(), probe)
        })
        .collect()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn request_with_auth(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Sends a request and returns the status with the JSON body (`Null` when
/// the body is empty or not JSON).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Creates a device through the API and returns its JSON.
pub async fn create_device(app: &TestApp, name: &str, ip: &str, active: bool) -> Value {
    let token = admin_token(app);
    let body = serde_json::json!({
        "name": name,
        "ip": ip,
        "category": "Empresas",
        "active": active
    });
    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/devices-config", &body, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create device failed: {}", body);
    body["device"].clone()
}
