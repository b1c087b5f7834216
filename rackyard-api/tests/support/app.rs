//! Shared router harness for route tests.
//!
//! Builds the full API router over the seeded mock warehouse with a fixed
//! JWT clock, plus helpers to send requests and decode JSON bodies.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use rackyard_api::{
    create_api_router, generate_jwt_token, ApiConfig, AuthConfig, FixedClock, JwtSecret,
    LiveOccupancy,
};
use rackyard_storage::SharedStore;
use rackyard_test_utils::{seeded_storage, MockStorage, OPERATOR};
use serde_json::Value;
use tower::ServiceExt;

/// Signing secret used by every route test.
pub const TEST_SECRET: &str = "rackyard-route-tests-secret-0123456789";

/// 2024-01-01 00:00:00 UTC
pub const TEST_NOW: i64 = 1_704_067_200;

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: JwtSecret::new(TEST_SECRET.to_string()).expect("test secret"),
        clock: Arc::new(FixedClock(TEST_NOW)),
        ..AuthConfig::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MockStorage>,
    pub live: LiveOccupancy,
    pub auth_config: AuthConfig,
}

impl TestApp {
    /// Bearer token for the seeded operator.
    pub fn token(&self) -> String {
        generate_jwt_token(&self.auth_config, OPERATOR).expect("token")
    }

    /// Send a request and decode the body as JSON (`Null` when it is not).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let token = self.token();
        self.send(get(uri, Some(&token))).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let token = self.token();
        self.send(post_json(uri, Some(&token), body)).await
    }
}

pub fn test_app() -> TestApp {
    let store = Arc::new(seeded_storage());
    let shared: SharedStore = store.clone();
    let live = LiveOccupancy::new();
    let auth_config = test_auth_config();

    let router = create_api_router(shared, live.clone(), &ApiConfig::default(), auth_config.clone())
        .expect("router builds in development");

    TestApp {
        router,
        store,
        live,
        auth_config,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}
