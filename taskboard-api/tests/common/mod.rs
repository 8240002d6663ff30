/// Common test utilities for HTTP tests
///
/// - In-memory store, minimal hashing cost, manual clock
/// - Request helpers returning status + parsed JSON body
/// - Register/login shortcuts

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::password::HashCost;
use taskboard_shared::clock::ManualClock;
use taskboard_shared::store::memory::MemoryStore;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "http-test-secret-0123456789abcdefghijkl";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub config: Config,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Context with extra configuration variables
    pub fn with_env(extra: &[(&str, &str)]) -> Self {
        let mut vars: Vec<(String, String)> = vec![
            ("STORE_BACKEND".into(), "memory".into()),
            ("JWT_SECRET".into(), JWT_SECRET.into()),
            ("JWT_EXPIRES_IN_SECONDS".into(), "3600".into()),
        ];
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let mut config = Config::from_lookup(|key| {
            vars.iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .expect("test configuration");
        config.password = HashCost::minimal();

        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let state = AppState::new(config.clone(), store.clone(), clock.clone()).expect("app state");

        Self {
            app: build_router(state),
            store,
            clock,
            config,
        }
    }

    /// Sends a request and returns status and JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers a fresh user and returns (user id, access token)
    pub async fn user_with_token(&self, email: &str) -> (String, String) {
        let (status, user) = self.register("Test User", email, "password123").await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", user);

        let (status, body) = self.login(email, "password123").await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        (
            user["id"].as_str().unwrap().to_string(),
            body["access_token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_task(&self, token: &str, title: &str) -> Value {
        let (status, task) = self
            .send("POST", "/tasks", Some(token), Some(json!({ "title": title })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", task);
        task
    }
}
