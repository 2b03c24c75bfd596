//! Shared test harness for E2E integration tests.
//!
//! Drives the gateway router over configurable mock collaborators,
//! exercising real code paths across all crate boundaries.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fp_crm::MockCrm;
use fp_gateway::assist::TieredClassifier;
use fp_gateway::config::GatewayConfig;
use fp_gateway::routes::build_router;
use fp_gateway::state::AppState;
use fp_gateway::vision::NoVision;
use fp_telematics::MockTelematics;

/// End-to-end harness: gateway router over explicit mocks.
pub struct TestHarness {
    pub router: Router,
}

impl TestHarness {
    /// Harness over the built-in sample data.
    pub fn with_sample_data() -> Self {
        Self {
            router: build_router(AppState::with_sample_data()),
        }
    }

    /// Harness over caller-supplied collaborators.
    pub fn with_collaborators(crm: MockCrm, telematics: MockTelematics) -> Self {
        let state = AppState::new(
            Arc::new(crm),
            Arc::new(telematics),
            Arc::new(NoVision),
            Arc::new(TieredClassifier::rules_only()),
            GatewayConfig::default(),
        );
        Self {
            router: build_router(state),
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// One chat turn in plain style.
    pub async fn chat(&self, message: &str) -> (StatusCode, Value) {
        self.post("/api/v1/chat", &json!({"message": message, "style": "plain"}))
            .await
    }

    /// One chat turn with history.
    pub async fn chat_with_history(&self, message: &str, history: Value) -> (StatusCode, Value) {
        self.post(
            "/api/v1/chat",
            &json!({"message": message, "history": history, "style": "plain"}),
        )
        .await
    }
}
