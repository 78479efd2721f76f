//! Shared helpers for satbot-service integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use satbot_service::context::StaticContext;
use satbot_service::services::{AuditLog, AuditRecord, ChatService, MockCompletionProvider};
use satbot_service::{build_router, AppState};
use secrecy::Secret;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::util::ServiceExt;

pub const TEST_CONTEXT: &str = "Saturnalia is held at TIET Patiala. Pronite is on the final night.";

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<MockCompletionProvider>,
    pub audit: mpsc::Receiver<AuditRecord>,
}

/// Router wired to a mock provider, with an API key configured.
pub fn spawn_router(provider: MockCompletionProvider) -> TestApp {
    spawn_router_with_key(provider, Some("gsk_test_key"))
}

pub fn spawn_router_with_key(provider: MockCompletionProvider, api_key: Option<&str>) -> TestApp {
    let provider = Arc::new(provider);
    let (tx, rx) = mpsc::channel(16);

    let chat = ChatService::new(
        provider.clone(),
        StaticContext::new(TEST_CONTEXT),
        api_key.map(|k| Secret::new(k.to_string())),
        AuditLog::new(tx),
    );

    TestApp {
        router: build_router(AppState { chat }),
        provider,
        audit: rx,
    }
}

pub fn post_chat(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
