//! HTTP surface tests, driven in-process through the router

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use aura_server::{create_router, AppContext};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(ctx: AppContext) -> Router {
    create_router(Arc::new(ctx))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_root_banner() {
    let (status, body) = send(app(common::context()), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "AURA Mental Health Chatbot API");
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_health_reports_components() {
    let (status, body) = send(app(common::context()), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["trained_model_loaded"], true);
    assert_eq!(body["distress_model_loaded"], false);
    assert_eq!(body["distress_model"], "unloaded");
    assert_eq!(body["gemini_enabled"], false);
    assert_eq!(body["ai_provider"], "trained_model");
    assert_eq!(body["corpus_entries"], 2);
}

#[tokio::test]
async fn test_modes_at_root_and_api() {
    for uri in ["/modes", "/api/modes"] {
        let (status, body) = send(app(common::context()), Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["modes"],
            json!([
                {"id": "friend", "name": "Friend Mode", "description": "Casual, supportive conversations"},
                {"id": "professional", "name": "Professional Mode", "description": "Professional therapeutic guidance"}
            ])
        );
    }
}

#[tokio::test]
async fn test_chat_round_trip() {
    let (status, body) = send(
        app(common::context()),
        Method::POST,
        "/api/chat",
        Some(r#"{"message": "I'm feeling anxious about exams", "mode": "professional", "useAI": false}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "counseling_dataset");
    assert_eq!(body["mode"], "professional");
    assert_eq!(body["response"], common::ANXIETY_REPLY);
    assert!(body.get("distress_detection").is_none());
}

#[tokio::test]
async fn test_chat_crisis_payload() {
    let (status, body) = send(
        app(common::context()),
        Method::POST,
        "/chat",
        Some(r#"{"message": "I want to kill myself"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let distress = &body["distress_detection"];
    assert_eq!(distress["is_distress"], true);
    assert_eq!(distress["confidence"], 1.0);
    assert_eq!(distress["distress_probability"], 1.0);
    assert_eq!(distress["requires_crisis_intervention"], true);
}

#[tokio::test]
async fn test_chat_rejects_missing_message() {
    let (status, body) = send(app(common::context()), Method::POST, "/api/chat", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
}

#[tokio::test]
async fn test_chat_rejects_malformed_json() {
    let (status, body) = send(app(common::context()), Method::POST, "/api/chat", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(app(common::context()), Method::POST, "/api/chat", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assessment_endpoints() {
    let (status, body) = send(app(common::context()), Method::GET, "/api/assessment/questions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);

    let (status, body) = send(
        app(common::context()),
        Method::POST,
        "/api/assessment/submit",
        Some(r#"{"1": 8, "2": "Good", "3": "A little", "4": "Rarely", "5": "Not at all"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 24 + 15 + 15 + 12 + 15
    assert_eq!(body["score"], 81);
    assert_eq!(body["max_score"], 100);
    assert_eq!(body["status"], "excellent");

    let (status, body) = send(app(common::context()), Method::POST, "/api/assessment/submit", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data provided");
}

#[tokio::test]
async fn test_affirmation_and_strategies() {
    let (status, body) = send(app(common::context()), Method::GET, "/api/affirmation", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["affirmation"].as_str().is_some_and(|a| !a.is_empty()));

    let (status, body) = send(app(common::context()), Method::GET, "/api/strategies", None).await;
    assert_eq!(status, StatusCode::OK);
    for kind in ["anxiety", "depression", "stress", "general_wellness"] {
        assert_eq!(body["strategies"][kind].as_array().unwrap().len(), 5);
    }
}

#[tokio::test]
async fn test_failed_reload_keeps_serving() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = common::context();
    ctx.config.model_path = dir.path().join("missing.json");
    let app = app(ctx);

    let (status, body) = send(app.clone(), Method::POST, "/api/model/reload", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (status, _) = send(app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reload_installs_saved_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    common::trained_model().save(&path).unwrap();

    let mut ctx = common::context();
    ctx.config.model_path = path;
    let ctx = Arc::new(ctx);
    let app = create_router(Arc::clone(&ctx));

    let (status, body) = send(app, Method::POST, "/api/model/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reloaded"], true);
    assert_eq!(body["model_kind"], "logistic");
    assert!(ctx.model.is_ready());

    let (_, health) = send(create_router(Arc::clone(&ctx)), Method::GET, "/api/health", None).await;
    assert_eq!(health["distress_model"], "logistic");
}

#[tokio::test]
async fn test_panicking_classifier_still_answers() {
    let ctx = common::context().with_classifier(Arc::new(common::PanickingClassifier));
    let (status, body) = send(
        app(ctx),
        Method::POST,
        "/api/chat",
        Some(r#"{"message": "I want to kill myself"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["distress_detection"]["requires_crisis_intervention"], true);
}

#[tokio::test]
async fn test_unknown_route_and_missing_recorder() {
    let (status, body) = send(app(common::context()), Method::GET, "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");

    let (status, _) = send(app(common::context()), Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
