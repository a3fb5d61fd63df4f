//! HTTP routes and handlers
//!
//! Every route is served at the root and again under `/api`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::CorsConfig;
use crate::context::AppState;
use crate::orchestrator::{self, ChatError, ChatRequest, ChatResponse};
use aura_classifiers::DistressClassifier;
use aura_core::ChatMode;
use aura_responses::wellness::{self, ASSESSMENT_QUESTIONS};

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);
    Router::new()
        .route("/", get(root))
        .merge(api_routes())
        .nest("/api", api_routes())
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/modes", get(modes))
        .route("/metrics", get(metrics))
        .route("/assessment/questions", get(assessment_questions))
        .route("/assessment/submit", post(assessment_submit))
        .route("/affirmation", get(affirmation))
        .route("/strategies", get(strategies))
        .route("/model/reload", post(reload_model))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allow_any_origin {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "AURA Mental Health Chatbot API",
        "status": "running",
        "endpoints": {
            "chat": "/api/chat (POST)",
            "health": "/api/health (GET)",
            "modes": "/api/modes (GET)",
            "assessment": "/api/assessment/questions (GET), /api/assessment/submit (POST)",
            "affirmation": "/api/affirmation (GET)",
            "strategies": "/api/strategies (GET)",
            "metrics": "/api/metrics (GET)",
        }
    }))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    let response = orchestrator::handle_chat(&state, request)
        .instrument(span)
        .await?;
    Ok(Json(response))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let generation_model = state.generator.as_ref().map(|g| g.model_id().to_string());
    Json(json!({
        "status": "healthy",
        "trained_model_loaded": state.local.has_patterns(),
        "distress_model_loaded": state.model.is_ready(),
        "distress_model": state.model.name(),
        "gemini_enabled": state.generation_enabled(),
        "ai_provider": if state.generation_enabled() { "gemini" } else { "trained_model" },
        "generation_model": generation_model,
        "corpus_entries": state.corpus.len(),
    }))
}

async fn modes() -> Json<Value> {
    let modes: Vec<Value> = ChatMode::ALL
        .iter()
        .map(|mode| {
            json!({
                "id": mode.as_str(),
                "name": mode.display_name(),
                "description": mode.description(),
            })
        })
        .collect();
    Json(json!({ "modes": modes }))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

async fn assessment_questions() -> Json<Value> {
    Json(json!({ "questions": ASSESSMENT_QUESTIONS }))
}

async fn assessment_submit(
    payload: Result<Json<HashMap<String, Value>>, JsonRejection>,
) -> Result<Json<wellness::AssessmentResult>, AppError> {
    let Json(answers) = payload?;
    if answers.is_empty() {
        return Err(AppError::BadRequest("No data provided".to_string()));
    }
    Ok(Json(wellness::analyze_assessment(&answers)))
}

async fn affirmation() -> Json<Value> {
    Json(json!({ "affirmation": wellness::random_affirmation() }))
}

async fn strategies() -> Json<Value> {
    Json(json!({ "strategies": wellness::all_strategies() }))
}

/// Re-read the configured artifact; the previous model keeps serving on error
async fn reload_model(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let handle = Arc::clone(&state.model);
    let path = state.config.model_path.clone();

    let model = tokio::task::spawn_blocking(move || handle.reload(&path))
        .await
        .map_err(|e| AppError::Internal(format!("reload task failed: {e}")))?
        .map_err(|e| {
            error!(error = %e, "Model reload failed; keeping the current model");
            AppError::Internal(e.to_string())
        })?;

    info!(kind = model.kind().as_str(), "Model reload complete");
    Ok(Json(json!({
        "reloaded": true,
        "model_kind": model.kind().as_str(),
        "trained_at": model.trained_at(),
        "test_accuracy": model.report().test.accuracy,
    })))
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound,
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => AppError::BadRequest(err.to_string()),
            ChatError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
