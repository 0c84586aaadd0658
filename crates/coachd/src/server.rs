//! HTTP API for coachd.
//!
//! Local-only REST surface bound to 127.0.0.1. Request and response
//! envelopes use camelCase keys; the agent payloads inside them keep
//! their own snake_case shape.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::manager::AgentManager;

/// Shared state for HTTP handlers.
pub struct AppState {
    pub manager: Arc<AgentManager>,
    /// Default sweep age when the request does not carry one.
    pub session_max_age_hours: u32,
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/agents/skill-coach", post(skill_coach))
        .route("/agents/skill-assessor", post(skill_assessor))
        .route("/status", get(status))
        .route("/sessions/sweep", post(sweep_sessions))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn start_server(
    manager: Arc<AgentManager>,
    port: u16,
    session_max_age_hours: u32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = Arc::new(AppState {
        manager,
        session_max_age_hours,
    });

    let router = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

// --- Request/Response types ---

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: None,
        }
    }

    fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// Request payload for POST /agents/skill-coach.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Request payload for POST /agents/skill-assessor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessRequest {
    #[serde(default)]
    pub responses: Option<Value>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Request payload for POST /sessions/sweep.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SweepRequest {
    #[serde(default)]
    pub max_age_hours: Option<u32>,
}

// --- Handlers ---

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /agents/skill-coach - Chat with the coach.
async fn skill_coach(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let Some(message) = req.message.as_ref().and_then(Value::as_str) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Message is required and must be a string")),
        ));
    };

    let response = state
        .manager
        .process_user_message(message, req.user_id, req.session_id)
        .await;

    if !response.success {
        let message = response
            .error
            .as_ref()
            .map_or_else(|| "Unknown error".to_string(), |e| e.message.clone());
        warn!("coach request failed: {message}");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_message("Internal server error", message)),
        ));
    }

    let agent_name = response.agent_name.clone();
    Ok(Json(json!({
        "success": true,
        "response": response,
        "agentName": agent_name,
        "timestamp": Utc::now(),
    })))
}

/// POST /agents/skill-assessor - Process an assessment.
async fn skill_assessor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssessRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let valid = req
        .responses
        .as_ref()
        .and_then(Value::as_array)
        .is_some_and(|responses| responses.len() == 10);
    if !valid {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Invalid assessment responses. Expected 10 responses.",
            )),
        ));
    }

    let responses = req.responses.unwrap_or_default();
    let response = state
        .manager
        .process_assessment(responses, req.user_id, req.session_id)
        .await;

    if !response.success {
        let message = response
            .error
            .as_ref()
            .map_or_else(|| "Assessment failed".to_string(), |e| e.message.clone());
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))));
    }

    let agent_name = response.agent_name.clone();
    Ok(Json(json!({
        "success": true,
        "results": response.payload,
        "agentName": agent_name,
        "timestamp": Utc::now(),
    })))
}

/// GET /status - Agent status and session counters.
async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "agents": state.manager.statuses(),
        "sessions": state.manager.sessions().count(),
    }))
}

/// POST /sessions/sweep - Remove idle sessions.
async fn sweep_sessions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SweepRequest>,
) -> impl IntoResponse {
    let hours = req.max_age_hours.unwrap_or(state.session_max_age_hours);
    let removed = state
        .manager
        .sessions()
        .sweep(chrono::Duration::hours(i64::from(hours)));
    Json(json!({ "removed": removed }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, Completion, CompletionOptions, LlmError, TextCompletion};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::path::Path;
    use tower::ServiceExt;

    struct OfflineLlm;

    #[async_trait]
    impl TextCompletion for OfflineLlm {
        async fn generate(
            &self,
            _messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<Completion, LlmError> {
            Err(LlmError::MissingApiKey)
        }
    }

    async fn test_state() -> Arc<AppState> {
        let manager = Arc::new(AgentManager::new(
            Arc::new(OfflineLlm),
            Path::new("/nonexistent/catalog.csv"),
        ));
        manager.initialize().await.unwrap();
        Arc::new(AppState {
            manager,
            session_max_age_hours: 24,
        })
    }

    async fn send(router: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let router = create_router(test_state().await);
        let (status, body) = send(router, "GET", "/health", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"].as_str(), Some("ok"));
    }

    #[tokio::test]
    async fn chat_requires_a_string_message() {
        let state = test_state().await;

        let (status, body) = send(
            create_router(Arc::clone(&state)),
            "POST",
            "/agents/skill-coach",
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"].as_bool(), Some(false));
        assert_eq!(
            body["error"].as_str(),
            Some("Message is required and must be a string")
        );

        let (status, _) = send(
            create_router(state),
            "POST",
            "/agents/skill-coach",
            json!({ "message": 42 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_answers_with_agent_envelope() {
        let (status, body) = send(
            create_router(test_state().await),
            "POST",
            "/agents/skill-coach",
            json!({ "message": "assess my skills", "sessionId": "s1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"].as_bool(), Some(true));
        assert_eq!(body["agentName"].as_str(), Some("SkillCoach"));
        assert_eq!(
            body["response"]["response_type"].as_str(),
            Some("assessment_coordination")
        );
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn assessor_rejects_wrong_length() {
        let (status, body) = send(
            create_router(test_state().await),
            "POST",
            "/agents/skill-assessor",
            json!({ "responses": [{ "question_id": "comp_1", "score": 1 }] }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"].as_str(),
            Some("Invalid assessment responses. Expected 10 responses.")
        );
    }

    #[tokio::test]
    async fn assessor_returns_results() {
        let mut responses = Vec::new();
        for i in 1..=5 {
            responses.push(json!({ "question_id": format!("comp_{i}"), "score": 2 }));
        }
        for i in 1..=5 {
            responses.push(json!({ "question_id": format!("cap_{i}"), "score": 3 }));
        }

        let (status, body) = send(
            create_router(test_state().await),
            "POST",
            "/agents/skill-assessor",
            json!({ "responses": responses }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"].as_bool(), Some(true));
        assert_eq!(body["agentName"].as_str(), Some("SkillAssessor"));
        assert_eq!(
            body["results"]["results"]["quadrant"].as_str(),
            Some("expert_practitioner")
        );
    }

    #[tokio::test]
    async fn assessor_maps_agent_failure_to_bad_request() {
        // Ten entries that do not split five/five across dimensions.
        let mut responses = Vec::new();
        for i in 1..=10 {
            responses.push(json!({ "question_id": format!("comp_{i}"), "score": 1 }));
        }
        let (status, body) = send(
            create_router(test_state().await),
            "POST",
            "/agents/skill-assessor",
            json!({ "responses": responses }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"].as_bool(), Some(false));
    }

    #[tokio::test]
    async fn wrong_method_is_rejected() {
        let (status, _) = send(
            create_router(test_state().await),
            "GET",
            "/agents/skill-coach",
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn status_reports_agents_and_sessions() {
        let state = test_state().await;
        state
            .manager
            .process_user_message("hello", None, Some("s1".to_string()))
            .await;

        let (status, body) = send(create_router(state), "GET", "/status", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["agents"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["sessions"].as_u64(), Some(1));
    }

    #[tokio::test]
    async fn sweep_reports_removed_count() {
        let state = test_state().await;
        state
            .manager
            .process_user_message("hello", None, Some("s1".to_string()))
            .await;

        let (status, body) = send(
            create_router(state),
            "POST",
            "/sessions/sweep",
            json!({ "maxAgeHours": 0 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"].as_u64(), Some(1));
    }
}
