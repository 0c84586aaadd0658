//! HTTP client for the coachd daemon.

use chrono::{DateTime, Utc};
use coach_core::{AgentResponse, AgentStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running at {addr}\n  → start with: coachd\n  → or set COACHD_ADDR if using a different address")]
    ConnectionFailed { addr: String },

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(
        "daemon not ready after {timeout_ms}ms at {addr}\n  → ensure coachd is running"
    )]
    DaemonNotReady { addr: String, timeout_ms: u64 },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            let addr = e
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            ClientError::ConnectionFailed { addr }
        } else {
            ClientError::HttpError {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

/// Request payload for POST /agents/skill-coach.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Response from the chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: AgentResponse,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Request payload for POST /agents/skill-assessor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessRequest {
    pub responses: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Response from the assessment endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessResponse {
    pub success: bool,
    pub results: Value,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Response from the status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub agents: Vec<AgentStatus>,
    pub sessions: usize,
}

/// Response from the session sweep endpoint.
#[derive(Debug, Deserialize)]
pub struct SweepResponse {
    pub removed: usize,
}

/// Error response from the API.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Default total timeout for the daemon readiness probe.
const DEFAULT_READY_TIMEOUT_MS: u64 = 5000;

/// Initial backoff delay for the readiness probe.
const INITIAL_BACKOFF_MS: u64 = 200;

/// HTTP client for coachd.
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Returns the daemon address (for error messages).
    pub fn addr(&self) -> &str {
        &self.base_url
    }

    /// Check if daemon is healthy by probing /health endpoint.
    pub async fn check_health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// Wait for the daemon to become ready with exponential backoff.
    pub async fn wait_for_ready(&self) -> Result<(), ClientError> {
        self.wait_for_ready_with_timeout(DEFAULT_READY_TIMEOUT_MS)
            .await
    }

    /// Wait for the daemon to become ready with a custom timeout.
    pub async fn wait_for_ready_with_timeout(&self, timeout_ms: u64) -> Result<(), ClientError> {
        let start = std::time::Instant::now();
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            match self.check_health().await {
                Ok(true) => return Ok(()),
                Ok(false) | Err(_) => {
                    let elapsed = start.elapsed().as_millis() as u64;
                    if elapsed >= timeout_ms {
                        return Err(ClientError::DaemonNotReady {
                            addr: self.base_url.clone(),
                            timeout_ms,
                        });
                    }

                    eprintln!(
                        "waiting for daemon at {} (retrying in {}ms)",
                        self.base_url, backoff_ms
                    );

                    let remaining = timeout_ms.saturating_sub(elapsed);
                    let sleep_ms = backoff_ms.min(remaining);
                    tokio::time::sleep(std::time::Duration::from_millis(sleep_ms)).await;

                    backoff_ms = backoff_ms.saturating_mul(2);
                }
            }
        }
    }

    /// Handle error response from the API.
    async fn handle_error(&self, response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| match e.message {
                Some(detail) => format!("{} ({})", e.error, detail),
                None => e.error,
            })
            .unwrap_or_else(|_| "unknown error".to_string());

        ClientError::HttpError { status, message }
    }

    /// Send a chat message to the coach.
    /// POST /agents/skill-coach
    pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, ClientError> {
        let url = format!("{}/agents/skill-coach", self.base_url);
        let response = self.http.post(&url).json(&req).send().await?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Submit assessment responses.
    /// POST /agents/skill-assessor
    pub async fn assess(&self, req: AssessRequest) -> Result<AssessResponse, ClientError> {
        let url = format!("{}/agents/skill-assessor", self.base_url);
        let response = self.http.post(&url).json(&req).send().await?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Get agent and session status.
    /// GET /status
    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        let url = format!("{}/status", self.base_url);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Sweep idle sessions.
    /// POST /sessions/sweep
    pub async fn sweep(&self, max_age_hours: Option<u32>) -> Result<SweepResponse, ClientError> {
        let url = format!("{}/sessions/sweep", self.base_url);
        let body = match max_age_hours {
            Some(hours) => serde_json::json!({ "maxAgeHours": hours }),
            None => serde_json::json!({}),
        };
        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = Client::new("http://localhost:7760/");
        assert_eq!(client.base_url, "http://localhost:7760");
    }

    #[test]
    fn client_preserves_url_without_trailing_slash() {
        let client = Client::new("http://localhost:7760");
        assert_eq!(client.base_url, "http://localhost:7760");
    }

    #[test]
    fn client_addr_returns_base_url() {
        let client = Client::new("http://localhost:7760");
        assert_eq!(client.addr(), "http://localhost:7760");
    }

    #[tokio::test]
    async fn check_health_fails_when_daemon_not_running() {
        let client = Client::new("http://127.0.0.1:19998");
        let result = client.check_health().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn wait_for_ready_times_out_when_daemon_not_running() {
        let client = Client::new("http://127.0.0.1:19998");
        let result = client.wait_for_ready_with_timeout(100).await;

        match result {
            Err(ClientError::DaemonNotReady { addr, timeout_ms }) => {
                assert_eq!(addr, "http://127.0.0.1:19998");
                assert_eq!(timeout_ms, 100);
            }
            _ => panic!("expected DaemonNotReady error"),
        }
    }

    #[test]
    fn connection_failed_error_suggests_start_command() {
        let err = ClientError::ConnectionFailed {
            addr: "http://127.0.0.1:7760".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("coachd"), "should suggest starting coachd");
        assert!(
            msg.contains("COACHD_ADDR"),
            "should mention COACHD_ADDR env var"
        );
    }

    #[test]
    fn daemon_not_ready_error_message_includes_hint() {
        let err = ClientError::DaemonNotReady {
            addr: "http://127.0.0.1:7760".to_string(),
            timeout_ms: 5000,
        };
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:7760"));
        assert!(msg.contains("5000ms"));
    }

    #[test]
    fn chat_request_omits_missing_ids() {
        let req = ChatRequest {
            message: "hello".to_string(),
            user_id: None,
            session_id: Some("s1".to_string()),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["message"].as_str(), Some("hello"));
        assert_eq!(json["sessionId"].as_str(), Some("s1"));
        assert!(json.get("userId").is_none());
    }
}
