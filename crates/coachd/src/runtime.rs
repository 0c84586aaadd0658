//! Agent runtime base.
//!
//! [`AgentCore`] holds the shared state every agent carries (identity,
//! lifecycle state, metrics, response listeners). The [`Agent`] trait adds
//! the per-agent dispatch logic and provides the request driver, so a
//! failing handler produces an error response instead of a panic.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coach_core::{
    AgentError, AgentKind, AgentMetrics, AgentRequest, AgentResponse, AgentState, AgentStatus,
    Capability, ErrorCode, Id,
};
use tracing::{debug, error, warn};

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&AgentResponse) -> eyre::Result<()> + Send + Sync>;

/// State shared by all agents.
pub struct AgentCore {
    kind: AgentKind,
    capabilities: Vec<Capability>,
    state: Mutex<AgentState>,
    metrics: Mutex<AgentMetrics>,
    last_activity: Mutex<DateTime<Utc>>,
    listeners: Mutex<HashMap<ListenerId, Listener>>,
    next_listener: Mutex<u64>,
}

impl AgentCore {
    pub fn new(kind: AgentKind, capabilities: Vec<Capability>) -> Self {
        Self {
            kind,
            capabilities,
            state: Mutex::new(AgentState::Initializing),
            metrics: Mutex::new(AgentMetrics::default()),
            last_activity: Mutex::new(Utc::now()),
            listeners: Mutex::new(HashMap::new()),
            next_listener: Mutex::new(0),
        }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn state(&self) -> AgentState {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn set_state(&self, state: AgentState) {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = state;
    }

    /// Snapshot of identity, state and counters.
    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            name: self.name().to_string(),
            kind: self.kind,
            state: self.state(),
            last_activity: Some(
                *self
                    .last_activity
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner),
            ),
            metrics: self
                .metrics
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone(),
        }
    }

    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Utc::now();
    }

    fn record(&self, elapsed_ms: f64, error: Option<&AgentError>) {
        let mut metrics = self
            .metrics
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        metrics.record(elapsed_ms, error.is_some());
        if let Some(error) = error {
            metrics.last_error = Some(error.clone());
        }
    }

    /// Register a response listener; returns a handle for removal.
    pub fn add_listener(&self, listener: Listener) -> ListenerId {
        let mut next = self
            .next_listener
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = ListenerId(*next);
        *next += 1;
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id, listener);
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn clear_listeners(&self) {
        self.listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    /// Notify listeners of a response. A failing listener is logged and
    /// never affects the others or the response itself.
    fn emit(&self, response: &AgentResponse) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for listener in listeners.values() {
            if let Err(e) = listener(response) {
                warn!(agent = self.name(), "response listener failed: {e}");
            }
        }
    }

    /// Build a successful response to `request`.
    pub fn ok_response(
        &self,
        request: &AgentRequest,
        response_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> AgentResponse {
        AgentResponse {
            id: Id::new(),
            request_id: request.id.clone(),
            response_type: response_type.into(),
            payload,
            agent_name: self.name().to_string(),
            success: true,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Build a failed response to `request`.
    pub fn error_response(
        &self,
        request: &AgentRequest,
        response_type: impl Into<String>,
        payload: serde_json::Value,
        error: AgentError,
    ) -> AgentResponse {
        AgentResponse {
            id: Id::new(),
            request_id: request.id.clone(),
            response_type: response_type.into(),
            payload,
            agent_name: self.name().to_string(),
            success: false,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }
}

/// An agent: shared core plus request-type dispatch.
#[async_trait]
pub trait Agent: Send + Sync {
    fn core(&self) -> &AgentCore;

    /// One-time setup. Transitions the agent to `Ready` on success.
    async fn initialize(&self) -> eyre::Result<()> {
        self.core().set_state(AgentState::Ready);
        Ok(())
    }

    /// Handle a request the agent recognizes.
    ///
    /// Returns `Ok(None)` for an unknown `request_type`; the driver turns
    /// that into an `UNKNOWN_REQUEST_TYPE` response.
    async fn dispatch(&self, request: &AgentRequest) -> eyre::Result<Option<AgentResponse>>;

    /// Release resources. Safe to call more than once.
    async fn cleanup(&self) -> eyre::Result<()> {
        self.core().set_state(AgentState::Cleanup);
        self.core().clear_listeners();
        Ok(())
    }

    /// Request driver: lifecycle transitions, metrics, listener dispatch.
    ///
    /// Always produces a response; handler errors become `INTERNAL_ERROR`
    /// responses rather than propagating.
    async fn process_request(&self, request: AgentRequest) -> AgentResponse {
        let core = self.core();
        core.set_state(AgentState::Busy);
        core.touch();
        let started = Instant::now();

        debug!(
            agent = core.name(),
            request_id = %request.id,
            request_type = %request.request_type,
            "processing request"
        );

        let response = match self.dispatch(&request).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                let error = AgentError::new(
                    ErrorCode::UnknownRequestType,
                    format!("Request type not supported: {}", request.request_type),
                );
                core.error_response(&request, "error", serde_json::Value::Null, error)
            }
            Err(e) => {
                error!(
                    agent = core.name(),
                    request_id = %request.id,
                    "request handler failed: {e}"
                );
                let error = AgentError::new(ErrorCode::InternalError, e.to_string());
                core.error_response(&request, "error", serde_json::Value::Null, error)
            }
        };

        #[allow(clippy::cast_precision_loss)]
        let elapsed_ms = started.elapsed().as_millis() as f64;
        core.record(elapsed_ms, response.error.as_ref());
        core.set_state(AgentState::Ready);
        core.emit(&response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct EchoAgent {
        core: AgentCore,
    }

    impl EchoAgent {
        fn new() -> Self {
            Self {
                core: AgentCore::new(AgentKind::SkillCoach, Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Agent for EchoAgent {
        fn core(&self) -> &AgentCore {
            &self.core
        }

        async fn dispatch(&self, request: &AgentRequest) -> eyre::Result<Option<AgentResponse>> {
            match request.request_type.as_str() {
                "echo" => Ok(Some(self.core.ok_response(
                    request,
                    "echoed",
                    request.payload.clone(),
                ))),
                "boom" => Err(eyre::eyre!("handler exploded")),
                _ => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn known_request_type_succeeds() {
        let agent = EchoAgent::new();
        let request = AgentRequest::new("echo", serde_json::json!({"x": 1}));
        let response = agent.process_request(request).await;
        assert!(response.success);
        assert_eq!(response.response_type, "echoed");
        assert_eq!(agent.core().status().metrics.requests_processed, 1);
        assert_eq!(agent.core().state(), AgentState::Ready);
    }

    #[tokio::test]
    async fn status_snapshot_carries_activity_timestamp() {
        let agent = EchoAgent::new();
        let before = agent.core().status().last_activity.unwrap();

        agent
            .process_request(AgentRequest::new("echo", serde_json::json!({})))
            .await;

        let after = agent.core().status().last_activity.unwrap();
        assert!(after >= before);
    }

    #[tokio::test]
    async fn unknown_request_type_is_reported() {
        let agent = EchoAgent::new();
        let response = agent
            .process_request(AgentRequest::new("mystery", serde_json::Value::Null))
            .await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(ErrorCode::UnknownRequestType)
        );
    }

    #[tokio::test]
    async fn handler_error_becomes_internal_error() {
        let agent = EchoAgent::new();
        let response = agent
            .process_request(AgentRequest::new("boom", serde_json::Value::Null))
            .await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(ErrorCode::InternalError)
        );
        let status = agent.core().status();
        assert_eq!(status.metrics.error_count, 1);
        assert!(status.metrics.last_error.is_some());
        // The agent is back to ready after a failure.
        assert_eq!(status.state, AgentState::Ready);
    }

    #[tokio::test]
    async fn listeners_fire_and_failures_are_isolated() {
        let agent = EchoAgent::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&seen);
        agent.core().add_listener(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        agent
            .core()
            .add_listener(Box::new(|_| Err(eyre::eyre!("listener broke"))));
        let counter = Arc::clone(&seen);
        agent.core().add_listener(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        agent
            .process_request(AgentRequest::new("echo", serde_json::Value::Null))
            .await;
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn remove_listener_stops_delivery() {
        let agent = EchoAgent::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let id = agent.core().add_listener(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        assert!(agent.core().remove_listener(id));
        assert!(!agent.core().remove_listener(id));

        agent
            .process_request(AgentRequest::new("echo", serde_json::Value::Null))
            .await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cleanup_is_repeatable() {
        let agent = EchoAgent::new();
        agent.core().add_listener(Box::new(|_| Ok(())));
        agent.cleanup().await.unwrap();
        agent.cleanup().await.unwrap();
        assert_eq!(agent.core().state(), AgentState::Cleanup);
    }
}
