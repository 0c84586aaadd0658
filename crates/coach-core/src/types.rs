//! Core types shared by the daemon and the CLI client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for requests, responses, messages, and sessions.
/// Uses `UUIDv7` for time-ordered lexicographic sorting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub String);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// --- Enumerations ---

/// The three agent roles in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    SkillCoach,
    SkillAssessor,
    CourseMatcher,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkillCoach => "skill_coach",
            Self::SkillAssessor => "skill_assessor",
            Self::CourseMatcher => "course_matcher",
        }
    }

    /// Display name used on response envelopes.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SkillCoach => "SkillCoach",
            Self::SkillAssessor => "SkillAssessor",
            Self::CourseMatcher => "CourseMatcher",
        }
    }
}

/// Agent lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Initializing,
    Ready,
    Busy,
    Error,
    Cleanup,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Busy => "busy",
            Self::Error => "error",
            Self::Cleanup => "cleanup",
        }
    }
}

/// Priority attached to skill gaps and course recommendations.
///
/// Ordering is by urgency: `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Numeric weight for sorting (high first).
    pub fn weight(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Stable error codes carried on failed agent responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownRequestType,
    InvalidResponses,
    InvalidSkillGaps,
    InvalidRecommendations,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownRequestType => "UNKNOWN_REQUEST_TYPE",
            Self::InvalidResponses => "INVALID_RESPONSES",
            Self::InvalidSkillGaps => "INVALID_SKILL_GAPS",
            Self::InvalidRecommendations => "INVALID_RECOMMENDATIONS",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

// --- Request/response envelopes ---

/// Structured error attached to a failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AgentError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }
}

/// A request routed to an agent. Immutable once constructed.
///
/// `request_type` is an open string so unknown values can be answered with
/// `UNKNOWN_REQUEST_TYPE` instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub id: Id,
    pub request_type: String,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AgentRequest {
    pub fn new(request_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Id::new(),
            request_type: request_type.into(),
            payload,
            user_id: None,
            session_id: None,
            created_at: Utc::now(),
        }
    }
}

/// The single response produced for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub id: Id,
    pub request_id: Id,
    pub response_type: String,
    pub payload: serde_json::Value,
    pub agent_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AgentError>,
    pub timestamp: DateTime<Utc>,
}

/// A capability advertised by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub input_types: Vec<String>,
    pub output_types: Vec<String>,
}

impl Capability {
    pub fn new(
        name: &str,
        description: &str,
        input_types: &[&str],
        output_types: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_types: input_types.iter().map(ToString::to_string).collect(),
            output_types: output_types.iter().map(ToString::to_string).collect(),
        }
    }
}

// --- Status and metrics snapshots ---

/// Per-agent performance counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub requests_processed: u64,
    /// Running average over all processed requests.
    pub average_response_time_ms: f64,
    pub error_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<AgentError>,
}

impl AgentMetrics {
    /// Fold one observation into the running average.
    pub fn record(&mut self, elapsed_ms: f64, is_error: bool) {
        self.requests_processed += 1;
        let n = self.requests_processed as f64;
        self.average_response_time_ms =
            (self.average_response_time_ms * (n - 1.0) + elapsed_ms) / n;
        if is_error {
            self.error_count += 1;
        }
    }
}

/// Point-in-time snapshot of an agent's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    pub name: String,
    pub kind: AgentKind,
    pub state: AgentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    pub metrics: AgentMetrics,
}
