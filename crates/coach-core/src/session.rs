//! Conversation session types.
//!
//! Sessions live only in the daemon's memory; there is no persistence.
//! Lifetime management (creation, activity bumps, sweeping) is done by
//! the daemon's session manager.

use crate::types::{AgentKind, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// One turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Id,
    pub text: String,
    pub sender: Sender,
    /// Agent that produced a bot message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentKind>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            text: text.into(),
            sender: Sender::User,
            agent: None,
            timestamp: Utc::now(),
        }
    }

    pub fn from_bot(text: impl Into<String>, agent: AgentKind) -> Self {
        Self {
            id: Id::new(),
            text: text.into(),
            sender: Sender::Bot,
            agent: Some(agent),
            timestamp: Utc::now(),
        }
    }
}

/// User-facing preferences stored with a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub language: String,
    pub notifications: bool,
    pub learning_reminders: bool,
    pub progress_tracking: bool,
    pub public_profile: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            notifications: true,
            learning_reminders: true,
            progress_tracking: true,
            public_profile: false,
        }
    }
}

/// Mutable per-session state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_agent: Option<AgentKind>,
    #[serde(default)]
    pub preferences: UserPreferences,
}

/// A user's conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub conversation_history: Vec<Message>,
    pub state: SessionState,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl UserSession {
    pub fn new(session_id: impl Into<String>, user_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            user_id,
            conversation_history: Vec::new(),
            state: SessionState::default(),
            metadata: HashMap::new(),
            created_at: now,
            last_activity: now,
        }
    }
}
