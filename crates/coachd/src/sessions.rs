//! In-memory conversation session store.
//!
//! Sessions are kept only for the life of the process. There is no
//! background reaper; idle sessions are removed by an explicit sweep from
//! the admin endpoint or the CLI.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use coach_core::session::{Message, UserSession};
use coach_core::AgentKind;
use tracing::info;

#[derive(Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<String, UserSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, UserSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Create the session if it does not exist yet.
    pub fn ensure(&self, session_id: &str, user_id: Option<String>) {
        let mut sessions = self.lock();
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| UserSession::new(session_id, user_id));
    }

    /// Append a user turn and bump last activity.
    pub fn record_user_message(&self, session_id: &str, text: &str) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(session_id) {
            session.conversation_history.push(Message::from_user(text));
            session.last_activity = Utc::now();
        }
    }

    /// Append a bot turn, remember which agent answered, bump activity.
    pub fn record_bot_message(&self, session_id: &str, text: &str, agent: AgentKind) {
        let mut sessions = self.lock();
        if let Some(session) = sessions.get_mut(session_id) {
            session
                .conversation_history
                .push(Message::from_bot(text, agent));
            session.state.current_agent = Some(agent);
            session.last_activity = Utc::now();
        }
    }

    /// Snapshot of one session.
    pub fn get(&self, session_id: &str) -> Option<UserSession> {
        self.lock().get(session_id).cloned()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Remove sessions idle for strictly longer than `max_age`.
    ///
    /// A session whose idle time equals `max_age` exactly is retained.
    /// Returns the number of removed sessions.
    pub fn sweep(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.last_activity >= cutoff);
        let removed = before - sessions.len();
        if removed > 0 {
            info!("swept {removed} idle session(s)");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent() {
        let manager = SessionManager::new();
        manager.ensure("s1", Some("u1".to_string()));
        manager.record_user_message("s1", "hello");
        manager.ensure("s1", None);
        let session = manager.get("s1").unwrap();
        assert_eq!(session.conversation_history.len(), 1);
        assert_eq!(session.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn messages_are_recorded_in_order() {
        let manager = SessionManager::new();
        manager.ensure("s1", None);
        manager.record_user_message("s1", "assess me");
        manager.record_bot_message("s1", "sure", AgentKind::SkillCoach);

        let session = manager.get("s1").unwrap();
        assert_eq!(session.conversation_history.len(), 2);
        assert_eq!(session.conversation_history[0].text, "assess me");
        assert_eq!(session.conversation_history[1].agent, Some(AgentKind::SkillCoach));
        assert_eq!(session.state.current_agent, Some(AgentKind::SkillCoach));
    }

    #[test]
    fn sweep_removes_only_stale_sessions() {
        let manager = SessionManager::new();
        manager.ensure("fresh", None);
        manager.ensure("stale", None);
        {
            let mut sessions = manager.lock();
            let stale = sessions.get_mut("stale").unwrap();
            stale.last_activity = Utc::now() - Duration::hours(30);
        }

        let removed = manager.sweep(Duration::hours(24));
        assert_eq!(removed, 1);
        assert!(manager.get("fresh").is_some());
        assert!(manager.get("stale").is_none());
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn session_at_exactly_max_age_is_retained() {
        let manager = SessionManager::new();
        manager.ensure("edge", None);
        let cutoff_age = Duration::hours(24);
        {
            let mut sessions = manager.lock();
            // Slightly younger than the cutoff computed inside sweep.
            sessions.get_mut("edge").unwrap().last_activity =
                Utc::now() - cutoff_age + Duration::seconds(1);
        }
        assert_eq!(manager.sweep(cutoff_age), 0);
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn recording_into_missing_session_is_a_no_op() {
        let manager = SessionManager::new();
        manager.record_user_message("ghost", "anyone?");
        assert_eq!(manager.count(), 0);
    }
}
