//! Agent manager: owns the three agents and the session store.
//!
//! The language model client and the catalog path are injected, so tests
//! can run the whole stack with a fake model and a temp catalog.

use std::path::Path;
use std::sync::Arc;

use coach_core::{AgentKind, AgentRequest, AgentResponse, AgentStatus, Id};
use serde_json::json;
use tracing::info;

use crate::agents::{AssessorAgent, CoachAgent, MatcherAgent};
use crate::courses::catalog::load_catalog;
use crate::llm::TextCompletion;
use crate::runtime::Agent;
use crate::sessions::SessionManager;

pub struct AgentManager {
    coach: CoachAgent,
    assessor: AssessorAgent,
    matcher: MatcherAgent,
    sessions: SessionManager,
}

impl AgentManager {
    pub fn new(llm: Arc<dyn TextCompletion>, catalog_path: &Path) -> Self {
        let courses = load_catalog(catalog_path);
        Self {
            coach: CoachAgent::new(Arc::clone(&llm)),
            assessor: AssessorAgent::new(llm),
            matcher: MatcherAgent::new(courses),
            sessions: SessionManager::new(),
        }
    }

    /// Bring all agents to the ready state.
    pub async fn initialize(&self) -> eyre::Result<()> {
        self.coach.initialize().await?;
        self.assessor.initialize().await?;
        self.matcher.initialize().await?;
        info!(
            courses = self.matcher.course_count(),
            "agent manager initialized"
        );
        Ok(())
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Route a chat message through the coach, recording both turns in the
    /// session history.
    pub async fn process_user_message(
        &self,
        message: &str,
        user_id: Option<String>,
        session_id: Option<String>,
    ) -> AgentResponse {
        let session_id = session_id.unwrap_or_else(|| Id::new().to_string());
        self.sessions.ensure(&session_id, user_id.clone());
        self.sessions.record_user_message(&session_id, message);

        let mut request = AgentRequest::new("user_message", json!({ "message": message }));
        request.user_id = user_id;
        request.session_id = Some(session_id.clone());

        let response = self.coach.process_request(request).await;

        if let Some(text) = response.payload["message"].as_str() {
            self.sessions
                .record_bot_message(&session_id, text, AgentKind::SkillCoach);
        }
        response
    }

    /// Run a full assessment through the assessor agent.
    pub async fn process_assessment(
        &self,
        responses: serde_json::Value,
        user_id: Option<String>,
        session_id: Option<String>,
    ) -> AgentResponse {
        let mut request =
            AgentRequest::new("process_assessment", json!({ "responses": responses }));
        request.user_id = user_id;
        request.session_id = session_id;
        self.assessor.process_request(request).await
    }

    /// Dispatch an arbitrary request to the named agent.
    pub async fn dispatch(&self, kind: AgentKind, request: AgentRequest) -> AgentResponse {
        match kind {
            AgentKind::SkillCoach => self.coach.process_request(request).await,
            AgentKind::SkillAssessor => self.assessor.process_request(request).await,
            AgentKind::CourseMatcher => self.matcher.process_request(request).await,
        }
    }

    /// Status snapshots for all agents.
    pub fn statuses(&self) -> Vec<AgentStatus> {
        vec![
            self.coach.core().status(),
            self.assessor.core().status(),
            self.matcher.core().status(),
        ]
    }

    /// Release agent resources.
    pub async fn cleanup(&self) -> eyre::Result<()> {
        self.coach.cleanup().await?;
        self.assessor.cleanup().await?;
        self.matcher.cleanup().await?;
        Ok(())
    }
}
