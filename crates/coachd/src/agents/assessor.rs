//! Skill assessor agent.
//!
//! Scores ten-question assessments, places the learner in a skill
//! quadrant, and derives gap analyses and reports. All scoring is
//! deterministic; the language model only decorates results with
//! explanations and falls back to canned text when unavailable.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use coach_core::assessment::{
    calculate_capability_score, calculate_competency_score, generate_recommendations,
    identify_skill_gaps, improvement_areas, recommended_focus, response_distribution,
    results_summary, strength_areas, AssessmentResponse, AssessmentResults, SkillGap,
    SkillQuadrant,
};
use coach_core::{AgentError, AgentKind, AgentRequest, AgentResponse, Capability, ErrorCode, Priority};
use serde_json::{json, Value};

use crate::llm::{generate_or, ChatMessage, CompletionOptions, TextCompletion};
use crate::runtime::{Agent, AgentCore};

const EXPLANATION_FALLBACK: &str =
    "Based on your assessment, we've identified specific areas for skill development.";
const INSIGHTS_FALLBACK: &str =
    "Your assessment shows a unique learning profile that can guide your skill development journey.";

pub struct AssessorAgent {
    core: AgentCore,
    llm: Arc<dyn TextCompletion>,
}

impl AssessorAgent {
    pub fn new(llm: Arc<dyn TextCompletion>) -> Self {
        let capabilities = vec![
            Capability::new(
                "assessment_processing",
                "Process quiz responses and calculate competency/capability scores",
                &["assessment_responses", "quiz_data"],
                &["assessment_results", "skill_scores"],
            ),
            Capability::new(
                "score_calculation",
                "Calculate competency and capability scores from assessment data",
                &["raw_scores", "response_data"],
                &["competency_score", "capability_score", "overall_score"],
            ),
            Capability::new(
                "quadrant_analysis",
                "Determine skill quadrant placement based on scores",
                &["competency_score", "capability_score"],
                &["skill_quadrant", "quadrant_analysis"],
            ),
            Capability::new(
                "gap_analysis",
                "Identify skill gaps and improvement recommendations",
                &["assessment_results", "target_profile"],
                &["skill_gaps", "improvement_recommendations"],
            ),
        ];
        Self {
            core: AgentCore::new(AgentKind::SkillAssessor, capabilities),
            llm,
        }
    }

    fn parse_responses(payload: &Value) -> Option<Vec<AssessmentResponse>> {
        payload
            .get("responses")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    fn invalid_responses(&self, request: &AgentRequest) -> AgentResponse {
        self.core.error_response(
            request,
            "assessment_error",
            json!({ "message": "Invalid assessment responses. Expected 10 responses." }),
            AgentError::new(
                ErrorCode::InvalidResponses,
                "Assessment must contain exactly 10 responses",
            ),
        )
    }

    async fn explain_gaps(&self, gaps: &[SkillGap], quadrant: SkillQuadrant) -> String {
        let system = format!(
            "You are a skill development expert. Generate a clear, encouraging explanation of skill gaps and provide actionable recommendations.\n\n\
             Focus on:\n\
             - Explaining what each skill gap means in practical terms\n\
             - Why addressing these gaps is important for career growth\n\
             - Specific steps the user can take to improve\n\
             - Encouraging tone that motivates learning\n\n\
             User's skill profile: {}",
            quadrant.as_str()
        );
        let gaps_summary = gaps
            .iter()
            .map(|gap| {
                format!(
                    "{}: Current level {}, Target level {} ({} priority)",
                    gap.area,
                    gap.current_level,
                    gap.recommended_level,
                    gap.priority.as_str()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let messages = [
            ChatMessage::system(system),
            ChatMessage::user(format!(
                "Please explain these skill gaps and provide recommendations:\n{gaps_summary}"
            )),
        ];
        let options = CompletionOptions {
            max_tokens: Some(600),
            ..Default::default()
        };
        generate_or(self.llm.as_ref(), &messages, &options, EXPLANATION_FALLBACK).await
    }

    async fn personalized_insights(
        &self,
        responses: &[AssessmentResponse],
        competency_score: f64,
        capability_score: f64,
    ) -> String {
        let pattern: Vec<Value> = responses
            .iter()
            .map(|r| {
                json!({
                    "question": r.question_id,
                    "score": r.score,
                    "category": if r.is_competency() { "competency" } else { "capability" },
                })
            })
            .collect();

        let system = format!(
            "Based on assessment responses, generate personalized insights about learning patterns and preferences.\n\
             Competency Score: {competency_score:.2}/3\n\
             Capability Score: {capability_score:.2}/3\n\
             Response Pattern: {}\n\n\
             Provide specific, actionable insights about their learning style and development preferences.",
            Value::Array(pattern)
        );
        let messages = [
            ChatMessage::system(system),
            ChatMessage::user(
                "Generate personalized learning insights based on my assessment responses.",
            ),
        ];
        generate_or(
            self.llm.as_ref(),
            &messages,
            &CompletionOptions::default(),
            INSIGHTS_FALLBACK,
        )
        .await
    }

    /// Shared scoring pipeline for process_assessment and generate_report.
    async fn assessment_payload(&self, responses: &[AssessmentResponse]) -> eyre::Result<Value> {
        let competency_score = calculate_competency_score(responses)?;
        let capability_score = calculate_capability_score(responses)?;
        let quadrant = SkillQuadrant::from_scores(competency_score, capability_score);
        let skill_gaps = identify_skill_gaps(responses, competency_score, capability_score);
        let recommendations = generate_recommendations(quadrant, &skill_gaps);

        let ai_explanation = self.explain_gaps(&skill_gaps, quadrant).await;
        let personalized_insights = self
            .personalized_insights(responses, competency_score, capability_score)
            .await;

        let results = AssessmentResults {
            competency_score,
            capability_score,
            quadrant,
            skill_gaps,
            recommendations,
            completed_at: Utc::now(),
            ai_explanation: Some(ai_explanation.clone()),
            personalized_insights: Some(personalized_insights.clone()),
        };
        let summary = results_summary(&results);

        Ok(json!({
            "results": results,
            "summary": summary,
            "next_steps": quadrant.next_steps(),
            "ai_insights": {
                "explanation": ai_explanation,
                "insights": personalized_insights,
                "quadrant_description": quadrant.description(),
            },
        }))
    }

    async fn process_assessment(&self, request: &AgentRequest) -> eyre::Result<AgentResponse> {
        let Some(responses) = Self::parse_responses(&request.payload) else {
            return Ok(self.invalid_responses(request));
        };
        if responses.len() != 10 {
            return Ok(self.invalid_responses(request));
        }

        let payload = self.assessment_payload(&responses).await?;
        Ok(self.core.ok_response(request, "assessment_results", payload))
    }

    async fn calculate_scores(&self, request: &AgentRequest) -> eyre::Result<AgentResponse> {
        let Some(responses) = Self::parse_responses(&request.payload) else {
            return Ok(self.invalid_responses(request));
        };
        let competency_score = calculate_competency_score(&responses)?;
        let capability_score = calculate_capability_score(&responses)?;

        Ok(self.core.ok_response(
            request,
            "scores_calculated",
            json!({
                "competency_score": competency_score,
                "capability_score": capability_score,
                "overall_score": (competency_score + capability_score) / 2.0,
            }),
        ))
    }

    fn determine_quadrant(&self, request: &AgentRequest) -> AgentResponse {
        let competency = request.payload["competency_score"].as_f64().unwrap_or(0.0);
        let capability = request.payload["capability_score"].as_f64().unwrap_or(0.0);
        let quadrant = SkillQuadrant::from_scores(competency, capability);

        self.core.ok_response(
            request,
            "quadrant_determined",
            json!({
                "quadrant": quadrant,
                "description": quadrant.description(),
            }),
        )
    }

    fn analyze_gaps(&self, request: &AgentRequest) -> eyre::Result<AgentResponse> {
        let Some(responses) = Self::parse_responses(&request.payload) else {
            return Ok(self.invalid_responses(request));
        };
        let competency = match request.payload["competency_score"].as_f64() {
            Some(score) => score,
            None => calculate_competency_score(&responses)?,
        };
        let capability = match request.payload["capability_score"].as_f64() {
            Some(score) => score,
            None => calculate_capability_score(&responses)?,
        };

        let skill_gaps = identify_skill_gaps(&responses, competency, capability);
        let priority_gaps: Vec<&SkillGap> = skill_gaps
            .iter()
            .filter(|gap| gap.priority == Priority::High)
            .collect();
        let immediate: Vec<&SkillGap> = priority_gaps.iter().copied().take(3).collect();
        let short_term: Vec<&SkillGap> = skill_gaps
            .iter()
            .filter(|gap| gap.priority == Priority::Medium)
            .take(3)
            .collect();
        let long_term: Vec<&SkillGap> = skill_gaps
            .iter()
            .filter(|gap| gap.priority == Priority::Low)
            .collect();

        Ok(self.core.ok_response(
            request,
            "gaps_analyzed",
            json!({
                "skill_gaps": skill_gaps,
                "priority_gaps": priority_gaps,
                "improvement_plan": {
                    "immediate": immediate,
                    "short_term": short_term,
                    "long_term": long_term,
                },
            }),
        ))
    }

    async fn generate_report(&self, request: &AgentRequest) -> eyre::Result<AgentResponse> {
        let Some(responses) = Self::parse_responses(&request.payload) else {
            return Ok(self.invalid_responses(request));
        };
        if responses.len() != 10 {
            return Ok(self.invalid_responses(request));
        }

        let competency_score = calculate_competency_score(&responses)?;
        let capability_score = calculate_capability_score(&responses)?;
        let mut payload = self.assessment_payload(&responses).await?;

        if let Some(map) = payload.as_object_mut() {
            map.insert("report_generated".to_string(), json!(Utc::now()));
            map.insert(
                "detailed_analysis".to_string(),
                json!({
                    "response_distribution": response_distribution(&responses),
                    "strength_areas": strength_areas(&responses),
                    "improvement_areas": improvement_areas(&responses),
                    "recommended_focus": recommended_focus(competency_score, capability_score),
                }),
            );
        }

        Ok(self.core.ok_response(request, "assessment_report", payload))
    }
}

#[async_trait]
impl Agent for AssessorAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn dispatch(&self, request: &AgentRequest) -> eyre::Result<Option<AgentResponse>> {
        let response = match request.request_type.as_str() {
            "process_assessment" => self.process_assessment(request).await?,
            "calculate_scores" => self.calculate_scores(request).await?,
            "determine_quadrant" => self.determine_quadrant(request),
            "analyze_gaps" => self.analyze_gaps(request)?,
            "generate_report" => self.generate_report(request).await?,
            _ => return Ok(None),
        };
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Completion, LlmError};

    /// Always-failing model, so tests exercise the canned fallbacks.
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

    fn agent() -> AssessorAgent {
        AssessorAgent::new(Arc::new(OfflineLlm))
    }

    fn responses_payload(comp: [u8; 5], cap: [u8; 5]) -> Value {
        let mut responses = Vec::new();
        for (i, score) in comp.iter().enumerate() {
            responses.push(json!({ "question_id": format!("comp_{}", i + 1), "score": score }));
        }
        for (i, score) in cap.iter().enumerate() {
            responses.push(json!({ "question_id": format!("cap_{}", i + 1), "score": score }));
        }
        json!({ "responses": responses })
    }

    #[tokio::test]
    async fn process_assessment_places_expert_practitioner() {
        let request = AgentRequest::new(
            "process_assessment",
            responses_payload([2, 1, 2, 2, 1], [3, 3, 2, 3, 2]),
        );
        let response = agent().process_request(request).await;
        assert!(response.success);
        assert_eq!(response.response_type, "assessment_results");

        let results = &response.payload["results"];
        assert_eq!(results["competency_score"].as_f64(), Some(1.6));
        assert_eq!(results["capability_score"].as_f64(), Some(2.6));
        assert_eq!(results["quadrant"].as_str(), Some("expert_practitioner"));
        assert_eq!(
            response.payload["ai_insights"]["explanation"].as_str(),
            Some(EXPLANATION_FALLBACK)
        );
    }

    #[tokio::test]
    async fn wrong_response_count_is_rejected() {
        let request = AgentRequest::new(
            "process_assessment",
            json!({ "responses": [{ "question_id": "comp_1", "score": 2 }] }),
        );
        let response = agent().process_request(request).await;
        assert!(!response.success);
        assert_eq!(response.response_type, "assessment_error");
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(ErrorCode::InvalidResponses)
        );
        assert_eq!(
            response.payload["message"].as_str(),
            Some("Invalid assessment responses. Expected 10 responses.")
        );
    }

    #[tokio::test]
    async fn missing_responses_field_is_rejected() {
        let request = AgentRequest::new("process_assessment", json!({ "responses": "nope" }));
        let response = agent().process_request(request).await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(ErrorCode::InvalidResponses)
        );
    }

    #[tokio::test]
    async fn bad_dimension_partition_is_internal_error() {
        // Ten responses but six competency and four capability.
        let mut responses = Vec::new();
        for i in 0..6 {
            responses.push(json!({ "question_id": format!("comp_{i}"), "score": 1 }));
        }
        for i in 0..4 {
            responses.push(json!({ "question_id": format!("cap_{i}"), "score": 1 }));
        }
        let request = AgentRequest::new("process_assessment", json!({ "responses": responses }));
        let response = agent().process_request(request).await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(ErrorCode::InternalError)
        );
    }

    #[tokio::test]
    async fn calculate_scores_returns_overall_mean() {
        let request = AgentRequest::new(
            "calculate_scores",
            responses_payload([2, 2, 2, 2, 2], [1, 1, 1, 1, 1]),
        );
        let response = agent().process_request(request).await;
        assert!(response.success);
        assert_eq!(response.payload["competency_score"].as_f64(), Some(2.0));
        assert_eq!(response.payload["capability_score"].as_f64(), Some(1.0));
        assert_eq!(response.payload["overall_score"].as_f64(), Some(1.5));
    }

    #[tokio::test]
    async fn determine_quadrant_uses_threshold() {
        let request = AgentRequest::new(
            "determine_quadrant",
            json!({ "competency_score": 1.5, "capability_score": 1.4 }),
        );
        let response = agent().process_request(request).await;
        assert!(response.success);
        assert_eq!(response.payload["quadrant"].as_str(), Some("theorist"));
    }

    #[tokio::test]
    async fn analyze_gaps_builds_improvement_plan() {
        let request = AgentRequest::new(
            "analyze_gaps",
            responses_payload([0, 0, 0, 0, 1], [1, 1, 2, 2, 2]),
        );
        let response = agent().process_request(request).await;
        assert!(response.success);
        assert_eq!(response.response_type, "gaps_analyzed");

        let plan = &response.payload["improvement_plan"];
        assert_eq!(plan["immediate"].as_array().map(Vec::len), Some(3));
        assert!(plan["short_term"].as_array().map(Vec::len) <= Some(3));
        let priority_gaps = response.payload["priority_gaps"].as_array().cloned().unwrap();
        assert!(priority_gaps
            .iter()
            .all(|gap| gap["priority"].as_str() == Some("high")));
    }

    #[tokio::test]
    async fn generate_report_includes_detailed_analysis() {
        let request = AgentRequest::new(
            "generate_report",
            responses_payload([2, 1, 2, 2, 1], [3, 3, 2, 3, 2]),
        );
        let response = agent().process_request(request).await;
        assert!(response.success);
        assert_eq!(response.response_type, "assessment_report");

        let analysis = &response.payload["detailed_analysis"];
        let distribution = analysis["response_distribution"].as_array().cloned().unwrap();
        assert_eq!(distribution.len(), 4);
        assert_eq!(
            analysis["recommended_focus"].as_str(),
            Some("Focus on building theoretical knowledge and formal learning")
        );
        assert!(response.payload["report_generated"].is_string());
    }

    #[tokio::test]
    async fn unknown_type_reports_unknown_request_type() {
        let response = agent()
            .process_request(AgentRequest::new("mystery", Value::Null))
            .await;
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(ErrorCode::UnknownRequestType)
        );
    }
}
