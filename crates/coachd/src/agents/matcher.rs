//! Course matcher agent.
//!
//! Wraps the deterministic matching engine in `crate::courses` behind the
//! agent request interface. Holds the loaded catalog for its lifetime.

use async_trait::async_trait;
use coach_core::assessment::{SkillGap, SkillQuadrant};
use coach_core::course::{Course, CourseRecommendation};
use coach_core::{AgentError, AgentKind, AgentRequest, AgentResponse, Capability, ErrorCode};
use serde_json::json;

use crate::courses::matching::{
    match_courses, matching_summary, quadrant_rationale, quadrant_recommendations, search_courses,
    filter_by_skills, SearchFilters,
};
use crate::courses::path::build_learning_path;
use crate::runtime::{Agent, AgentCore};

pub struct MatcherAgent {
    core: AgentCore,
    courses: Vec<Course>,
}

impl MatcherAgent {
    pub fn new(courses: Vec<Course>) -> Self {
        let capabilities = vec![
            Capability::new(
                "course_matching",
                "Match skill gaps to relevant courses based on skill requirements",
                &["skill_gaps", "skill_profile", "learning_goals"],
                &["course_recommendations", "relevance_scores"],
            ),
            Capability::new(
                "learning_path_creation",
                "Create structured learning paths with course progression ordering",
                &["course_recommendations", "difficulty_progression"],
                &["learning_path", "course_sequence"],
            ),
            Capability::new(
                "course_search",
                "Search and filter courses by various criteria",
                &["search_query", "filter_criteria"],
                &["course_results", "filtered_courses"],
            ),
            Capability::new(
                "recommendation_ranking",
                "Rank and prioritize course recommendations based on multiple factors",
                &["course_matches", "user_preferences", "skill_priorities"],
                &["ranked_recommendations", "priority_scores"],
            ),
        ];
        Self {
            core: AgentCore::new(AgentKind::CourseMatcher, capabilities),
            courses,
        }
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    fn match_to_gaps(&self, request: &AgentRequest) -> AgentResponse {
        let gaps: Option<Vec<SkillGap>> = request
            .payload
            .get("skill_gaps")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok());

        let Some(gaps) = gaps else {
            return self.core.error_response(
                request,
                "matching_error",
                json!({ "message": "Invalid skill gaps provided" }),
                AgentError::new(
                    ErrorCode::InvalidSkillGaps,
                    "Skill gaps must be provided as an array",
                ),
            );
        };

        let recommendations = match_courses(&self.courses, &gaps);
        let summary = matching_summary(&recommendations, &gaps);

        self.core.ok_response(
            request,
            "courses_matched",
            json!({
                "recommendations": recommendations,
                "total_courses": self.courses.len(),
                "matched_gaps": gaps.len(),
                "summary": summary,
            }),
        )
    }

    fn create_learning_path(&self, request: &AgentRequest) -> AgentResponse {
        let recommendations: Option<Vec<CourseRecommendation>> = request
            .payload
            .get("recommendations")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok());

        let Some(recommendations) = recommendations else {
            return self.core.error_response(
                request,
                "path_creation_error",
                json!({ "message": "Invalid course recommendations provided" }),
                AgentError::new(
                    ErrorCode::InvalidRecommendations,
                    "Course recommendations must be provided",
                ),
            );
        };

        let quadrant: Option<SkillQuadrant> = request
            .payload
            .get("skill_quadrant")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok());

        let path = build_learning_path(&recommendations, quadrant);
        let summary = json!({
            "total_courses": path.courses.len(),
            "estimated_duration": path.estimated_duration,
            "skills_addressed": path.skills_addressed.len(),
            "progression": path.progression_level,
        });

        self.core.ok_response(
            request,
            "learning_path_created",
            json!({
                "learning_path": path,
                "summary": summary,
            }),
        )
    }

    fn search(&self, request: &AgentRequest) -> AgentResponse {
        let query = request.payload["query"].as_str().unwrap_or_default();
        let filters_value = request
            .payload
            .get("filters")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let filters: SearchFilters =
            serde_json::from_value(filters_value.clone()).unwrap_or_default();

        let results = search_courses(&self.courses, query, &filters);
        let total_results = results.len();

        self.core.ok_response(
            request,
            "courses_found",
            json!({
                "courses": results,
                "total_results": total_results,
                "query": query,
                "filters": filters_value,
            }),
        )
    }

    fn recommend_by_quadrant(&self, request: &AgentRequest) -> AgentResponse {
        let quadrant: Option<SkillQuadrant> = request
            .payload
            .get("skill_quadrant")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok());

        let (recommendations, rationale) = match quadrant {
            Some(quadrant) => (
                quadrant_recommendations(&self.courses, quadrant),
                quadrant_rationale(quadrant).to_string(),
            ),
            None => (
                self.courses.iter().take(5).cloned().collect(),
                "Balanced course selection covering both theoretical and practical aspects."
                    .to_string(),
            ),
        };

        self.core.ok_response(
            request,
            "quadrant_recommendations",
            json!({
                "recommendations": recommendations,
                "quadrant": quadrant,
                "rationale": rationale,
            }),
        )
    }

    fn filter(&self, request: &AgentRequest) -> AgentResponse {
        let criteria = request
            .payload
            .get("criteria")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let skills: Vec<String> = criteria
            .get("skills")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        let results = if skills.is_empty() {
            self.courses.clone()
        } else {
            filter_by_skills(&self.courses, &skills)
        };
        let result_count = results.len();

        self.core.ok_response(
            request,
            "courses_filtered",
            json!({
                "courses": results,
                "applied_criteria": criteria,
                "result_count": result_count,
            }),
        )
    }
}

#[async_trait]
impl Agent for MatcherAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn dispatch(&self, request: &AgentRequest) -> eyre::Result<Option<AgentResponse>> {
        let response = match request.request_type.as_str() {
            "match_courses" => self.match_to_gaps(request),
            "create_learning_path" => self.create_learning_path(request),
            "search_courses" => self.search(request),
            "recommend_by_quadrant" => self.recommend_by_quadrant(request),
            "filter_courses" => self.filter(request),
            _ => return Ok(None),
        };
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Agent;
    use coach_core::course::sample_courses;
    use serde_json::Value;

    fn agent() -> MatcherAgent {
        MatcherAgent::new(sample_courses())
    }

    fn gap_value(area: &str, level: u8, priority: &str) -> Value {
        json!({
            "area": area,
            "current_level": level,
            "recommended_level": level + 1,
            "priority": priority,
            "description": "",
        })
    }

    #[tokio::test]
    async fn match_courses_returns_scored_recommendations() {
        let request = AgentRequest::new(
            "match_courses",
            json!({ "skill_gaps": [gap_value("Data Analysis", 0, "high")] }),
        );
        let response = agent().process_request(request).await;
        assert!(response.success);
        assert_eq!(response.response_type, "courses_matched");
        assert_eq!(response.payload["total_courses"].as_u64(), Some(8));
        assert_eq!(response.payload["matched_gaps"].as_u64(), Some(1));

        let recommendations = response.payload["recommendations"].as_array().cloned().unwrap();
        assert!(!recommendations.is_empty());
        assert!(recommendations.len() <= 10);
        for recommendation in &recommendations {
            let score = recommendation["relevance_score"].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[tokio::test]
    async fn match_courses_rejects_missing_gaps() {
        let request = AgentRequest::new("match_courses", json!({ "skill_gaps": "not-an-array" }));
        let response = agent().process_request(request).await;
        assert!(!response.success);
        assert_eq!(response.response_type, "matching_error");
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(ErrorCode::InvalidSkillGaps)
        );
    }

    #[tokio::test]
    async fn match_courses_with_empty_gaps_is_ok() {
        let request = AgentRequest::new("match_courses", json!({ "skill_gaps": [] }));
        let response = agent().process_request(request).await;
        assert!(response.success);
        assert_eq!(response.payload["matched_gaps"].as_u64(), Some(0));
        assert_eq!(
            response.payload["recommendations"].as_array().map(Vec::len),
            Some(0)
        );
    }

    #[tokio::test]
    async fn learning_path_is_created_from_matches() {
        let matcher = agent();
        let matched = matcher
            .process_request(AgentRequest::new(
                "match_courses",
                json!({ "skill_gaps": [gap_value("Data Analysis", 0, "high")] }),
            ))
            .await;
        let recommendations = matched.payload["recommendations"].clone();

        let response = matcher
            .process_request(AgentRequest::new(
                "create_learning_path",
                json!({ "recommendations": recommendations, "skill_quadrant": "emerging_talent" }),
            ))
            .await;
        assert!(response.success);
        assert_eq!(response.response_type, "learning_path_created");

        let path = &response.payload["learning_path"];
        assert!(path["courses"].as_array().map(Vec::len) <= Some(5));
        assert_eq!(
            response.payload["summary"]["progression"].as_str(),
            Some("foundational")
        );
    }

    #[tokio::test]
    async fn learning_path_rejects_missing_recommendations() {
        let response = agent()
            .process_request(AgentRequest::new("create_learning_path", json!({})))
            .await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_ref().map(|e| e.code),
            Some(ErrorCode::InvalidRecommendations)
        );
    }

    #[tokio::test]
    async fn search_applies_query_and_filters() {
        let response = agent()
            .process_request(AgentRequest::new(
                "search_courses",
                json!({
                    "query": "data",
                    "filters": { "difficulty_level": "Beginner" },
                }),
            ))
            .await;
        assert!(response.success);
        assert_eq!(response.response_type, "courses_found");

        let courses = response.payload["courses"].as_array().cloned().unwrap();
        assert!(!courses.is_empty());
        for course in &courses {
            assert_eq!(course["difficulty_level"].as_str(), Some("Beginner"));
        }
        assert_eq!(
            response.payload["total_results"].as_u64(),
            Some(courses.len() as u64)
        );
    }

    #[tokio::test]
    async fn quadrant_recommendations_include_rationale() {
        let response = agent()
            .process_request(AgentRequest::new(
                "recommend_by_quadrant",
                json!({ "skill_quadrant": "expert_practitioner" }),
            ))
            .await;
        assert!(response.success);
        let recommendations = response.payload["recommendations"].as_array().cloned().unwrap();
        assert!(!recommendations.is_empty());
        for course in &recommendations {
            assert_eq!(course["difficulty_level"].as_str(), Some("Advanced"));
        }
        assert!(response.payload["rationale"]
            .as_str()
            .unwrap()
            .contains("Advanced and specialized courses"));
    }

    #[tokio::test]
    async fn missing_quadrant_falls_back_to_balanced_picks() {
        let response = agent()
            .process_request(AgentRequest::new("recommend_by_quadrant", json!({})))
            .await;
        assert!(response.success);
        assert_eq!(
            response.payload["recommendations"].as_array().map(Vec::len),
            Some(5)
        );
        assert!(response.payload["quadrant"].is_null());
    }

    #[tokio::test]
    async fn filter_courses_by_skills() {
        let response = agent()
            .process_request(AgentRequest::new(
                "filter_courses",
                json!({ "criteria": { "skills": ["python"] } }),
            ))
            .await;
        assert!(response.success);
        assert_eq!(response.response_type, "courses_filtered");

        let courses = response.payload["courses"].as_array().cloned().unwrap();
        assert!(!courses.is_empty());
        assert_eq!(
            response.payload["result_count"].as_u64(),
            Some(courses.len() as u64)
        );
    }
}
