//! Assessment scoring, quadrant classification, and gap analysis.
//!
//! An assessment is ten answered questions on a 0-3 scale: five with
//! `comp_` question ids (competency) and five with `cap_` ids (capability).
//! All functions here are pure; the assessor agent layers validation and
//! AI enrichment on top.

use crate::types::Priority;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of responses expected per dimension.
pub const RESPONSES_PER_DIMENSION: usize = 5;

/// Total responses in a complete assessment.
pub const TOTAL_RESPONSES: usize = 10;

/// Scores at or above this threshold count as "high" for quadrant placement.
pub const QUADRANT_THRESHOLD: f64 = 1.5;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("expected {expected} {dimension} responses, found {found}")]
    WrongDimensionCount {
        dimension: &'static str,
        expected: usize,
        found: usize,
    },
}

/// One answered assessment question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub question_id: String,
    pub score: u8,
}

impl AssessmentResponse {
    pub fn new(question_id: impl Into<String>, score: u8) -> Self {
        Self {
            question_id: question_id.into(),
            score,
        }
    }

    pub fn is_competency(&self) -> bool {
        self.question_id.starts_with("comp_")
    }

    pub fn is_capability(&self) -> bool {
        self.question_id.starts_with("cap_")
    }
}

fn dimension_score(
    responses: &[AssessmentResponse],
    dimension: &'static str,
    select: fn(&AssessmentResponse) -> bool,
) -> Result<f64, ScoreError> {
    let selected: Vec<&AssessmentResponse> = responses.iter().filter(|r| select(r)).collect();
    if selected.len() != RESPONSES_PER_DIMENSION {
        return Err(ScoreError::WrongDimensionCount {
            dimension,
            expected: RESPONSES_PER_DIMENSION,
            found: selected.len(),
        });
    }
    let total: u32 = selected.iter().map(|r| u32::from(r.score)).sum();
    Ok(f64::from(total) / selected.len() as f64)
}

/// Mean of the five `comp_` responses, in [0, 3].
pub fn calculate_competency_score(responses: &[AssessmentResponse]) -> Result<f64, ScoreError> {
    dimension_score(responses, "competency", AssessmentResponse::is_competency)
}

/// Mean of the five `cap_` responses, in [0, 3].
pub fn calculate_capability_score(responses: &[AssessmentResponse]) -> Result<f64, ScoreError> {
    dimension_score(responses, "capability", AssessmentResponse::is_capability)
}

/// Skill profile quadrant from the competency/capability plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillQuadrant {
    /// High competency, high capability.
    ExpertPractitioner,
    /// Low competency, high capability.
    NaturalDoer,
    /// Low competency, low capability.
    EmergingTalent,
    /// High competency, low capability.
    Theorist,
}

impl SkillQuadrant {
    /// Classify against the fixed 1.5/1.5 thresholds. `>=` counts as high,
    /// so a score of exactly 1.5 lands on the high side of the axis.
    pub fn from_scores(competency: f64, capability: f64) -> Self {
        let high_competency = competency >= QUADRANT_THRESHOLD;
        let high_capability = capability >= QUADRANT_THRESHOLD;
        match (high_competency, high_capability) {
            (true, true) => Self::ExpertPractitioner,
            (false, true) => Self::NaturalDoer,
            (false, false) => Self::EmergingTalent,
            (true, false) => Self::Theorist,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpertPractitioner => "expert_practitioner",
            Self::NaturalDoer => "natural_doer",
            Self::EmergingTalent => "emerging_talent",
            Self::Theorist => "theorist",
        }
    }

    /// One-line profile label used in result summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ExpertPractitioner => {
                "Expert Practitioner - High knowledge with extensive practical experience"
            }
            Self::NaturalDoer => {
                "Natural Doer - Strong practical skills with room to grow theoretical knowledge"
            }
            Self::EmergingTalent => {
                "Emerging Talent - Building both knowledge and experience foundations"
            }
            Self::Theorist => "Theorist - Strong theoretical knowledge seeking practical application",
        }
    }

    /// Longer description addressed to the user.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ExpertPractitioner => {
                "You have both strong theoretical knowledge and extensive practical experience. You are recognized as an expert in your field."
            }
            Self::NaturalDoer => {
                "You have excellent hands-on experience but could benefit from strengthening your theoretical foundation."
            }
            Self::EmergingTalent => {
                "You are in the early stages of skill development, building both knowledge and experience."
            }
            Self::Theorist => {
                "You have strong theoretical knowledge but need more practical application experience."
            }
        }
    }

    /// Quadrant-specific development advice.
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Self::ExpertPractitioner => &[
                "Continue advancing your expertise through advanced courses and certifications",
                "Consider mentoring others and sharing your knowledge",
                "Explore leadership opportunities in your field",
                "Stay updated with latest industry trends and innovations",
            ],
            Self::NaturalDoer => &[
                "Strengthen theoretical foundation through formal learning",
                "Take structured courses to complement your practical experience",
                "Document and codify your practical knowledge",
                "Pursue certifications to validate your hands-on expertise",
            ],
            Self::EmergingTalent => &[
                "Start with foundational courses to build both theory and practice",
                "Seek mentorship from experienced practitioners",
                "Look for entry-level opportunities to gain hands-on experience",
                "Join communities and forums to learn from others",
            ],
            Self::Theorist => &[
                "Seek practical application opportunities for your knowledge",
                "Find internships, projects, or volunteer work to gain experience",
                "Practice applying concepts in real-world scenarios",
                "Connect with practitioners to learn applied techniques",
            ],
        }
    }

    /// Concrete next steps shown alongside assessment results.
    pub fn next_steps(&self) -> &'static [&'static str] {
        match self {
            Self::ExpertPractitioner => &[
                "Explore advanced specialization courses",
                "Consider leadership and mentoring training",
                "Look into industry certifications for your expertise",
            ],
            Self::NaturalDoer => &[
                "Take foundational theory courses in your strong areas",
                "Pursue formal certifications to validate your experience",
                "Consider courses in knowledge management and documentation",
            ],
            Self::EmergingTalent => &[
                "Start with beginner-friendly comprehensive courses",
                "Look for courses with strong practical components",
                "Seek mentorship or guided learning programs",
            ],
            Self::Theorist => &[
                "Find courses with hands-on labs and practical exercises",
                "Look for internship or project-based learning opportunities",
                "Consider applied or case-study focused training",
            ],
        }
    }
}

/// A specific area where the assessment indicates room to grow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGap {
    pub area: String,
    /// Question score for per-question gaps; dimension mean for overall gaps.
    pub current_level: f64,
    pub recommended_level: f64,
    pub priority: Priority,
    pub description: String,
}

/// Human-readable skill area for a question id. Unknown ids pass through.
pub fn skill_area_for(question_id: &str) -> String {
    let area = match question_id {
        "comp_1" => "Knowledge Explanation & Teaching",
        "comp_2" => "Problem-Solving Application",
        "comp_3" => "Independent Skill Usage",
        "comp_4" => "Adaptability & Context Switching",
        "comp_5" => "Recognition as Knowledge Source",
        "cap_1" => "Years of Experience",
        "cap_2" => "Workplace Performance Consistency",
        "cap_3" => "Performance Under Pressure",
        "cap_4" => "Diverse Scenario Exposure",
        "cap_5" => "Regular Professional Usage",
        other => return other.to_string(),
    };
    area.to_string()
}

/// Improvement text for a question answered at the given score.
pub fn gap_description(question_id: &str, score: u8) -> String {
    let text = match (question_id, score) {
        ("comp_1", 0) => "Develop ability to explain concepts clearly to others",
        ("comp_1", 1) => "Improve teaching and knowledge transfer skills",
        ("comp_2", 0) => "Build problem-solving skills and practical application abilities",
        ("comp_2", 1) => "Enhance effectiveness in applying skills to solve typical problems",
        ("comp_3", 0) => "Work towards independent skill application without supervision",
        ("comp_3", 1) => "Increase autonomy and self-sufficiency in skill usage",
        ("comp_4", 0) => "Develop adaptability to apply skills in new contexts",
        ("comp_4", 1) => "Improve flexibility in handling unfamiliar or complex situations",
        ("comp_5", 0) => "Build expertise to become a go-to resource for others",
        ("comp_5", 1) => "Increase recognition as a knowledgeable source in this area",
        ("cap_1", 0) => "Gain more hands-on experience applying this skill",
        ("cap_1", 1) => "Continue building experience through regular practice",
        ("cap_2", 0) => "Develop consistency in real workplace performance",
        ("cap_2", 1) => "Improve reliability and success rate in professional settings",
        ("cap_3", 0) => "Build confidence to perform under pressure situations",
        ("cap_3", 1) => "Enhance ability to maintain performance in high-stakes scenarios",
        ("cap_4", 0) => "Seek exposure to diverse scenarios requiring this skill",
        ("cap_4", 1) => "Expand experience across different contexts and challenges",
        ("cap_5", 0) => "Increase regular usage of this skill in professional roles",
        ("cap_5", 1) => "Make this skill a more central part of your work activities",
        (_, s) => return format!("Improve performance from level {s}"),
    };
    text.to_string()
}

/// Derive skill gaps from individual responses plus the aggregate scores.
///
/// Per-question gaps are raised for scores below 2. Additional synthetic
/// gaps cover a whole dimension whose mean is below 2.0. The result is
/// sorted by priority, high first; the sort is stable so insertion order
/// is preserved within a priority band.
pub fn identify_skill_gaps(
    responses: &[AssessmentResponse],
    competency_score: f64,
    capability_score: f64,
) -> Vec<SkillGap> {
    let mut gaps = Vec::new();

    for response in responses {
        if response.score < 2 {
            let priority = match response.score {
                0 => Priority::High,
                1 => Priority::Medium,
                _ => Priority::Low,
            };
            gaps.push(SkillGap {
                area: skill_area_for(&response.question_id),
                current_level: f64::from(response.score),
                recommended_level: f64::from((response.score + 1).min(3)),
                priority,
                description: gap_description(&response.question_id, response.score),
            });
        }
    }

    if competency_score < 2.0 {
        gaps.push(SkillGap {
            area: "Overall Competency (Knowledge & Learning)".to_string(),
            current_level: competency_score,
            recommended_level: 2.5,
            priority: Priority::High,
            description: "Focus on theoretical knowledge, formal learning, and ability to explain concepts to others".to_string(),
        });
    }

    if capability_score < 2.0 {
        gaps.push(SkillGap {
            area: "Overall Capability (Experience & Application)".to_string(),
            current_level: capability_score,
            recommended_level: 2.5,
            priority: Priority::High,
            description: "Gain more hands-on experience, practice in real scenarios, and build confidence under pressure".to_string(),
        });
    }

    gaps.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));
    gaps
}

/// Quadrant advice plus gap-driven recommendations.
pub fn generate_recommendations(quadrant: SkillQuadrant, gaps: &[SkillGap]) -> Vec<String> {
    let mut recommendations: Vec<String> = quadrant
        .recommendations()
        .iter()
        .map(ToString::to_string)
        .collect();

    let high_priority: Vec<&str> = gaps
        .iter()
        .filter(|gap| gap.priority == Priority::High)
        .map(|gap| gap.area.as_str())
        .collect();
    if !high_priority.is_empty() {
        recommendations.push(format!(
            "Focus on high-priority skill gaps: {}",
            high_priority.join(", ")
        ));
        recommendations
            .push("Consider courses that address multiple skill gaps simultaneously".to_string());
    }

    recommendations
}

/// Complete outcome of one assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResults {
    pub competency_score: f64,
    pub capability_score: f64,
    pub quadrant: SkillQuadrant,
    pub skill_gaps: Vec<SkillGap>,
    pub recommendations: Vec<String>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalized_insights: Option<String>,
}

/// Text summary shown at the top of assessment results.
pub fn results_summary(results: &AssessmentResults) -> String {
    format!(
        "Your skill profile: {}\n\nCompetency Score: {:.1}/3.0 (Knowledge & Learning)\nCapability Score: {:.1}/3.0 (Experience & Application)\n\n{} skill gaps identified with actionable improvement recommendations.",
        results.quadrant.label(),
        results.competency_score,
        results.capability_score,
        results.skill_gaps.len()
    )
}

// --- Detailed report helpers ---

/// Count of responses per score value 0..=3.
pub fn response_distribution(responses: &[AssessmentResponse]) -> [u64; 4] {
    let mut distribution = [0u64; 4];
    for response in responses {
        if let Some(slot) = distribution.get_mut(usize::from(response.score)) {
            *slot += 1;
        }
    }
    distribution
}

/// Areas scored at 2 or above.
pub fn strength_areas(responses: &[AssessmentResponse]) -> Vec<String> {
    responses
        .iter()
        .filter(|r| r.score >= 2)
        .map(|r| skill_area_for(&r.question_id))
        .collect()
}

/// Areas scored below 2.
pub fn improvement_areas(responses: &[AssessmentResponse]) -> Vec<String> {
    responses
        .iter()
        .filter(|r| r.score < 2)
        .map(|r| skill_area_for(&r.question_id))
        .collect()
}

/// One-line focus recommendation comparing the two dimension means.
pub fn recommended_focus(competency_score: f64, capability_score: f64) -> &'static str {
    if competency_score < capability_score {
        "Focus on building theoretical knowledge and formal learning"
    } else if capability_score < competency_score {
        "Focus on gaining practical experience and hands-on application"
    } else {
        "Balance both theoretical learning and practical application"
    }
}
