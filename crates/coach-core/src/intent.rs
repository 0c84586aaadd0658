//! User intent taxonomy and the keyword fallback classifier.
//!
//! Primary classification is done by the language model; this module is
//! the deterministic fallback used when that call fails or returns
//! something outside the known set.

use serde::{Deserialize, Serialize};

/// Closed set of intents the coach routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SkillAssessment,
    CourseRecommendation,
    LearningGuidance,
    GeneralConversation,
    Greeting,
    HelpRequest,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkillAssessment => "skill_assessment",
            Self::CourseRecommendation => "course_recommendation",
            Self::LearningGuidance => "learning_guidance",
            Self::GeneralConversation => "general_conversation",
            Self::Greeting => "greeting",
            Self::HelpRequest => "help_request",
        }
    }

    /// All intents, in the order presented to the classifier model.
    pub fn all() -> &'static [Intent] {
        &[
            Self::SkillAssessment,
            Self::CourseRecommendation,
            Self::LearningGuidance,
            Self::GeneralConversation,
            Self::Greeting,
            Self::HelpRequest,
        ]
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "skill_assessment" => Some(Self::SkillAssessment),
            "course_recommendation" => Some(Self::CourseRecommendation),
            "learning_guidance" => Some(Self::LearningGuidance),
            "general_conversation" => Some(Self::GeneralConversation),
            "greeting" => Some(Self::Greeting),
            "help_request" => Some(Self::HelpRequest),
            _ => None,
        }
    }
}

const ASSESSMENT_KEYWORDS: [&str; 12] = [
    "assess",
    "assessment",
    "evaluate",
    "evaluation",
    "test",
    "quiz",
    "skill",
    "skills",
    "competency",
    "capability",
    "level",
    "proficiency",
];

const COURSE_KEYWORDS: [&str; 11] = [
    "course",
    "courses",
    "learn",
    "learning",
    "training",
    "education",
    "recommend",
    "recommendation",
    "suggest",
    "class",
    "tutorial",
];

const GUIDANCE_KEYWORDS: [&str; 12] = [
    "plan",
    "planning",
    "strategy",
    "guidance",
    "help",
    "advice",
    "career",
    "goal",
    "goals",
    "path",
    "journey",
    "roadmap",
];

fn contains_any(message: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| message.contains(keyword))
}

/// Keyword-based classification over the lowercased message.
///
/// Checks are ordered assessment > courses > guidance, so a message that
/// hits several keyword sets routes to the earliest match. Anything else
/// is general conversation.
pub fn classify_keywords(message: &str) -> Intent {
    let message = message.to_lowercase();
    if contains_any(&message, &ASSESSMENT_KEYWORDS) {
        Intent::SkillAssessment
    } else if contains_any(&message, &COURSE_KEYWORDS) {
        Intent::CourseRecommendation
    } else if contains_any(&message, &GUIDANCE_KEYWORDS) {
        Intent::LearningGuidance
    } else {
        Intent::GeneralConversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_keywords_route_to_assessment() {
        assert_eq!(
            classify_keywords("I want to assess my skills"),
            Intent::SkillAssessment
        );
        assert_eq!(
            classify_keywords("what's my proficiency?"),
            Intent::SkillAssessment
        );
    }

    #[test]
    fn course_keywords_route_to_courses() {
        assert_eq!(
            classify_keywords("recommend a tutorial"),
            Intent::CourseRecommendation
        );
    }

    #[test]
    fn guidance_keywords_route_to_guidance() {
        assert_eq!(
            classify_keywords("I need a career roadmap"),
            Intent::LearningGuidance
        );
    }

    #[test]
    fn assessment_wins_over_courses_and_guidance() {
        // "skills" (assessment) beats "courses" and "plan".
        assert_eq!(
            classify_keywords("plan courses for my skills"),
            Intent::SkillAssessment
        );
        // "learning" (courses) beats "plan" when no assessment word appears.
        assert_eq!(
            classify_keywords("plan my learning"),
            Intent::CourseRecommendation
        );
    }

    #[test]
    fn unmatched_text_is_general_conversation() {
        assert_eq!(classify_keywords("nice weather"), Intent::GeneralConversation);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify_keywords("ASSESS ME"), Intent::SkillAssessment);
    }

    #[test]
    fn round_trips_through_str() {
        for intent in Intent::all() {
            assert_eq!(Intent::from_str_opt(intent.as_str()), Some(*intent));
        }
        assert_eq!(Intent::from_str_opt("unknown"), None);
    }
}
