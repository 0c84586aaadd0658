//! Keyword-based course matching.
//!
//! Matching is deterministic: skill-gap areas are tokenized, expanded
//! through a small synonym table, and scored against the catalog fields
//! with fixed weights. Scores live in [0, 1].

use coach_core::assessment::{SkillGap, SkillQuadrant};
use coach_core::course::{Course, CourseRecommendation, Difficulty};
use serde::Deserialize;
use std::cmp::Ordering;

const STOP_WORDS: [&str; 12] = [
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Domain synonym expansions applied to exact token matches.
const SYNONYMS: [(&str, &[&str]); 6] = [
    ("competency", &["knowledge", "theory", "concepts", "fundamentals"]),
    ("capability", &["experience", "practical", "application", "hands-on"]),
    ("programming", &["coding", "development", "software"]),
    ("analysis", &["analytics", "data", "business intelligence"]),
    ("management", &["leadership", "project", "team"]),
    ("design", &["ui", "ux", "user experience", "interface"]),
];

/// Tokenize a skill area into search keywords.
///
/// Lowercases, strips punctuation, drops stop words and tokens of two
/// characters or fewer, then appends synonym expansions. Order is
/// preserved and duplicates removed.
pub fn extract_skill_keywords(area: &str) -> Vec<String> {
    let cleaned: String = area
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let words: Vec<String> = cleaned
        .split_whitespace()
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
        .map(ToString::to_string)
        .collect();

    let mut keywords = words.clone();
    for word in &words {
        if let Some((_, expansions)) = SYNONYMS.iter().find(|(key, _)| key == word) {
            keywords.extend(expansions.iter().map(ToString::to_string));
        }
    }

    let mut unique = Vec::new();
    for keyword in keywords {
        if !unique.contains(&keyword) {
            unique.push(keyword);
        }
    }
    unique
}

fn matches_in(field: &str, keywords: &[String]) -> usize {
    let field = field.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| field.contains(keyword.as_str()))
        .count()
}

fn any_match(field: &str, keywords: &[String]) -> bool {
    matches_in(field, keywords) > 0
}

/// Courses whose primary skill, secondary skills, title or description
/// mention any keyword of the gap's area.
pub fn find_courses_for_gap<'a>(courses: &'a [Course], gap: &SkillGap) -> Vec<&'a Course> {
    let keywords = extract_skill_keywords(&gap.area);
    courses
        .iter()
        .filter(|course| {
            any_match(&course.primary_skill, &keywords)
                || any_match(&course.secondary_skills, &keywords)
                || any_match(&course.course_title, &keywords)
                || any_match(&course.course_description, &keywords)
        })
        .collect()
}

/// Bonus for courses sitting just above the learner's current level.
fn difficulty_bonus(difficulty: Difficulty, current_level: f64) -> f64 {
    let ideal = (current_level + 1.0).min(2.0);
    let diff = (f64::from(difficulty.rank()) - ideal).abs();
    if diff == 0.0 {
        0.2
    } else if diff == 1.0 {
        0.1
    } else {
        0.0
    }
}

/// Weighted relevance of a course for one skill gap, capped at 1.0.
///
/// Keyword hits weigh 0.4 in the primary skill, 0.3 in secondary skills,
/// 0.2 in the title and 0.1 in the description, plus the difficulty bonus.
#[allow(clippy::cast_precision_loss)]
pub fn relevance_score(course: &Course, gap: &SkillGap) -> f64 {
    let keywords = extract_skill_keywords(&gap.area);

    let score = matches_in(&course.primary_skill, &keywords) as f64 * 0.4
        + matches_in(&course.secondary_skills, &keywords) as f64 * 0.3
        + matches_in(&course.course_title, &keywords) as f64 * 0.2
        + matches_in(&course.course_description, &keywords) as f64 * 0.1
        + difficulty_bonus(course.difficulty_level, gap.current_level);

    score.min(1.0)
}

/// Human-readable explanation of why a course matched a gap.
pub fn matching_reasoning(course: &Course, gap: &SkillGap) -> String {
    let keywords = extract_skill_keywords(&gap.area);
    let mut reasons = Vec::new();

    if any_match(&course.primary_skill, &keywords) {
        reasons.push(format!(
            "Primary skill alignment with \"{}\"",
            course.primary_skill
        ));
    }
    if any_match(&course.secondary_skills, &keywords) {
        reasons.push("Secondary skills coverage including relevant topics".to_string());
    }
    if f64::from(course.difficulty_level.rank()) >= gap.current_level {
        reasons.push(format!(
            "Appropriate difficulty level ({}) for skill advancement",
            course.difficulty_level.as_str()
        ));
    }

    if reasons.is_empty() {
        "General relevance to skill area".to_string()
    } else {
        reasons.join("; ")
    }
}

/// Sort in place by priority weight, then relevance, both descending.
pub fn sort_recommendations(recommendations: &mut [CourseRecommendation]) {
    recommendations.sort_by(|a, b| {
        b.priority
            .weight()
            .cmp(&a.priority.weight())
            .then_with(|| {
                b.relevance_score
                    .partial_cmp(&a.relevance_score)
                    .unwrap_or(Ordering::Equal)
            })
    });
}

/// Score every gap against the catalog and keep the top 10 matches.
pub fn match_courses(courses: &[Course], gaps: &[SkillGap]) -> Vec<CourseRecommendation> {
    let mut recommendations = Vec::new();

    for gap in gaps {
        for course in find_courses_for_gap(courses, gap) {
            recommendations.push(CourseRecommendation {
                course: course.clone(),
                relevance_score: relevance_score(course, gap),
                matched_skill_gaps: vec![gap.area.clone()],
                priority: gap.priority,
                reasoning: matching_reasoning(course, gap),
            });
        }
    }

    sort_recommendations(&mut recommendations);
    recommendations.truncate(10);
    recommendations
}

/// One-line summary of a matching run.
#[allow(clippy::cast_precision_loss)]
pub fn matching_summary(recommendations: &[CourseRecommendation], gaps: &[SkillGap]) -> String {
    let total = recommendations.len();
    let high_priority = recommendations
        .iter()
        .filter(|r| r.priority == coach_core::Priority::High)
        .count();
    let average = if total == 0 {
        0.0
    } else {
        recommendations
            .iter()
            .map(|r| r.relevance_score)
            .sum::<f64>()
            / total as f64
    };

    format!(
        "Found {total} relevant courses ({high_priority} high priority) with average relevance score of {average:.2}. Addresses {} identified skill gaps.",
        gaps.len()
    )
}

/// Filters accepted by the course search operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub difficulty_level: Option<Difficulty>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub max_duration: Option<u32>,
    #[serde(default)]
    pub sector: Option<String>,
}

/// Free-text search with optional exact-match filters.
///
/// Query terms are ORed across title, description, primary and secondary
/// skills; an empty query matches everything.
pub fn search_courses(courses: &[Course], query: &str, filters: &SearchFilters) -> Vec<Course> {
    let terms: Vec<String> = query.to_lowercase().split_whitespace().map(ToString::to_string).collect();

    courses
        .iter()
        .filter(|course| {
            terms.is_empty()
                || terms.iter().any(|term| {
                    course.course_title.to_lowercase().contains(term)
                        || course.course_description.to_lowercase().contains(term)
                        || course.primary_skill.to_lowercase().contains(term)
                        || course.secondary_skills.to_lowercase().contains(term)
                })
        })
        .filter(|course| {
            filters
                .difficulty_level
                .is_none_or(|level| course.difficulty_level == level)
        })
        .filter(|course| {
            filters
                .provider
                .as_ref()
                .is_none_or(|provider| &course.provider == provider)
        })
        .filter(|course| {
            filters
                .max_duration
                .is_none_or(|max| course.duration_hours <= max)
        })
        .filter(|course| {
            filters
                .sector
                .as_ref()
                .is_none_or(|sector| &course.sector == sector)
        })
        .cloned()
        .collect()
}

/// Keep courses whose primary or secondary skills mention any of `skills`.
pub fn filter_by_skills(courses: &[Course], skills: &[String]) -> Vec<Course> {
    courses
        .iter()
        .filter(|course| {
            skills.iter().any(|skill| {
                let skill = skill.to_lowercase();
                course.primary_skill.to_lowercase().contains(&skill)
                    || course.secondary_skills.to_lowercase().contains(&skill)
            })
        })
        .cloned()
        .collect()
}

/// Up to five courses suited to a skill quadrant.
pub fn quadrant_recommendations(courses: &[Course], quadrant: SkillQuadrant) -> Vec<Course> {
    let matched: Vec<Course> = match quadrant {
        SkillQuadrant::EmergingTalent => courses
            .iter()
            .filter(|course| {
                course.difficulty_level == Difficulty::Beginner
                    && course
                        .course_description
                        .to_lowercase()
                        .contains("fundamental")
            })
            .cloned()
            .collect(),
        SkillQuadrant::Theorist => courses
            .iter()
            .filter(|course| {
                let description = course.course_description.to_lowercase();
                description.contains("practical")
                    || description.contains("hands-on")
                    || description.contains("application")
            })
            .cloned()
            .collect(),
        SkillQuadrant::NaturalDoer => courses
            .iter()
            .filter(|course| {
                let description = course.course_description.to_lowercase();
                description.contains("theory")
                    || description.contains("principle")
                    || description.contains("concept")
            })
            .cloned()
            .collect(),
        SkillQuadrant::ExpertPractitioner => courses
            .iter()
            .filter(|course| course.difficulty_level == Difficulty::Advanced)
            .cloned()
            .collect(),
    };

    matched.into_iter().take(5).collect()
}

/// Why a quadrant gets the courses it gets.
pub fn quadrant_rationale(quadrant: SkillQuadrant) -> &'static str {
    match quadrant {
        SkillQuadrant::EmergingTalent => {
            "Focus on foundational courses that build both theoretical knowledge and practical skills from the ground up."
        }
        SkillQuadrant::Theorist => {
            "Emphasize practical application courses and hands-on learning to complement your strong theoretical foundation."
        }
        SkillQuadrant::NaturalDoer => {
            "Prioritize courses that provide theoretical frameworks and principles to formalize your practical experience."
        }
        SkillQuadrant::ExpertPractitioner => {
            "Advanced and specialized courses to deepen expertise and explore cutting-edge topics in your field."
        }
    }
}
