//! Learning-path assembly.
//!
//! Orders course recommendations into a short sequence tailored to the
//! learner's skill quadrant, then wraps it with a generated title and
//! description.

use coach_core::assessment::SkillQuadrant;
use coach_core::course::{CourseRecommendation, Difficulty, LearningPath, ProgressionLevel};
use coach_core::Id;

use super::matching::sort_recommendations;

const MAX_PATH_COURSES: usize = 5;

fn description_contains(recommendation: &CourseRecommendation, needle: &str) -> bool {
    recommendation
        .course
        .course_description
        .to_lowercase()
        .contains(needle)
}

/// Pick and order courses for a quadrant.
///
/// Each quadrant leans against its weakness: theorists get practical
/// courses, natural doers get theory, experts go straight to advanced
/// material. Without a quadrant the sequence is a plain beginner to
/// advanced progression.
fn sequence_for_quadrant(
    recommendations: &[CourseRecommendation],
    quadrant: Option<SkillQuadrant>,
) -> (Vec<CourseRecommendation>, ProgressionLevel) {
    let of_difficulty = |level: Difficulty| {
        recommendations
            .iter()
            .filter(move |r| r.course.difficulty_level == level)
    };
    let beginner = || of_difficulty(Difficulty::Beginner);
    let intermediate = || of_difficulty(Difficulty::Intermediate);
    let advanced = || of_difficulty(Difficulty::Advanced);

    let (sequence, progression): (Vec<&CourseRecommendation>, ProgressionLevel) = match quadrant {
        Some(SkillQuadrant::EmergingTalent) => (
            beginner().take(3).chain(intermediate().take(2)).collect(),
            ProgressionLevel::Foundational,
        ),
        Some(SkillQuadrant::Theorist) => (
            intermediate()
                .filter(|r| description_contains(r, "practical"))
                .take(2)
                .chain(
                    beginner()
                        .filter(|r| description_contains(r, "hands-on"))
                        .take(2),
                )
                .chain(advanced().take(1))
                .collect(),
            ProgressionLevel::Intermediate,
        ),
        Some(SkillQuadrant::NaturalDoer) => (
            beginner()
                .filter(|r| description_contains(r, "fundamental"))
                .take(2)
                .chain(intermediate().take(2))
                .chain(advanced().take(1))
                .collect(),
            ProgressionLevel::Intermediate,
        ),
        Some(SkillQuadrant::ExpertPractitioner) => (
            advanced()
                .take(2)
                .chain(
                    intermediate()
                        .filter(|r| description_contains(r, "advanced"))
                        .take(1),
                )
                .collect(),
            ProgressionLevel::Expert,
        ),
        None => (
            beginner()
                .take(2)
                .chain(intermediate().take(2))
                .chain(advanced().take(1))
                .collect(),
            ProgressionLevel::Foundational,
        ),
    };

    let mut sequence: Vec<CourseRecommendation> = sequence.into_iter().cloned().collect();
    sort_recommendations(&mut sequence);
    sequence.truncate(MAX_PATH_COURSES);
    (sequence, progression)
}

fn path_title(quadrant: Option<SkillQuadrant>, skills_addressed: &[String]) -> String {
    let primary_skill = skills_addressed
        .first()
        .map_or("Professional Development", String::as_str);

    match quadrant {
        Some(SkillQuadrant::EmergingTalent) => {
            format!("Foundational {primary_skill} Learning Path")
        }
        Some(SkillQuadrant::Theorist) => format!("Practical Application in {primary_skill}"),
        Some(SkillQuadrant::NaturalDoer) => {
            format!("Theoretical Foundation for {primary_skill}")
        }
        Some(SkillQuadrant::ExpertPractitioner) => {
            format!("Advanced {primary_skill} Specialization")
        }
        None => format!("Comprehensive {primary_skill} Development Path"),
    }
}

fn path_description(
    courses: &[CourseRecommendation],
    quadrant: Option<SkillQuadrant>,
) -> String {
    let total_hours: u32 = courses.iter().map(|r| r.course.duration_hours).sum();
    let mut providers = Vec::new();
    for recommendation in courses {
        if !providers.contains(&recommendation.course.provider) {
            providers.push(recommendation.course.provider.clone());
        }
    }

    let mut description = format!(
        "A structured learning path consisting of {} courses ({total_hours} hours total) from {}. ",
        courses.len(),
        providers.join(", ")
    );

    description.push_str(match quadrant {
        Some(SkillQuadrant::EmergingTalent) => {
            "Designed for beginners to build both theoretical knowledge and practical skills systematically."
        }
        Some(SkillQuadrant::Theorist) => {
            "Focused on practical application and hands-on experience to complement your theoretical knowledge."
        }
        Some(SkillQuadrant::NaturalDoer) => {
            "Emphasizes theoretical foundations and frameworks to formalize your practical experience."
        }
        Some(SkillQuadrant::ExpertPractitioner) => {
            "Advanced courses to deepen expertise and explore specialized topics in your field."
        }
        None => "A comprehensive curriculum progressing from foundational to advanced topics.",
    });

    description
}

/// Assemble a learning path from scored recommendations.
pub fn build_learning_path(
    recommendations: &[CourseRecommendation],
    quadrant: Option<SkillQuadrant>,
) -> LearningPath {
    let (courses, progression_level) = sequence_for_quadrant(recommendations, quadrant);

    let estimated_duration: u32 = courses.iter().map(|r| r.course.duration_hours).sum();

    let mut skills_addressed = Vec::new();
    for recommendation in &courses {
        for skill in &recommendation.matched_skill_gaps {
            if !skills_addressed.contains(skill) {
                skills_addressed.push(skill.clone());
            }
        }
    }

    LearningPath {
        id: Id::new(),
        title: path_title(quadrant, &skills_addressed),
        description: path_description(&courses, quadrant),
        courses,
        estimated_duration,
        skills_addressed,
        progression_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::course::{sample_courses, Course};
    use coach_core::Priority;

    fn recommendation(course: Course, priority: Priority, skill: &str) -> CourseRecommendation {
        CourseRecommendation {
            relevance_score: 0.5,
            matched_skill_gaps: vec![skill.to_string()],
            priority,
            reasoning: String::new(),
            course,
        }
    }

    fn all_recommendations() -> Vec<CourseRecommendation> {
        sample_courses()
            .into_iter()
            .map(|course| recommendation(course, Priority::Medium, "Data Analysis"))
            .collect()
    }

    #[test]
    fn emerging_talent_path_is_foundational() {
        let path = build_learning_path(&all_recommendations(), Some(SkillQuadrant::EmergingTalent));
        assert_eq!(path.progression_level, ProgressionLevel::Foundational);
        assert!(path.courses.len() <= 5);
        assert_eq!(path.title, "Foundational Data Analysis Learning Path");
    }

    #[test]
    fn expert_path_prefers_advanced_courses() {
        let path = build_learning_path(
            &all_recommendations(),
            Some(SkillQuadrant::ExpertPractitioner),
        );
        assert_eq!(path.progression_level, ProgressionLevel::Expert);
        assert!(path
            .courses
            .iter()
            .all(|r| r.course.difficulty_level == Difficulty::Advanced
                || description_contains(r, "advanced")));
        assert_eq!(path.title, "Advanced Data Analysis Specialization");
    }

    #[test]
    fn default_path_mixes_difficulties() {
        let path = build_learning_path(&all_recommendations(), None);
        assert_eq!(path.progression_level, ProgressionLevel::Foundational);
        assert_eq!(path.courses.len(), 5);
        assert!(path.title.starts_with("Comprehensive"));
    }

    #[test]
    fn duration_is_the_sum_of_course_hours() {
        let path = build_learning_path(&all_recommendations(), None);
        let expected: u32 = path.courses.iter().map(|r| r.course.duration_hours).sum();
        assert_eq!(path.estimated_duration, expected);
        assert!(path
            .description
            .contains(&format!("({expected} hours total)")));
    }

    #[test]
    fn empty_recommendations_produce_an_empty_path() {
        let path = build_learning_path(&[], Some(SkillQuadrant::Theorist));
        assert!(path.courses.is_empty());
        assert_eq!(path.estimated_duration, 0);
        assert_eq!(path.title, "Practical Application in Professional Development");
    }

    #[test]
    fn skills_addressed_are_unique() {
        let mut recommendations = all_recommendations();
        recommendations.push(recommendation(
            sample_courses().remove(0),
            Priority::High,
            "Data Analysis",
        ));
        let path = build_learning_path(&recommendations, None);
        assert_eq!(path.skills_addressed, vec!["Data Analysis".to_string()]);
    }
}
