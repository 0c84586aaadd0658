//! Course catalog records, CSV parsing, and learning-path types.
//!
//! The catalog file is a 15-column CSV with quoted fields allowed. Rows
//! that fail to parse are skipped by the loader; a catalog that cannot be
//! read at all is replaced by [`sample_courses`].

use crate::types::Priority;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected CSV header, in column order.
pub const CATALOG_COLUMNS: [&str; 15] = [
    "course_id",
    "course_title",
    "course_description",
    "career_path",
    "career_level",
    "sector",
    "job_role",
    "primary_skill",
    "secondary_skills",
    "difficulty_level",
    "duration_hours",
    "provider",
    "prerequisites",
    "learning_outcomes",
    "career_progression_target",
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Read(#[from] std::io::Error),
    #[error("catalog is empty")]
    Empty,
    #[error("row {row} has {found} columns, expected {expected}")]
    ShortRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Course difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Numeric tier used for difficulty-fit scoring (Beginner = 0).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
        }
    }

    /// Lenient mapping from free-form catalog values. "entry" counts as
    /// Beginner, "expert" as Advanced, anything unrecognized as Intermediate.
    pub fn parse_loose(value: &str) -> Self {
        let normalized = value.to_lowercase();
        if normalized.contains("beginner") || normalized.contains("entry") {
            Self::Beginner
        } else if normalized.contains("advanced") || normalized.contains("expert") {
            Self::Advanced
        } else {
            Self::Intermediate
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub course_title: String,
    pub course_description: String,
    pub career_path: String,
    pub career_level: String,
    pub sector: String,
    pub job_role: String,
    pub primary_skill: String,
    pub secondary_skills: String,
    pub difficulty_level: Difficulty,
    pub duration_hours: u32,
    pub provider: String,
    pub prerequisites: String,
    pub learning_outcomes: String,
    pub career_progression_target: String,
}

/// Split one CSV line, honoring double-quoted fields. Quotes toggle
/// quoting and are dropped; commas inside quotes do not split.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    values.push(current.trim().to_string());
    values
}

fn course_from_row(values: &[String], row: usize) -> Result<Course, CatalogError> {
    if values.len() < CATALOG_COLUMNS.len() {
        return Err(CatalogError::ShortRow {
            row,
            found: values.len(),
            expected: CATALOG_COLUMNS.len(),
        });
    }
    Ok(Course {
        course_id: values[0].clone(),
        course_title: values[1].clone(),
        course_description: values[2].clone(),
        career_path: values[3].clone(),
        career_level: values[4].clone(),
        sector: values[5].clone(),
        job_role: values[6].clone(),
        primary_skill: values[7].clone(),
        secondary_skills: values[8].clone(),
        difficulty_level: Difficulty::parse_loose(&values[9]),
        duration_hours: values[10].parse().unwrap_or(0),
        provider: values[11].clone(),
        prerequisites: values[12].clone(),
        learning_outcomes: values[13].clone(),
        career_progression_target: values[14].clone(),
    })
}

/// Parse catalog text. The first line is the header and is skipped.
/// Malformed rows are returned alongside the parsed courses so the caller
/// can log them; an input with no data rows at all is an error.
pub fn parse_catalog(text: &str) -> Result<(Vec<Course>, Vec<CatalogError>), CatalogError> {
    let mut lines = text.trim().lines();
    let Some(_header) = lines.next() else {
        return Err(CatalogError::Empty);
    };

    let mut courses = Vec::new();
    let mut skipped = Vec::new();
    for (index, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let values = parse_csv_line(line);
        // Data rows start at line 2 of the file.
        match course_from_row(&values, index + 2) {
            Ok(course) => courses.push(course),
            Err(e) => skipped.push(e),
        }
    }

    if courses.is_empty() && skipped.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok((courses, skipped))
}

/// Built-in fallback catalog used when the CSV cannot be loaded.
pub fn sample_courses() -> Vec<Course> {
    let rows: [(&str, &str, &str, &str, &str, &str, &str, &str, &str, Difficulty, u32, &str, &str, &str, &str); 8] = [
        (
            "C001",
            "Data Science Fundamentals",
            "Comprehensive introduction to data science including statistics, Python programming, and machine learning basics",
            "Data Science",
            "entry",
            "Technology",
            "Data Scientist",
            "Data Analytics",
            "Python Programming, Statistics, Machine Learning",
            Difficulty::Beginner,
            40,
            "Coursera",
            "None",
            "Master Data Analytics fundamentals and supporting skills",
            "Mid-level Data Science positions",
        ),
        (
            "C002",
            "Advanced JavaScript Development",
            "Master advanced JavaScript concepts including ES6+, async programming, and modern frameworks",
            "Software Engineering",
            "mid",
            "Technology",
            "Software Engineer",
            "JavaScript Programming",
            "React, Node.js, TypeScript",
            Difficulty::Advanced,
            35,
            "Udemy",
            "Basic JavaScript knowledge",
            "Master advanced JavaScript development techniques",
            "Senior Software Engineer positions",
        ),
        (
            "C003",
            "Project Management Essentials",
            "Learn project management fundamentals including Agile, Scrum, and project planning techniques",
            "Project Management",
            "entry",
            "Business",
            "Project Manager",
            "Project Management",
            "Agile, Scrum, Leadership",
            Difficulty::Intermediate,
            30,
            "LinkedIn Learning",
            "None",
            "Master project management fundamentals and methodologies",
            "Senior Project Manager positions",
        ),
        (
            "C004",
            "Digital Marketing Strategy",
            "Comprehensive digital marketing course covering SEO, social media, and analytics",
            "Digital Marketing",
            "entry",
            "Marketing",
            "Digital Marketer",
            "Digital Marketing",
            "SEO, Social Media, Analytics",
            Difficulty::Intermediate,
            25,
            "Internal Training",
            "None",
            "Master digital marketing strategies and tools",
            "Senior Marketing roles",
        ),
        (
            "C005",
            "Machine Learning with Python",
            "Advanced machine learning techniques using Python, scikit-learn, and TensorFlow",
            "Data Science",
            "mid",
            "Technology",
            "ML Engineer",
            "Machine Learning",
            "Python, TensorFlow, Data Processing",
            Difficulty::Advanced,
            50,
            "Coursera",
            "Python programming, basic statistics",
            "Master machine learning techniques and implementation",
            "Senior ML Engineer positions",
        ),
        (
            "C006",
            "UI/UX Design Principles",
            "Learn user interface and user experience design principles and tools",
            "Design",
            "entry",
            "Design",
            "UX Designer",
            "UI/UX Design",
            "Figma, User Research, Prototyping",
            Difficulty::Beginner,
            20,
            "Udemy",
            "None",
            "Master UI/UX design fundamentals and tools",
            "Senior Design positions",
        ),
        (
            "C007",
            "Cloud Architecture with AWS",
            "Design and implement cloud solutions using Amazon Web Services",
            "Cloud Engineering",
            "mid",
            "Technology",
            "Cloud Architect",
            "Cloud Computing",
            "AWS, DevOps, Infrastructure",
            Difficulty::Advanced,
            45,
            "AWS Training",
            "Basic cloud knowledge, networking fundamentals",
            "Master AWS cloud architecture and implementation",
            "Senior Cloud Architect positions",
        ),
        (
            "C008",
            "Business Analytics Fundamentals",
            "Learn business intelligence, data visualization, and analytical thinking",
            "Business Analytics",
            "entry",
            "Business",
            "Business Analyst",
            "Business Analytics",
            "Excel, Tableau, SQL",
            Difficulty::Beginner,
            28,
            "LinkedIn Learning",
            "None",
            "Master business analytics fundamentals and tools",
            "Senior Business Analyst positions",
        ),
    ];

    rows.iter()
        .map(
            |(
                id,
                title,
                description,
                career_path,
                career_level,
                sector,
                job_role,
                primary,
                secondary,
                difficulty,
                hours,
                provider,
                prerequisites,
                outcomes,
                target,
            )| Course {
                course_id: (*id).to_string(),
                course_title: (*title).to_string(),
                course_description: (*description).to_string(),
                career_path: (*career_path).to_string(),
                career_level: (*career_level).to_string(),
                sector: (*sector).to_string(),
                job_role: (*job_role).to_string(),
                primary_skill: (*primary).to_string(),
                secondary_skills: (*secondary).to_string(),
                difficulty_level: *difficulty,
                duration_hours: *hours,
                provider: (*provider).to_string(),
                prerequisites: (*prerequisites).to_string(),
                learning_outcomes: (*outcomes).to_string(),
                career_progression_target: (*target).to_string(),
            },
        )
        .collect()
}

/// A course scored against a set of skill gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub course: Course,
    /// Relevance in [0, 1].
    pub relevance_score: f64,
    pub matched_skill_gaps: Vec<String>,
    pub priority: Priority,
    pub reasoning: String,
}

/// Overall progression level of a learning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionLevel {
    Foundational,
    Intermediate,
    Advanced,
    Expert,
}

impl ProgressionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foundational => "foundational",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

/// An ordered sequence of recommended courses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPath {
    pub id: crate::types::Id,
    pub title: String,
    pub description: String,
    pub courses: Vec<CourseRecommendation>,
    /// Sum of course durations, in hours.
    pub estimated_duration: u32,
    pub skills_addressed: Vec<String>,
    pub progression_level: ProgressionLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_line_splits_on_unquoted_commas() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn csv_line_keeps_quoted_commas() {
        assert_eq!(
            parse_csv_line(r#"C001,"Data, Science",40"#),
            vec!["C001", "Data, Science", "40"]
        );
    }

    #[test]
    fn csv_line_trims_whitespace() {
        assert_eq!(parse_csv_line(" a , b "), vec!["a", "b"]);
    }

    #[test]
    fn difficulty_parse_loose_variants() {
        assert_eq!(Difficulty::parse_loose("Beginner"), Difficulty::Beginner);
        assert_eq!(Difficulty::parse_loose("entry-level"), Difficulty::Beginner);
        assert_eq!(Difficulty::parse_loose("Advanced"), Difficulty::Advanced);
        assert_eq!(Difficulty::parse_loose("expert"), Difficulty::Advanced);
        assert_eq!(
            Difficulty::parse_loose("Intermediate"),
            Difficulty::Intermediate
        );
        assert_eq!(Difficulty::parse_loose("???"), Difficulty::Intermediate);
    }

    fn sample_row(id: &str) -> String {
        format!(
            "{id},Title,\"Description, detailed\",Path,entry,Tech,Role,Skill,\"A, B\",Beginner,40,Provider,None,Outcomes,Target"
        )
    }

    #[test]
    fn parse_catalog_reads_rows_and_skips_bad_ones() {
        let header = CATALOG_COLUMNS.join(",");
        let text = format!("{header}\n{}\nshort,row\n{}", sample_row("C001"), sample_row("C002"));
        let (courses, skipped) = parse_catalog(&text).unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert_eq!(courses[0].course_id, "C001");
        assert_eq!(courses[0].course_description, "Description, detailed");
        assert_eq!(courses[0].difficulty_level, Difficulty::Beginner);
        assert_eq!(courses[0].duration_hours, 40);
    }

    #[test]
    fn parse_catalog_header_only_is_empty() {
        let header = CATALOG_COLUMNS.join(",");
        assert!(matches!(parse_catalog(&header), Err(CatalogError::Empty)));
    }

    #[test]
    fn unparsable_duration_defaults_to_zero() {
        let header = CATALOG_COLUMNS.join(",");
        let row = sample_row("C001").replace(",40,", ",n/a,");
        let (courses, _) = parse_catalog(&format!("{header}\n{row}")).unwrap();
        assert_eq!(courses[0].duration_hours, 0);
    }

    #[test]
    fn sample_catalog_has_eight_courses() {
        let courses = sample_courses();
        assert_eq!(courses.len(), 8);
        assert_eq!(courses[0].course_id, "C001");
        assert_eq!(courses[7].course_id, "C008");
        assert!(courses
            .iter()
            .any(|c| c.difficulty_level == Difficulty::Beginner));
        assert!(courses
            .iter()
            .any(|c| c.difficulty_level == Difficulty::Advanced));
    }
}
