//! Catalog loading with a built-in fallback.

use std::path::Path;

use coach_core::course::{parse_catalog, sample_courses, Course};
use tracing::{info, warn};

/// Load the course catalog from `path`.
///
/// Never fails: an unreadable or unusable file logs a warning and yields
/// the built-in sample catalog instead. Individual malformed rows are
/// logged and skipped.
pub fn load_catalog(path: &Path) -> Vec<Course> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "failed to read catalog {}: {e}, using sample courses",
                path.display()
            );
            return sample_courses();
        }
    };

    match parse_catalog(&text) {
        Ok((courses, skipped)) => {
            for e in &skipped {
                warn!("skipping catalog row: {e}");
            }
            info!("loaded {} courses from {}", courses.len(), path.display());
            courses
        }
        Err(e) => {
            warn!("failed to parse catalog: {e}, using sample courses");
            sample_courses()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::course::CATALOG_COLUMNS;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_samples() {
        let courses = load_catalog(Path::new("/nonexistent/catalog.csv"));
        assert_eq!(courses.len(), 8);
    }

    #[test]
    fn valid_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", CATALOG_COLUMNS.join(",")).unwrap();
        writeln!(
            file,
            "X1,Rust for Engineers,Systems programming,Software,entry,Technology,Engineer,Rust,\"Tooling, CLI\",Beginner,12,Internal,None,Write Rust,Senior roles"
        )
        .unwrap();

        let courses = load_catalog(file.path());
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_id, "X1");
    }

    #[test]
    fn unparsable_file_falls_back_to_samples() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", CATALOG_COLUMNS.join(",")).unwrap();
        let courses = load_catalog(file.path());
        assert_eq!(courses.len(), 8);
    }
}
