//! Plan file loading.

use crate::error::{Result, StepgateError};
use crate::plan::schema::PlanConfig;
use std::fs;
use std::path::Path;

/// Plan file looked up in the project root when none is given.
pub const DEFAULT_PLAN_FILE: &str = "plan.yml";

/// Load a plan file and parse it into [`PlanConfig`].
///
/// # Errors
///
/// Returns `PlanNotFound` if the file doesn't exist.
/// Returns `PlanParseError` if the YAML is invalid.
pub fn load_plan(path: &Path) -> Result<PlanConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StepgateError::PlanNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StepgateError::Io(e)
        }
    })?;

    parse_plan(&content, path)
}

/// Parse YAML content into [`PlanConfig`].
///
/// `source_path` is only used for error reporting.
pub fn parse_plan(content: &str, source_path: &Path) -> Result<PlanConfig> {
    serde_yaml::from_str(content).map_err(|e| StepgateError::PlanParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_plan_parses_valid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.yml");
        fs::write(&path, "name: deploy\nsteps:\n  - name: build\n").unwrap();

        let plan = load_plan(&path).unwrap();
        assert_eq!(plan.name.as_deref(), Some("deploy"));
        assert_eq!(plan.step_names(), vec!["build"]);
    }

    #[test]
    fn load_plan_returns_not_found_error() {
        let result = load_plan(Path::new("/nonexistent/plan.yml"));
        assert!(matches!(result, Err(StepgateError::PlanNotFound { .. })));
    }

    #[test]
    fn parse_plan_reports_path_on_error() {
        let err = parse_plan("steps: {not: [a list", Path::new("broken.yml")).unwrap_err();
        match err {
            StepgateError::PlanParseError { path, .. } => {
                assert_eq!(path, Path::new("broken.yml"));
            }
            other => panic!("Expected PlanParseError, got {:?}", other),
        }
    }
}
