//! Path validation
//!
//! Validates the live directory, the bundle file name and the list file
//! locations.

use super::{ErrorCategory, ValidationError, ValidationResult, ValidationWarning};
use crate::{is_plain_file_name, CleanerConfig};

/// Validate configured paths
pub fn validate_paths(config: &CleanerConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !is_plain_file_name(&config.bundle_file) {
        result.add_error(ValidationError::new(
            ErrorCategory::Value,
            format!(
                "bundle-file must be a plain file name, got {:?}",
                config.bundle_file
            ),
        ));
    }

    if !config.live_dir.exists() {
        result.add_error(ValidationError::new(
            ErrorCategory::Path,
            format!("Live directory not found: {:?}", config.live_dir),
        ));
    } else if !config.live_dir.is_dir() {
        result.add_error(ValidationError::new(
            ErrorCategory::Path,
            format!("Live directory is not a directory: {:?}", config.live_dir),
        ));
    }

    for (name, list) in [
        ("duplicates-list", &config.duplicates_list),
        ("clean-list", &config.clean_list),
    ] {
        if list.is_dir() {
            result.add_error(ValidationError::new(
                ErrorCategory::Path,
                format!("{} points at a directory: {:?}", name, list),
            ));
            continue;
        }

        match list.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
                result.add_error(ValidationError::new(
                    ErrorCategory::Path,
                    format!("{} parent directory not found: {:?}", name, parent),
                ));
            }
            _ => {}
        }

        if list.starts_with(&config.live_dir) {
            result.add_warning(ValidationWarning::new(format!(
                "{} {:?} is inside the live directory and may be mistaken for a certificate directory entry",
                name, list
            )));
        }
    }

    if config.duplicates_list == config.clean_list {
        result.add_error(ValidationError::new(
            ErrorCategory::Value,
            format!(
                "duplicates-list and clean-list must differ, both are {:?}",
                config.clean_list
            ),
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> CleanerConfig {
        let live = dir.path().join("live");
        std::fs::create_dir(&live).unwrap();
        CleanerConfig {
            live_dir: live,
            bundle_file: "fullchain.pem".to_string(),
            duplicates_list: dir.path().join("dupes.txt"),
            clean_list: dir.path().join("clean.txt"),
        }
    }

    #[test]
    fn test_valid_layout() {
        let dir = TempDir::new().unwrap();
        let result = validate_paths(&config_in(&dir));
        assert!(result.is_ok(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_live_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.live_dir = dir.path().join("missing");

        let result = validate_paths(&config);
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("Live directory not found")));
    }

    #[test]
    fn test_live_dir_is_file() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        let file = dir.path().join("file");
        std::fs::write(&file, b"").unwrap();
        config.live_dir = file;

        let result = validate_paths(&config);
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("is not a directory")));
    }

    #[test]
    fn test_bundle_file_with_separator() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.bundle_file = "../fullchain.pem".to_string();

        let result = validate_paths(&config);
        assert!(result
            .errors
            .iter()
            .any(|e| e.category == ErrorCategory::Value && e.message.contains("bundle-file")));
    }

    #[test]
    fn test_list_parent_missing() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.clean_list = dir.path().join("nope").join("clean.txt");

        let result = validate_paths(&config);
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("clean-list parent directory not found")));
    }

    #[test]
    fn test_identical_lists() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.clean_list = config.duplicates_list.clone();

        let result = validate_paths(&config);
        assert!(result.errors.iter().any(|e| e.message.contains("must differ")));
    }

    #[test]
    fn test_list_inside_live_dir_warns() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.duplicates_list = config.live_dir.join("dupes.txt");

        let result = validate_paths(&config);
        assert!(result.is_ok());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("inside the live directory"));
    }
}
