//! Configuration loading and validation for certdedup.
//!
//! Configuration is layered: built-in defaults, then an optional KDL file,
//! then command-line or environment overrides ([`ConfigOverrides`]).

mod error;
pub mod kdl;
pub mod validate;

pub use error::ConfigError;
pub use validate::{ErrorCategory, ValidationError, ValidationResult, ValidationWarning};

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Default directory holding one subdirectory per certificate
pub const DEFAULT_LIVE_DIR: &str = "/etc/letsencrypt/live";

/// Default bundle file name inside each certificate directory
pub const DEFAULT_BUNDLE_FILE: &str = "fullchain.pem";

/// Default output path for identifiers whose bundle has duplicates
pub const DEFAULT_DUPLICATES_LIST: &str = "/etc/letsencrypt/certswithduplicateentries.txt";

/// Default output path for identifiers whose bundle is clean
pub const DEFAULT_CLEAN_LIST: &str = "/etc/letsencrypt/perfectcerts.txt";

/// Cleaner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CleanerConfig {
    /// Directory whose subdirectories each hold one bundle
    pub live_dir: PathBuf,

    /// Bundle file name inside each subdirectory
    pub bundle_file: String,

    /// List of identifiers whose bundle contains duplicate blocks
    pub duplicates_list: PathBuf,

    /// List of identifiers whose bundle has no duplicate blocks
    pub clean_list: PathBuf,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            live_dir: PathBuf::from(DEFAULT_LIVE_DIR),
            bundle_file: DEFAULT_BUNDLE_FILE.to_string(),
            duplicates_list: PathBuf::from(DEFAULT_DUPLICATES_LIST),
            clean_list: PathBuf::from(DEFAULT_CLEAN_LIST),
        }
    }
}

/// Values that take precedence over the file and the defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub live_dir: Option<PathBuf>,
    pub bundle_file: Option<String>,
    pub duplicates_list: Option<PathBuf>,
    pub clean_list: Option<PathBuf>,
}

impl CleanerConfig {
    /// Load configuration from a KDL file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration file");

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let doc: ::kdl::KdlDocument =
            content.parse().map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let config = crate::kdl::parse_document(&doc)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load from `path` when given, otherwise start from the defaults, then
    /// apply `overrides`.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No configuration file given, using defaults");
                Self::default()
            }
        };
        base.with_overrides(overrides)
    }

    /// Apply overrides on top of this configuration
    ///
    /// Fails when the overridden `bundle_file` is not a plain file name.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(live_dir) = overrides.live_dir {
            self.live_dir = live_dir;
        }
        if let Some(bundle_file) = overrides.bundle_file {
            check_bundle_file(&bundle_file)?;
            self.bundle_file = bundle_file;
        }
        if let Some(duplicates_list) = overrides.duplicates_list {
            self.duplicates_list = duplicates_list;
        }
        if let Some(clean_list) = overrides.clean_list {
            self.clean_list = clean_list;
        }
        Ok(self)
    }

    /// Full path of the bundle belonging to the directory `name`
    pub fn bundle_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.live_dir.join(name).join(&self.bundle_file)
    }

    /// Check the configuration against the filesystem
    pub fn validate(&self) -> ValidationResult {
        validate::validate_config(self)
    }
}

/// Whether `name` is a single normal path component, so that joining it onto
/// a directory cannot leave that directory.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}

pub(crate) fn check_bundle_file(name: &str) -> Result<(), ConfigError> {
    if is_plain_file_name(name) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "bundle-file must be a plain file name, got {:?}",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_letsencrypt_layout() {
        let config = CleanerConfig::default();
        assert_eq!(config.live_dir, PathBuf::from("/etc/letsencrypt/live"));
        assert_eq!(config.bundle_file, "fullchain.pem");
        assert_eq!(
            config.bundle_path("example.com"),
            PathBuf::from("/etc/letsencrypt/live/example.com/fullchain.pem")
        );
    }

    #[test]
    fn test_load_file_then_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certdedup.kdl");
        std::fs::write(
            &path,
            "cleaner {\n    live-dir \"/from/file\"\n    bundle-file \"chain.pem\"\n}\n",
        )
        .unwrap();

        let config = CleanerConfig::load(
            Some(path.as_path()),
            ConfigOverrides {
                live_dir: Some(PathBuf::from("/from/cli")),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.live_dir, PathBuf::from("/from/cli"));
        assert_eq!(config.bundle_file, "chain.pem");
        assert_eq!(config.clean_list, PathBuf::from(DEFAULT_CLEAN_LIST));
    }

    #[test]
    fn test_bundle_file_override_must_be_plain() {
        for bad in ["../victim.pem", "sub/fullchain.pem", "/etc/passwd", "..", ""] {
            let err = CleanerConfig::default()
                .with_overrides(ConfigOverrides {
                    bundle_file: Some(bad.to_string()),
                    ..Default::default()
                })
                .unwrap_err();
            assert!(
                err.to_string().contains("bundle-file must be a plain file name"),
                "{bad:?}: {err}"
            );
        }
    }

    #[test]
    fn test_load_rejects_traversing_bundle_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("certdedup.kdl");
        std::fs::write(&path, "cleaner {\n    bundle-file \"../victim.pem\"\n}\n").unwrap();

        let err = CleanerConfig::load(Some(path.as_path()), ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_is_plain_file_name() {
        assert!(is_plain_file_name("fullchain.pem"));
        assert!(is_plain_file_name(".hidden"));
        assert!(!is_plain_file_name("./fullchain.pem"));
        assert!(!is_plain_file_name("a/b"));
        assert!(!is_plain_file_name("."));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = CleanerConfig::load(None, ConfigOverrides::default()).unwrap();
        assert_eq!(config, CleanerConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CleanerConfig::from_file("/nonexistent/certdedup.kdl").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.kdl");
        std::fs::write(&path, "cleaner {\n    live-dir \"unterminated\n").unwrap();

        let err = CleanerConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_serializes_kebab_case() {
        let json = serde_json::to_value(CleanerConfig::default()).unwrap();
        assert_eq!(json["bundle-file"], "fullchain.pem");
        assert_eq!(json["live-dir"], "/etc/letsencrypt/live");
    }
}
