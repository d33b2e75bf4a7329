//! `cleaner` block parsing.

use std::path::PathBuf;
use tracing::trace;

use crate::{check_bundle_file, CleanerConfig, ConfigError};

use super::helpers::{get_first_arg_string, has_first_arg};

/// Parse the `cleaner` configuration block
///
/// Fields that are not present keep their default values.
pub fn parse_cleaner_config(node: &kdl::KdlNode) -> Result<CleanerConfig, ConfigError> {
    trace!("Parsing cleaner configuration block");

    let mut config = CleanerConfig::default();

    let Some(children) = node.children() else {
        return Ok(config);
    };

    for child in children.nodes() {
        let key = child.name().value();
        let value = get_first_arg_string(child).ok_or_else(|| {
            if has_first_arg(child) {
                ConfigError::Invalid(format!("'{}' must be a string", key))
            } else {
                ConfigError::Invalid(format!(
                    "'{}' requires a value, e.g., {} \"...\"",
                    key, key
                ))
            }
        })?;

        match key {
            "live-dir" => config.live_dir = PathBuf::from(value),
            "bundle-file" => {
                check_bundle_file(&value)?;
                config.bundle_file = value;
            }
            "duplicates-list" => config.duplicates_list = PathBuf::from(value),
            "clean-list" => config.clean_list = PathBuf::from(value),
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown field '{}' in cleaner block. Valid fields: live-dir, bundle-file, duplicates-list, clean-list",
                    other
                )));
            }
        }
    }

    trace!(
        live_dir = %config.live_dir.display(),
        bundle_file = %config.bundle_file,
        "Parsed cleaner configuration"
    );

    Ok(config)
}
