//! KDL configuration parsing.
//!
//! ```kdl
//! cleaner {
//!     live-dir "/etc/letsencrypt/live"
//!     bundle-file "fullchain.pem"
//!     duplicates-list "/etc/letsencrypt/certswithduplicateentries.txt"
//!     clean-list "/etc/letsencrypt/perfectcerts.txt"
//! }
//! ```

mod cleaner;
mod helpers;

pub use cleaner::parse_cleaner_config;

use kdl::KdlDocument;
use tracing::trace;

use crate::{CleanerConfig, ConfigError};

/// Parse a whole configuration document.
///
/// An empty document yields the defaults. The only top-level node accepted is
/// `cleaner`, and it may appear at most once.
pub fn parse_document(doc: &KdlDocument) -> Result<CleanerConfig, ConfigError> {
    let mut config = None;

    for node in doc.nodes() {
        match node.name().value() {
            "cleaner" => {
                if config.is_some() {
                    return Err(ConfigError::Invalid(
                        "duplicate 'cleaner' block".to_string(),
                    ));
                }
                config = Some(parse_cleaner_config(node)?);
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown top-level node '{}', expected 'cleaner'",
                    other
                )));
            }
        }
    }

    trace!(has_cleaner_block = config.is_some(), "Parsed configuration document");
    Ok(config.unwrap_or_default())
}
