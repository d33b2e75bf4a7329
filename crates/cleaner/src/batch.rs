//! Batch operations over a live directory
//!
//! # Directory Structure
//!
//! ```text
//! live/
//! ├── example.com/
//! │   └── fullchain.pem     # bundle checked and cleaned
//! └── www.example.org/
//!     └── fullchain.pem
//! ```
//!
//! [`list`] classifies every bundle and writes two list files, one
//! identifier per line. [`clean`] reads the duplicates list back and rewrites
//! each bundle it names. One bundle failing never stops the others; only
//! problems that make the whole batch impossible surface as [`BatchError`].

use std::fs;
use std::path::{Path, PathBuf};

use certdedup_common::BundleId;
use certdedup_config::{is_plain_file_name, CleanerConfig};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bundle::persist_with_mode;
use crate::error::{BatchError, BatchResult, ItemError};
use crate::io::{classify_bundle, clean_bundle, inspect_bundle, BundleIo};

/// Mode of list files; they only hold directory names
pub const LIST_FILE_MODE: u32 = 0o644;

/// A bundle discovered in the live directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub id: BundleId,
    pub path: PathBuf,
}

/// A batch entry that was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// Identifier as it appeared in the input
    pub id: String,
    pub reason: String,
}

impl BatchFailure {
    fn new(id: impl Into<String>, error: &ItemError) -> Self {
        Self {
            id: id.into(),
            reason: error.to_string(),
        }
    }
}

/// Result of [`list`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListReport {
    /// Bundles containing at least one repeated block
    pub duplicates: Vec<BundleId>,
    /// Bundles without repeated blocks
    pub clean: Vec<BundleId>,
    pub failed: Vec<BatchFailure>,
}

impl ListReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// One bundle handled by [`clean`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedBundle {
    pub id: BundleId,
    pub blocks_before: usize,
    pub blocks_after: usize,
}

impl CleanedBundle {
    pub fn removed(&self) -> usize {
        self.blocks_before - self.blocks_after
    }
}

/// Result of [`clean`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Nothing was written
    pub dry_run: bool,
    pub cleaned: Vec<CleanedBundle>,
    pub failed: Vec<BatchFailure>,
}

impl CleanReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Total duplicate blocks removed (or that would be, on a dry run)
    pub fn blocks_removed(&self) -> usize {
        self.cleaned.iter().map(CleanedBundle::removed).sum()
    }
}

/// List subdirectories of `live_dir` that contain `bundle_file`, sorted by name.
///
/// `bundle_file` must be a plain file name.
pub fn enumerate_bundles(live_dir: &Path, bundle_file: &str) -> BatchResult<Vec<BundleEntry>> {
    check_bundle_file(bundle_file)?;

    let read_dir = fs::read_dir(live_dir).map_err(|source| BatchError::LiveDir {
        path: live_dir.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(live_dir = %live_dir.display(), error = %e, "Failed to read directory entry");
                continue;
            }
        };

        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!(entry = ?entry.file_name(), error = %e, "Failed to stat directory entry");
                continue;
            }
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(entry = ?entry.file_name(), "Skipping directory with non UTF-8 name");
            continue;
        };

        let id = match BundleId::parse(name) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Skipping directory");
                continue;
            }
        };

        let path = entry.path().join(bundle_file);
        if !path.exists() {
            debug!(bundle = %id, path = %path.display(), "No bundle file, skipping");
            continue;
        }

        entries.push(BundleEntry { id, path });
    }

    entries.sort_by(|a, b| a.id.cmp(&b.id));
    debug!(count = entries.len(), live_dir = %live_dir.display(), "Enumerated bundles");
    Ok(entries)
}

fn check_bundle_file(bundle_file: &str) -> BatchResult<()> {
    if is_plain_file_name(bundle_file) {
        Ok(())
    } else {
        Err(BatchError::BundleFile(bundle_file.to_string()))
    }
}

/// Read a list file: one identifier per line, trimmed, blank lines skipped.
pub fn read_list(path: &Path) -> BatchResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| BatchError::ListRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_list(&content))
}

fn parse_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Atomically write a list file, one newline-terminated identifier per line.
pub fn write_list(path: &Path, ids: &[BundleId]) -> BatchResult<()> {
    let mut content = String::new();
    for id in ids {
        content.push_str(id.as_str());
        content.push('\n');
    }

    persist_with_mode(path, content.as_bytes(), LIST_FILE_MODE).map_err(|source| {
        BatchError::ListWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!(path = %path.display(), count = ids.len(), "Wrote list file");
    Ok(())
}

/// Classify every bundle in the live directory and write both list files.
///
/// Bundles that cannot be read land in [`ListReport::failed`] and in neither
/// list. The clean list is written first; if writing the duplicates list then
/// fails, the previous duplicates list is left in place for `clean`.
pub fn list(config: &CleanerConfig, io: &impl BundleIo) -> BatchResult<ListReport> {
    info!(live_dir = %config.live_dir.display(), "Listing bundles");

    let mut report = ListReport::default();
    for entry in enumerate_bundles(&config.live_dir, &config.bundle_file)? {
        match classify_bundle(io, &entry.path) {
            Ok(classification) if classification.duplicate_found => {
                info!(
                    bundle = %entry.id,
                    path = %entry.path.display(),
                    "Bundle has duplicate entries"
                );
                report.duplicates.push(entry.id);
            }
            Ok(_) => {
                info!(
                    bundle = %entry.id,
                    path = %entry.path.display(),
                    "Bundle has no duplicate entries"
                );
                report.clean.push(entry.id);
            }
            Err(e) => {
                warn!(bundle = %entry.id, error = %e, "Failed to classify bundle");
                report
                    .failed
                    .push(BatchFailure::new(entry.id.into_string(), &e.into()));
            }
        }
    }

    write_list(&config.clean_list, &report.clean)?;
    info!(
        path = %config.clean_list.display(),
        count = report.clean.len(),
        "Bundles without duplicate entries written"
    );

    write_list(&config.duplicates_list, &report.duplicates)?;
    info!(
        path = %config.duplicates_list.display(),
        count = report.duplicates.len(),
        "Bundles with duplicate entries written"
    );

    Ok(report)
}

/// Clean every bundle named in the duplicates list.
///
/// With `dry_run` nothing is written; the report shows what would change.
pub fn clean(
    config: &CleanerConfig,
    io: &impl BundleIo,
    dry_run: bool,
) -> BatchResult<CleanReport> {
    check_bundle_file(&config.bundle_file)?;

    info!(
        list = %config.duplicates_list.display(),
        dry_run,
        "Cleaning bundles"
    );

    let mut report = CleanReport {
        dry_run,
        ..Default::default()
    };

    for raw in read_list(&config.duplicates_list)? {
        match clean_one(config, io, &raw, dry_run) {
            Ok(cleaned) => {
                info!(
                    bundle = %cleaned.id,
                    removed = cleaned.removed(),
                    dry_run,
                    "Cleaned bundle"
                );
                report.cleaned.push(cleaned);
            }
            Err(e) => {
                warn!(bundle = %raw, error = %e, "Failed to clean bundle");
                report.failed.push(BatchFailure::new(raw, &e));
            }
        }
    }

    Ok(report)
}

fn clean_one(
    config: &CleanerConfig,
    io: &impl BundleIo,
    raw: &str,
    dry_run: bool,
) -> Result<CleanedBundle, ItemError> {
    let id = BundleId::parse(raw)?;
    let path = config.bundle_path(&id);

    let (blocks_before, blocks_after) = if dry_run {
        let report = inspect_bundle(io, &path)?;
        (report.blocks, report.distinct_blocks)
    } else {
        let outcome = clean_bundle(io, &path)?;
        (outcome.blocks_before, outcome.blocks_after)
    };

    Ok(CleanedBundle {
        id,
        blocks_before,
        blocks_after,
    })
}
