//! Bundle file access
//!
//! [`BundleIo`] is the seam between the pure [`bundle`](crate::bundle)
//! pipeline and storage. [`classify_bundle`], [`clean_bundle`] and
//! [`inspect_bundle`] read a bundle fresh on every call and never cache.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace};

use crate::bundle::{self, Bundle, Classification};
use crate::error::BundleError;

/// Byte-level access to bundle files.
pub trait BundleIo {
    /// Read the whole file
    fn load(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the whole file. Implementations must never leave a partially
    /// written file behind.
    fn store(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Filesystem implementation of [`BundleIo`].
///
/// Writes go through [`bundle::persist`]: temporary file plus rename, mode
/// `0600`. Certbot's live directory holds symlinks into its archive
/// directory, so a symlinked bundle is resolved first and the file it points
/// at is replaced; the link itself stays in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBundleIo;

impl BundleIo for FsBundleIo {
    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn store(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let target = match fs::canonicalize(path) {
            Ok(real) => real,
            Err(e) if e.kind() == io::ErrorKind::NotFound => path.to_path_buf(),
            Err(e) => return Err(e),
        };
        if target != path {
            trace!(path = %path.display(), target = %target.display(), "Resolved bundle symlink");
        }
        bundle::persist(&target, bytes)
    }
}

/// Result of cleaning one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanOutcome {
    /// Content blocks before cleaning
    pub blocks_before: usize,
    /// Content blocks written back
    pub blocks_after: usize,
}

impl CleanOutcome {
    /// Number of duplicate blocks dropped
    pub fn removed(&self) -> usize {
        self.blocks_before - self.blocks_after
    }
}

/// Full description of one bundle, without modifying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleReport {
    pub duplicate_found: bool,
    /// Content blocks in the file
    pub blocks: usize,
    /// Distinct content blocks in the file
    pub distinct_blocks: usize,
    /// Whether cleaning would change the file's bytes
    pub would_change: bool,
}

fn load(io: &impl BundleIo, path: &Path) -> Result<Vec<u8>, BundleError> {
    io.load(path).map_err(|source| BundleError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and classify a bundle
pub fn classify_bundle(io: &impl BundleIo, path: &Path) -> Result<Classification, BundleError> {
    let data = load(io, path)?;
    let classification = bundle::classify(&bundle::segment(&data));

    trace!(
        path = %path.display(),
        duplicate_found = classification.duplicate_found,
        blocks_scanned = classification.blocks_scanned,
        "Classified bundle"
    );

    Ok(classification)
}

/// Rewrite a bundle in place keeping only the first occurrence of each block.
///
/// Always rewrites, so a bundle without duplicates still ends up with
/// exactly one trailing newline and owner-only permissions. Running it twice
/// produces the same bytes as running it once.
pub fn clean_bundle(io: &impl BundleIo, path: &Path) -> Result<CleanOutcome, BundleError> {
    let data = load(io, path)?;
    let parsed = Bundle::parse(&data);
    let cleaned = parsed.deduplicated();

    io.store(path, &cleaned.to_bytes())
        .map_err(|source| BundleError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    let outcome = CleanOutcome {
        blocks_before: parsed.len(),
        blocks_after: cleaned.len(),
    };

    debug!(
        path = %path.display(),
        blocks_before = outcome.blocks_before,
        blocks_after = outcome.blocks_after,
        "Rewrote bundle"
    );

    Ok(outcome)
}

/// Read a bundle and describe what cleaning would do
pub fn inspect_bundle(io: &impl BundleIo, path: &Path) -> Result<BundleReport, BundleError> {
    let data = load(io, path)?;
    let parsed = Bundle::parse(&data);
    let cleaned = parsed.deduplicated();

    Ok(BundleReport {
        duplicate_found: parsed.classify().duplicate_found,
        blocks: parsed.len(),
        distinct_blocks: cleaned.len(),
        would_change: cleaned.to_bytes() != data,
    })
}
