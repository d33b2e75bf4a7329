//! Serializing blocks and replacing bundle files.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::warn;

use super::CertificateBlock;

/// Mode of rewritten bundles: owner read/write only
pub const BUNDLE_FILE_MODE: u32 = 0o600;

/// Concatenate blocks and terminate with exactly one newline.
///
/// Blocks already end with the end marker, so no separator is inserted. An
/// empty sequence serializes to `"\n"`.
pub fn serialize(blocks: &[CertificateBlock]) -> Vec<u8> {
    let total = blocks.iter().map(CertificateBlock::len).sum::<usize>() + 1;
    let mut out = Vec::with_capacity(total);
    for block in blocks {
        out.extend_from_slice(block.as_bytes());
    }
    out.push(b'\n');
    out
}

/// Atomically replace `path` with `bytes`, mode `0600`.
///
/// See [`persist_with_mode`].
pub fn persist(path: &Path, bytes: &[u8]) -> io::Result<()> {
    persist_with_mode(path, bytes, BUNDLE_FILE_MODE)
}

/// Atomically replace `path` with `bytes`.
///
/// The bytes go to a temporary file in the same directory, which is synced
/// and then renamed over `path`. Readers see either the old file or the new
/// one. On any error before the rename the temporary file is removed and
/// `path` is untouched. On Unix the directory is synced after the rename; a
/// failure there is logged, since `path` already holds the new bytes.
/// `mode` is applied on Unix and ignored elsewhere.
pub fn persist_with_mode(path: &Path, bytes: &[u8], mode: u32) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tmp.persist(path).map_err(|e| e.error)?;

    if let Err(e) = sync_dir(dir) {
        warn!(dir = %dir.display(), error = %e, "Failed to sync directory after rename");
    }
    Ok(())
}

/// Flush a directory entry change (the rename) to disk.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
