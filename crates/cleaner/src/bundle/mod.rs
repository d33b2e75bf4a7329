//! PEM bundle segmentation, deduplication and rewriting
//!
//! A bundle (`fullchain.pem`) is a concatenation of PEM certificate blocks.
//! Renewal tooling occasionally appends the same block twice; this module
//! finds and removes such byte-identical repeats without reordering anything.
//!
//! # Pipeline
//!
//! ```text
//! bytes ──segment──▶ [CertificateBlock] ──classify──▶ Classification
//!                                      └─deduplicate─▶ [CertificateBlock] ──serialize──▶ bytes ──persist──▶ disk
//! ```
//!
//! Everything here except [`persist`] is pure. Equality is byte equality of
//! the block including its end marker: two certificates that decode to the
//! same DER but differ in line wrapping are distinct blocks.

mod dedup;
mod rewrite;
mod segment;

pub use dedup::{classify, deduplicate, Classification};
pub use rewrite::{persist, persist_with_mode, serialize, BUNDLE_FILE_MODE};
pub use segment::segment;

use std::fmt;

/// End marker terminating every certificate block
pub const END_MARKER: &[u8] = b"-----END CERTIFICATE-----";

/// One PEM certificate block, including its trailing end marker.
///
/// Any text between the previous end marker and this block's begin marker
/// (usually a single newline) belongs to this block.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CertificateBlock(Vec<u8>);

impl CertificateBlock {
    /// Raw bytes of the block
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the block and return its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the block has no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CertificateBlock {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CertificateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CertificateBlock")
            .field(&String::from_utf8_lossy(&self.0))
            .finish()
    }
}

/// An ordered sequence of certificate blocks read from one bundle file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    blocks: Vec<CertificateBlock>,
}

impl Bundle {
    /// Segment raw bundle bytes
    pub fn parse(data: &[u8]) -> Self {
        Self {
            blocks: segment(data),
        }
    }

    /// Blocks in file order
    pub fn blocks(&self) -> &[CertificateBlock] {
        &self.blocks
    }

    /// Number of content blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Classify this bundle
    pub fn classify(&self) -> Classification {
        classify(&self.blocks)
    }

    /// Bundle with only the first occurrence of each block
    pub fn deduplicated(&self) -> Self {
        Self {
            blocks: deduplicate(&self.blocks),
        }
    }

    /// Serialize back to bundle bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        serialize(&self.blocks)
    }
}

impl From<Vec<CertificateBlock>> for Bundle {
    fn from(blocks: Vec<CertificateBlock>) -> Self {
        Self { blocks }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared PEM fixtures for bundle tests.

    pub const CERT_A: &str = "-----BEGIN CERTIFICATE-----\n\
MIIBszCCAVmgAwIBAgIUQm9ndXNDZXJ0aWZpY2F0ZUFBQUFBMAoGCCqGSM49BAMC\n\
MBQxEjAQBgNVBAMMCWxlYWYuY2VydDAeFw0yNDAxMDEwMDAwMDBaFw0yNTAxMDEw\n";

    pub const CERT_B: &str = "\n-----BEGIN CERTIFICATE-----\n\
MIIBtDCCAVqgAwIBAgIUSW50ZXJtZWRpYXRlQkJCQkJCQkIwCgYIKoZIzj0EAwIw\n\
FjEUMBIGA1UEAwwLaW50ZXJtZWRpYXRlMB4XDTI0MDEwMTAwMDAwMFoXDTI2MDEw\n";

    pub const CERT_C: &str = "\n-----BEGIN CERTIFICATE-----\n\
MIIBpzCCAU2gAwIBAgIUUm9vdENDQ0NDQ0NDQ0NDQ0NDQ0MwCgYIKoZIzj0EAwIw\n";

    pub const END: &str = "-----END CERTIFICATE-----";

    /// Concatenate fixture parts into bundle bytes
    pub fn bundle(parts: &[&str]) -> Vec<u8> {
        parts.concat().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_bundle_parse_and_dedup() {
        let data = bundle(&[CERT_A, END, CERT_B, END, CERT_B, END, "\n"]);
        let parsed = Bundle::parse(&data);
        assert_eq!(parsed.len(), 3);
        assert!(parsed.classify().duplicate_found);

        let cleaned = parsed.deduplicated();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.to_bytes(), bundle(&[CERT_A, END, CERT_B, END, "\n"]));
    }

    #[test]
    fn test_empty_bundle() {
        let parsed = Bundle::parse(b"");
        assert!(parsed.is_empty());
        assert!(!parsed.classify().duplicate_found);
        assert_eq!(parsed.deduplicated().to_bytes(), b"\n");
    }

    #[test]
    fn test_block_debug_is_readable() {
        let parsed = Bundle::parse(&bundle(&[CERT_C, END]));
        let debug = format!("{:?}", parsed.blocks()[0]);
        assert!(debug.contains("END CERTIFICATE"));
    }
}
