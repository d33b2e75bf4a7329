//! Duplicate detection and removal.

use std::collections::HashSet;

use serde::Serialize;

use super::CertificateBlock;

/// Outcome of classifying one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// At least one block is a byte-exact repeat of an earlier block
    pub duplicate_found: bool,
    /// Content blocks examined before the scan stopped
    pub blocks_scanned: usize,
}

/// Classify a block sequence.
///
/// Stops at the first repeated block; `blocks_scanned` reports how far the
/// scan got.
pub fn classify(blocks: &[CertificateBlock]) -> Classification {
    let mut seen: HashSet<&[u8]> = HashSet::with_capacity(blocks.len());

    for (index, block) in blocks.iter().enumerate() {
        if !seen.insert(block.as_bytes()) {
            return Classification {
                duplicate_found: true,
                blocks_scanned: index + 1,
            };
        }
    }

    Classification {
        duplicate_found: false,
        blocks_scanned: blocks.len(),
    }
}

/// Keep the first occurrence of every distinct block, in input order.
///
/// Unlike [`classify`] this always walks the whole sequence.
pub fn deduplicate(blocks: &[CertificateBlock]) -> Vec<CertificateBlock> {
    let mut seen: HashSet<&[u8]> = HashSet::with_capacity(blocks.len());

    blocks
        .iter()
        .filter(|block| seen.insert(block.as_bytes()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixtures::*;
    use crate::bundle::segment;
    use proptest::prelude::*;

    #[test]
    fn test_classify_identical_pair() {
        let blocks = segment(&bundle(&[CERT_A, END, CERT_A, END]));
        let result = classify(&blocks);
        assert!(result.duplicate_found);
        assert_eq!(result.blocks_scanned, 2);
    }

    #[test]
    fn test_classify_distinct() {
        let blocks = segment(&bundle(&[CERT_A, END, CERT_B, END, CERT_C, END]));
        let result = classify(&blocks);
        assert!(!result.duplicate_found);
        assert_eq!(result.blocks_scanned, 3);
    }

    #[test]
    fn test_classify_short_circuits() {
        let blocks = segment(&bundle(&[
            CERT_B, END, CERT_B, END, CERT_C, END, CERT_C, END,
        ]));
        assert_eq!(classify(&blocks).blocks_scanned, 2);
    }

    #[test]
    fn test_classify_empty() {
        let result = classify(&[]);
        assert!(!result.duplicate_found);
        assert_eq!(result.blocks_scanned, 0);
        assert!(deduplicate(&[]).is_empty());
    }

    #[test]
    fn test_deduplicate_scans_everything() {
        let blocks = segment(&bundle(&[
            CERT_B, END, CERT_B, END, CERT_C, END, CERT_C, END, CERT_B, END,
        ]));
        let cleaned = deduplicate(&blocks);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0], blocks[0]);
        assert_eq!(cleaned[1], blocks[2]);
    }

    #[test]
    fn test_whitespace_difference_is_not_duplicate() {
        // Same certificate body, but one copy lacks the leading newline.
        let with_newline = format!("{}{}", CERT_B, END);
        let without_newline = format!("{}{}", &CERT_B[1..], END);
        let blocks = segment(format!("{}{}", without_newline, with_newline).as_bytes());
        assert_eq!(blocks.len(), 2);
        assert!(!classify(&blocks).duplicate_found);
        assert_eq!(deduplicate(&blocks).len(), 2);
    }

    fn arb_blocks() -> impl Strategy<Value = Vec<CertificateBlock>> {
        // A small alphabet so that repeats are common.
        prop::collection::vec(0usize..5, 0..16).prop_map(|picks| {
            picks
                .into_iter()
                .map(|i| {
                    let mut bytes =
                        format!("\n-----BEGIN CERTIFICATE-----\nbody{}\n", i).into_bytes();
                    bytes.extend_from_slice(crate::bundle::END_MARKER);
                    CertificateBlock(bytes)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_deduplicate_is_idempotent(blocks in arb_blocks()) {
            let once = deduplicate(&blocks);
            let twice = deduplicate(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_deduplicate_keeps_first_occurrences_in_order(blocks in arb_blocks()) {
            let mut expected: Vec<CertificateBlock> = Vec::new();
            for block in &blocks {
                if !expected.contains(block) {
                    expected.push(block.clone());
                }
            }
            prop_assert_eq!(deduplicate(&blocks), expected);
        }

        #[test]
        fn prop_classification_agrees_with_deduplicate(blocks in arb_blocks()) {
            let shrank = deduplicate(&blocks).len() < blocks.len();
            prop_assert_eq!(classify(&blocks).duplicate_found, shrank);
        }
    }
}
