//! Splitting bundle bytes into certificate blocks.

use super::{CertificateBlock, END_MARKER};

/// Split raw bundle bytes into certificate blocks.
///
/// The input is split on every end marker. Fragments that are empty or only
/// whitespace are dropped (the tail after the last certificate is normally a
/// single newline); every other fragment gets its end marker re-appended.
/// Garbage input is not an error, it simply yields whatever blocks it has.
pub fn segment(data: &[u8]) -> Vec<CertificateBlock> {
    split_on(data, END_MARKER)
        .filter(|fragment| !is_blank(fragment))
        .map(|fragment| {
            let mut block = Vec::with_capacity(fragment.len() + END_MARKER.len());
            block.extend_from_slice(fragment);
            block.extend_from_slice(END_MARKER);
            CertificateBlock(block)
        })
        .collect()
}

/// Whether a fragment consists only of spaces, tabs and newlines.
///
/// `\r` is content: a CRLF tail after the last end marker is kept as a block.
fn is_blank(fragment: &[u8]) -> bool {
    fragment.iter().all(|b| matches!(b, b' ' | b'\t' | b'\n'))
}

/// Iterator over the pieces of `data` between occurrences of `delimiter`.
///
/// Always yields one more piece than there are delimiters, like
/// `str::split`. `delimiter` must not be empty.
fn split_on<'a>(data: &'a [u8], delimiter: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let mut rest = Some(data);
    std::iter::from_fn(move || {
        let current = rest?;
        match find(current, delimiter) {
            Some(pos) => {
                rest = Some(&current[pos + delimiter.len()..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
