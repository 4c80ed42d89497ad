//! Redundancy checks shared by both deduplication modes
//!
//! Content hashing for exact duplicates, the substring containment test,
//! and the chunking of a sorted candidate list into contiguous groups.

use bstr::ByteSlice;
use sha2::{Digest as _, Sha256};
use std::ops::Range;

use crate::record::SeqRecord;

/// 256-bit content digest
pub type Digest = [u8; 32];

/// SHA-256 of the raw sequence bytes
#[inline]
pub fn content_digest(sequence: &[u8]) -> Digest {
    Sha256::digest(sequence).into()
}

/// True if `needle`'s sequence occurs verbatim inside `haystack`'s
///
/// Identical sequences contain each other. Orientation is not considered.
#[inline]
pub fn contains(haystack: &SeqRecord, needle: &SeqRecord) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.sequence.contains_str(&needle.sequence)
}

/// Split `len` sorted candidates into contiguous groups for `workers` threads
///
/// Groups hold `len / workers` records (at least one); a remainder becomes a
/// final, shorter group.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let size = (len / workers.max(1)).max(1);
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}

/// Ordinals in `group` that no strictly longer member of the same group contains
///
/// Equal-length copies are left for the content registry to collapse.
pub fn isolated_survivors(candidates: &[SeqRecord], group: Range<usize>) -> Vec<usize> {
    let members = &candidates[group.clone()];
    group
        .filter(|&ordinal| {
            let record = &candidates[ordinal];
            !members
                .iter()
                .any(|other| other.len() > record.len() && contains(other, record))
        })
        .collect()
}
