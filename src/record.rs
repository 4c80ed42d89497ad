//! Sequence records and candidate ordering
//!
//! A `SeqRecord` is one FASTA entry. The engine works on a candidate list
//! sorted by descending sequence length and refers to records by their
//! position (ordinal) in that list.

use anyhow::Result;
use bstr::{BString, ByteSlice};
use std::io::Write;

/// One (identifier, sequence) pair
///
/// Both fields are kept as raw bytes; the sequence is compared verbatim,
/// without case folding or reverse-complementing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    pub id: BString,
    pub sequence: BString,
}

impl SeqRecord {
    #[inline]
    pub fn new(id: impl Into<BString>, sequence: impl Into<BString>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    /// Sequence length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Serialize as a two-line FASTA entry: `>id` then the unwrapped sequence
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(b">")?;
        w.write_all(self.id.as_bytes())?;
        w.write_all(b"\n")?;
        w.write_all(self.sequence.as_bytes())?;
        w.write_all(b"\n")?;
        Ok(())
    }
}

/// Order records longest first; equal lengths keep their input order
pub fn sort_candidates(records: &mut [SeqRecord]) {
    records.sort_by(|a, b| b.len().cmp(&a.len()));
}

/// Keep only the records at `ordinals`, preserving their relative order
///
/// `ordinals` may be in any order and may contain repeats; out-of-range
/// entries are ignored.
pub fn retain_ordinals(records: Vec<SeqRecord>, ordinals: &[usize]) -> Vec<SeqRecord> {
    let mut keep = vec![false; records.len()];
    for &ordinal in ordinals {
        if let Some(slot) = keep.get_mut(ordinal) {
            *slot = true;
        }
    }
    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, kept)| kept.then_some(record))
        .collect()
}
