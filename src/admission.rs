//! Ownership of the accepted records
//!
//! Exact mode keeps an [`AcceptedSet`] on the driving thread and only lends
//! it out read-only to the worker pool. Concurrent mode never shares its
//! state: groups send [`Admission`] requests over a channel to a single
//! owner that runs [`ContentRegistry::drain`].

use crossbeam_channel::Receiver;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::algorithm::{Digest, contains};
use crate::record::SeqRecord;

/// Records committed so far in exact mode, by ordinal into the candidate list
pub struct AcceptedSet<'a> {
    candidates: &'a [SeqRecord],
    accepted: Vec<usize>,
    seen: HashSet<Digest>,
}

impl<'a> AcceptedSet<'a> {
    pub fn new(candidates: &'a [SeqRecord]) -> Self {
        Self {
            candidates,
            accepted: Vec::new(),
            seen: HashSet::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    #[inline]
    pub fn is_seen(&self, digest: &Digest) -> bool {
        self.seen.contains(digest)
    }

    /// First accepted record at or after position `since` that contains `record`
    pub fn container_of(&self, record: &SeqRecord, since: usize) -> Option<usize> {
        self.accepted
            .get(since..)?
            .iter()
            .copied()
            .find(|&ordinal| contains(&self.candidates[ordinal], record))
    }

    /// True if `record` is an exact or contained copy of anything accepted
    pub fn subsumes(&self, record: &SeqRecord, digest: &Digest) -> bool {
        self.is_seen(digest) || self.container_of(record, 0).is_some()
    }

    /// Commit `ordinal` unless its content is already seen or lies inside a
    /// record accepted at or after position `since`
    ///
    /// Returns whether the record was admitted.
    pub fn try_admit(&mut self, ordinal: usize, digest: Digest, since: usize) -> bool {
        if self.is_seen(&digest) {
            return false;
        }
        if self.container_of(&self.candidates[ordinal], since).is_some() {
            return false;
        }
        self.seen.insert(digest);
        self.accepted.push(ordinal);
        true
    }

    /// Accepted ordinals in admission order
    pub fn into_ordinals(self) -> Vec<usize> {
        self.accepted
    }
}

/// Request from a group to keep the candidate at `ordinal`
#[derive(Debug, Clone, Copy)]
pub struct Admission {
    pub ordinal: usize,
    pub digest: Digest,
}

/// One admitted ordinal per distinct content
///
/// When the same content is offered more than once the lowest ordinal is
/// kept, so the outcome does not depend on which group reports first.
#[derive(Debug, Default)]
pub struct ContentRegistry {
    by_digest: HashMap<Digest, usize>,
    offers: usize,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an offer, keeping the lowest ordinal seen for its content
    pub fn offer(&mut self, admission: Admission) {
        self.offers += 1;
        match self.by_digest.entry(admission.digest) {
            Entry::Vacant(slot) => {
                slot.insert(admission.ordinal);
            }
            Entry::Occupied(mut slot) => {
                if admission.ordinal < *slot.get() {
                    slot.insert(admission.ordinal);
                }
            }
        }
    }

    /// Consume requests until every sender is dropped
    pub fn drain(requests: Receiver<Admission>) -> Self {
        let mut registry = Self::new();
        for admission in requests {
            registry.offer(admission);
        }
        registry
    }

    /// Distinct contents admitted so far
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.by_digest.len()
    }

    /// Number of offers received, including collapsed duplicates
    #[inline]
    pub fn offers(&self) -> usize {
        self.offers
    }

    /// Admitted ordinals, ascending
    pub fn into_ordinals(self) -> Vec<usize> {
        let mut ordinals: Vec<usize> = self.by_digest.into_values().collect();
        ordinals.sort_unstable();
        ordinals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::content_digest;

    fn candidates() -> Vec<SeqRecord> {
        vec![
            SeqRecord::new("a", "ACGTACGT"),
            SeqRecord::new("b", "ACGT"),
            SeqRecord::new("c", "TTTT"),
            SeqRecord::new("d", "ACGT"),
        ]
    }

    fn admission(records: &[SeqRecord], ordinal: usize) -> Admission {
        Admission {
            ordinal,
            digest: content_digest(&records[ordinal].sequence),
        }
    }

    #[test]
    fn test_accepted_set_rejects_contained_and_seen() {
        let records = candidates();
        let mut set = AcceptedSet::new(&records);
        let digest = |i: usize| content_digest(&records[i].sequence);

        assert!(set.try_admit(0, digest(0), 0));
        assert!(!set.try_admit(1, digest(1), 0)); // inside a
        assert!(set.try_admit(2, digest(2), 0));
        assert!(!set.try_admit(2, digest(2), 0)); // same content again
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_ordinals(), vec![0, 2]);
    }

    #[test]
    fn test_accepted_set_since_limits_containment_scan() {
        let records = candidates();
        let mut set = AcceptedSet::new(&records);
        let digest = |i: usize| content_digest(&records[i].sequence);

        assert!(set.try_admit(0, digest(0), 0));
        // only records accepted from position 1 on are scanned
        assert!(set.try_admit(1, digest(1), 1));
        assert_eq!(set.container_of(&records[3], 0), Some(0));
        assert_eq!(set.container_of(&records[3], 1), Some(1));
        assert_eq!(set.container_of(&records[3], 5), None);
    }

    #[test]
    fn test_accepted_set_subsumes() {
        let records = candidates();
        let mut set = AcceptedSet::new(&records);
        assert!(set.is_empty());
        set.try_admit(0, content_digest(&records[0].sequence), 0);
        assert!(set.subsumes(&records[1], &content_digest(&records[1].sequence)));
        assert!(!set.subsumes(&records[2], &content_digest(&records[2].sequence)));
    }

    #[test]
    fn test_registry_keeps_lowest_ordinal() {
        let records = candidates();
        let mut registry = ContentRegistry::new();
        registry.offer(admission(&records, 3));
        registry.offer(admission(&records, 1));
        registry.offer(admission(&records, 3));
        registry.offer(admission(&records, 2));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.offers(), 4);
        assert_eq!(registry.into_ordinals(), vec![1, 2]);
    }

    #[test]
    fn test_registry_drain_from_many_senders() {
        let records = candidates();
        let (tx, rx) = crossbeam_channel::unbounded();
        let owner = std::thread::spawn(move || ContentRegistry::drain(rx));

        std::thread::scope(|scope| {
            for ordinal in [3, 2, 1, 0] {
                let tx = tx.clone();
                let records = &records;
                scope.spawn(move || tx.send(admission(records, ordinal)).unwrap());
            }
        });
        drop(tx);

        let registry = owner.join().unwrap();
        assert_eq!(registry.offers(), 4);
        assert_eq!(registry.into_ordinals(), vec![0, 1, 2]);
    }
}
