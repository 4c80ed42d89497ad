//! Redundancy-elimination engine
//!
//! Candidates are sorted longest first, cut into contiguous groups and
//! filtered on a dedicated rayon pool. Two modes are offered:
//!
//! - [`Mode::Exact`] walks the groups one after another. Every record kept
//!   so far is visible to the next group, so a single pass is complete.
//! - [`Mode::Concurrent`] filters all groups at once, each only against its
//!   own members, and repeats rounds until a merged pass over the survivors
//!   removes nothing more.
//!
//! Both modes return the same records for the same input: one record per
//! distinct sequence that no longer sequence contains, taking the earliest
//! candidate among identical sequences, ordered longest first.

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::Receiver;
use log::{debug, trace};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use crate::admission::{AcceptedSet, Admission, ContentRegistry};
use crate::algorithm::{Digest, content_digest, contains, isolated_survivors, partition};
use crate::record::{SeqRecord, retain_ordinals, sort_candidates};

/// Execution policy for a deduplication run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// One sequential pass over the groups with global visibility
    #[default]
    Exact,
    /// Parallel rounds repeated until the survivor count stops shrinking
    Concurrent,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Exact => f.write_str("exact"),
            Mode::Concurrent => f.write_str("concurrent"),
        }
    }
}

/// Body of the thread that owns the content registry during a round
type RegistryOwner = fn(Receiver<Admission>) -> ContentRegistry;

/// Counters describing one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupStats {
    pub mode: Mode,
    pub candidates: usize,
    pub survivors: usize,
    pub rounds: usize,
}

impl DedupStats {
    #[inline]
    pub fn removed(&self) -> usize {
        self.candidates - self.survivors
    }
}

/// Surviving records plus run statistics
#[derive(Debug)]
pub struct Deduplicated {
    pub records: Vec<SeqRecord>,
    pub stats: DedupStats,
}

/// Removes exact duplicates and contained sequences from a record list
pub struct Deduplicator {
    mode: Mode,
    workers: usize,
    pool: rayon::ThreadPool,
}

impl Deduplicator {
    /// Build an engine with its own pool of `workers` threads
    pub fn new(mode: Mode, workers: usize) -> Result<Self> {
        if workers == 0 {
            bail!("worker count must be at least 1");
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("fadedup-worker-{i}"))
            .build()
            .context("failed to build worker pool")?;
        Ok(Self {
            mode,
            workers,
            pool,
        })
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Deduplicate `records`
    ///
    /// The output is ordered by descending sequence length, ties in input
    /// order.
    pub fn run(&self, mut records: Vec<SeqRecord>) -> Result<Deduplicated> {
        sort_candidates(&mut records);
        let candidates = records.len();

        let (records, rounds) = match self.mode {
            Mode::Exact => (self.run_exact(records), 1),
            Mode::Concurrent => self.run_concurrent(records, ContentRegistry::drain)?,
        };

        Ok(Deduplicated {
            stats: DedupStats {
                mode: self.mode,
                candidates,
                survivors: records.len(),
                rounds,
            },
            records,
        })
    }

    fn run_exact(&self, candidates: Vec<SeqRecord>) -> Vec<SeqRecord> {
        let groups = partition(candidates.len(), self.workers);
        let kept = {
            let mut accepted = AcceptedSet::new(&candidates);
            for group in groups {
                self.exact_group(&candidates, &mut accepted, group);
            }
            accepted.into_ordinals()
        };
        retain_ordinals(candidates, &kept)
    }

    /// Filter one group against everything accepted so far, then commit it
    fn exact_group(&self, candidates: &[SeqRecord], accepted: &mut AcceptedSet<'_>, group: Range<usize>) {
        let committed = &*accepted;
        let passing: Vec<(usize, Digest)> = self.pool.install(|| {
            group
                .clone()
                .into_par_iter()
                .filter_map(|ordinal| {
                    let record = &candidates[ordinal];
                    let digest = content_digest(&record.sequence);
                    (!committed.subsumes(record, &digest)).then_some((ordinal, digest))
                })
                .collect()
        });

        // earlier members of this group were not visible to the parallel check
        let mark = accepted.len();
        let before = passing.len();
        let admitted = passing
            .into_iter()
            .filter(|&(ordinal, digest)| accepted.try_admit(ordinal, digest, mark))
            .count();
        trace!(
            "group {}..{}: {} passed accepted set, {} admitted",
            group.start,
            group.end,
            before,
            admitted
        );
    }

    fn run_concurrent(
        &self,
        candidates: Vec<SeqRecord>,
        owner: RegistryOwner,
    ) -> Result<(Vec<SeqRecord>, usize)> {
        let limit = candidates.len() + 1;
        let mut current = candidates;
        let mut rounds = 0;

        loop {
            rounds += 1;
            if rounds > limit {
                bail!("no fixed point after {limit} rounds");
            }

            let kept = self.concurrent_round(&current, owner)?;
            let survivors = retain_ordinals(current, &kept);
            let before = survivors.len();

            let kept = self.merged_pass(&survivors);
            let after = kept.len();
            let reduced = retain_ordinals(survivors, &kept);
            debug!("round {rounds}: {before} survivors, {after} after merged pass");

            if after == before {
                return Ok((reduced, rounds));
            }
            current = reduced;
        }
    }

    /// One parallel round: every group filtered in isolation, survivors
    /// admitted through a single registry owner
    fn concurrent_round(&self, candidates: &[SeqRecord], owner: RegistryOwner) -> Result<Vec<usize>> {
        let groups = partition(candidates.len(), self.workers);
        let (requests, inbox) = crossbeam_channel::unbounded::<Admission>();

        std::thread::scope(|scope| {
            let owner = scope.spawn(move || owner(inbox));

            let dispatched: Result<()> = self.pool.install(move || {
                groups.into_par_iter().try_for_each_with(requests, |requests, group| {
                    let (start, end) = (group.start, group.end);
                    for ordinal in isolated_survivors(candidates, group) {
                        let digest = content_digest(&candidates[ordinal].sequence);
                        requests
                            .send(Admission { ordinal, digest })
                            .map_err(|_| anyhow!("admission channel closed while filtering group {start}..{end}"))?;
                    }
                    Ok(())
                })
            });

            let registry = owner
                .join()
                .map_err(|_| anyhow!("admission owner thread panicked"))?;
            dispatched?;
            trace!(
                "registry admitted {} of {} offers",
                registry.len(),
                registry.offers()
            );
            Ok(registry.into_ordinals())
        })
    }

    /// Treat `survivors` as a single group: drop anything a strictly longer
    /// survivor contains, then keep the first copy of each sequence
    fn merged_pass(&self, survivors: &[SeqRecord]) -> Vec<usize> {
        let uncontained: Vec<(usize, Digest)> = self.pool.install(|| {
            (0..survivors.len())
                .into_par_iter()
                .filter_map(|ordinal| {
                    let record = &survivors[ordinal];
                    let contained = survivors
                        .iter()
                        .any(|other| other.len() > record.len() && contains(other, record));
                    (!contained).then(|| (ordinal, content_digest(&record.sequence)))
                })
                .collect()
        });

        let mut seen = HashSet::with_capacity(uncontained.len());
        uncontained
            .into_iter()
            .filter(|(_, digest)| seen.insert(*digest))
            .map(|(ordinal, _)| ordinal)
            .collect()
    }
}

/// Deduplicate with a throwaway engine
pub fn deduplicate(records: Vec<SeqRecord>, mode: Mode, workers: usize) -> Result<Deduplicated> {
    Deduplicator::new(mode, workers)?.run(records)
}
