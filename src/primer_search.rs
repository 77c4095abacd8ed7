// src/primer_search.rs
// PRIMER PAIR SEARCH
// Resumable scan for forward/reverse primer pairs flanking a target region.
//
// Scan order: forward start (ascending) -> forward length (ascending) -> for each accepted
// forward primer, reverse start (ascending) -> reverse length (ascending).
// The scan suspends after every CHECKPOINT_INTERVAL-th forward start and resumes from the
// next one, so all cursor and result state lives in `PrimerSearch` rather than on the stack.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::oligo::{Oligo, PrimerPair, Strand, TargetRegion};
use crate::{CHECKPOINT_INTERVAL, MAX_PRIMER_LEN, MIN_PRIMER_LEN, PRIMER_SEARCH_WINDOW};

pub const DEFAULT_TM: f64 = 60.0;
pub const DEFAULT_MAX_TM_DIFF: f64 = 3.0;
pub const DEFAULT_PAIR_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrimerSearchParams {
    pub region: TargetRegion,
    pub desired_tm: f64,
    pub max_tm_diff: f64,
    pub pair_count: usize,
}

impl PrimerSearchParams {
    pub fn new(region: TargetRegion) -> Self {
        Self {
            region,
            desired_tm: DEFAULT_TM,
            max_tm_diff: DEFAULT_MAX_TM_DIFF,
            pair_count: DEFAULT_PAIR_COUNT,
        }
    }
}

/// Reported at every checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchProgress {
    /// Next forward start to be scanned.
    pub position: usize,
    /// Pairs accepted so far (before deduplication).
    pub found: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    Checkpoint(SearchProgress),
    Finished,
}

/// Cooperative cancellation flag, checked at each checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Search state for one template/region. Each instance owns its cursors and results.
pub struct PrimerSearch<'a> {
    template: &'a str,
    params: PrimerSearchParams,
    forward_end: Option<usize>,
    reverse_range: Option<(usize, usize)>,
    forward_cursor: usize,
    results: Vec<PrimerPair>,
    finished: bool,
}

impl<'a> PrimerSearch<'a> {
    pub fn new(template: &'a str, params: PrimerSearchParams) -> Self {
        let region = params.region;

        let forward_start = region.start.saturating_sub(PRIMER_SEARCH_WINDOW);
        let forward_end = region.start.checked_sub(MIN_PRIMER_LEN);

        let reverse_start = region.end + MIN_PRIMER_LEN;
        let reverse_range = template
            .len()
            .checked_sub(MIN_PRIMER_LEN)
            .map(|last| last.min(region.end + PRIMER_SEARCH_WINDOW))
            .filter(|&end| reverse_start <= end)
            .map(|end| (reverse_start, end));

        debug!(forward_start, ?forward_end, ?reverse_range, "primer search space");

        Self {
            template,
            params,
            forward_end,
            reverse_range,
            forward_cursor: forward_start,
            results: Vec::new(),
            finished: params.pair_count == 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pairs accepted so far, before deduplication.
    pub fn found(&self) -> usize {
        self.results.len()
    }

    /// Advances the scan by up to one checkpoint interval.
    pub fn step(&mut self) -> SearchStep {
        if self.finished {
            return SearchStep::Finished;
        }
        let Some(forward_end) = self.forward_end else {
            self.finished = true;
            return SearchStep::Finished;
        };

        while self.forward_cursor <= forward_end {
            if self.scan_forward_start(self.forward_cursor) {
                self.finished = true;
                return SearchStep::Finished;
            }
            self.forward_cursor += 1;

            if self.forward_cursor % CHECKPOINT_INTERVAL == 0 {
                let progress = SearchProgress { position: self.forward_cursor, found: self.results.len() };
                debug!(position = progress.position, found = progress.found, "primer search checkpoint");
                return SearchStep::Checkpoint(progress);
            }
        }

        self.finished = true;
        SearchStep::Finished
    }

    /// Scans every length at one forward start. Returns true once the requested count is reached.
    fn scan_forward_start(&mut self, fwd_start: usize) -> bool {
        let p = self.params;
        let len = self.template.len();

        for fwd_len in MIN_PRIMER_LEN..=MAX_PRIMER_LEN {
            if fwd_start + fwd_len > len { break; }

            let Some(forward) = Oligo::evaluate(self.template, fwd_start, fwd_len, Strand::Forward, p.desired_tm, p.max_tm_diff) else {
                continue;
            };
            if !Oligo::clears_region(&forward, Strand::Forward, &p.region) { continue; }
            let Some((rev_lo, rev_hi)) = self.reverse_range else { continue };

            for rev_start in rev_lo..=rev_hi {
                for rev_len in MIN_PRIMER_LEN..=MAX_PRIMER_LEN {
                    if rev_start + rev_len > len { break; }

                    let Some(reverse) = Oligo::evaluate(self.template, rev_start, rev_len, Strand::Reverse, p.desired_tm, p.max_tm_diff) else {
                        continue;
                    };
                    if !Oligo::clears_region(&reverse, Strand::Reverse, &p.region) { continue; }

                    self.results.push(PrimerPair::new(forward.clone(), reverse));
                    if self.results.len() >= p.pair_count {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Consumes the search and returns the ranked list: ascending product length,
    /// unique by (forward start, reverse start), at most `pair_count` entries.
    pub fn finish(self) -> Vec<PrimerPair> {
        let ranked = finalize(self.results, self.params.pair_count);
        info!(pairs = ranked.len(), "primer search finished");
        ranked
    }
}

impl Iterator for PrimerSearch<'_> {
    type Item = SearchProgress;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            SearchStep::Checkpoint(progress) => Some(progress),
            SearchStep::Finished => None,
        }
    }
}

fn finalize(mut pairs: Vec<PrimerPair>, pair_count: usize) -> Vec<PrimerPair> {
    pairs.sort_by_key(|p| p.product_length);
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|p| seen.insert((p.forward.start, p.reverse.start)))
        .take(pair_count)
        .collect()
}

pub struct PrimerSearchEngine;

impl PrimerSearchEngine {
    /// Drives a search to completion, reporting the accepted-pair count at every checkpoint.
    /// A cancelled search stops at the next checkpoint and completes with what it has.
    pub fn search<P, C>(
        template: &str,
        params: PrimerSearchParams,
        cancel: &CancelToken,
        mut on_progress: P,
        on_complete: C,
    ) where
        P: FnMut(usize),
        C: FnOnce(Vec<PrimerPair>),
    {
        let mut search = PrimerSearch::new(template, params);
        for progress in search.by_ref() {
            on_progress(progress.found);
            if cancel.is_cancelled() {
                info!(position = progress.position, "primer search cancelled");
                break;
            }
        }
        on_complete(search.finish());
    }

    /// Runs without progress reporting and returns the ranked pairs.
    pub fn run(template: &str, params: PrimerSearchParams) -> Vec<PrimerPair> {
        let mut search = PrimerSearch::new(template, params);
        while search.step() != SearchStep::Finished {}
        search.finish()
    }
}
