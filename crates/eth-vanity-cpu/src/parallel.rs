//! Vanity search loops.
//!
//! `search_sequential` runs one attempt at a time on the caller's RNG.
//! `search` runs batches of attempts on a rayon pool, one `ChaCha20Rng`
//! per worker seeded from `OsRng`. In both, matches are persisted on the
//! calling thread, one at a time, before the match counter moves.

#![forbid(unsafe_code)]

use crate::generator::Candidate;
use crate::matcher::MatchPredicate;
use eth_vanity_bip::DerivationPath;
use eth_vanity_keystore::{AccountStore, DerivedAccount};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info};

/// Attempts handed to the pool per round.
pub const BATCH_SIZE: u64 = 1000;

/// Default progress cadence, in attempts.
pub const DEFAULT_REPORT_EVERY: u64 = 1000;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Search failure.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Key(#[from] eth_vanity_core::Error),

    #[error("failed to persist {address}: {source}")]
    Persist {
        address: String,
        #[source]
        source: BoxError,
    },

    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error(transparent)]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Search parameters.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Path derived for every candidate
    pub path: DerivationPath,
    /// Matches to persist before stopping
    pub quota: u64,
    /// Worker threads; 0 lets rayon decide
    pub workers: usize,
    /// Progress cadence in attempts; 0 disables progress reports
    pub report_every: u64,
    /// Stop after this many attempts even without a full quota
    pub max_attempts: Option<u64>,
}

impl SearchConfig {
    /// One match at `path`, default workers and cadence, no attempt budget.
    pub fn new(path: DerivationPath) -> Self {
        Self {
            path,
            quota: 1,
            workers: 0,
            report_every: DEFAULT_REPORT_EVERY,
            max_attempts: None,
        }
    }
}

/// Attempt and match totals, readable from other threads while a search runs.
#[derive(Debug, Default)]
pub struct SearchCounters {
    attempts: AtomicU64,
    matches: AtomicU64,
}

impl SearchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn matches(&self) -> u64 {
        self.matches.load(Ordering::Relaxed)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            attempts: self.attempts(),
            matches: self.matches(),
        }
    }

    fn add_attempts(&self, n: u64) {
        self.attempts.fetch_add(n, Ordering::Relaxed);
    }

    fn add_match(&self) {
        self.matches.fetch_add(1, Ordering::Relaxed);
    }
}

/// Totals for the current search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub attempts: u64,
    pub matches: u64,
}

/// Receives search events on the calling thread.
pub trait SearchObserver {
    /// Called every `report_every` attempts.
    fn on_progress(&mut self, _progress: Progress) {}

    /// Called after a match has been persisted.
    fn on_match(&mut self, _account: &DerivedAccount, _progress: Progress) {}
}

impl SearchObserver for () {}

/// Why a search returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    QuotaReached,
    Cancelled,
    AttemptsExhausted,
}

/// Result of a vanity search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Attempts completed by this search
    pub attempts: u64,
    /// Matches persisted by this search
    pub matches: u64,
    pub stop: StopReason,
}

/// Shared state of one search run.
struct Run<'a, O: ?Sized> {
    predicate: &'a MatchPredicate,
    config: &'a SearchConfig,
    counters: &'a SearchCounters,
    stop: &'a AtomicBool,
    observer: &'a mut O,
    persist: &'a mut dyn FnMut(&AccountStore) -> Result<(), BoxError>,
    progress: Progress,
}

impl<'a, O: SearchObserver + ?Sized> Run<'a, O> {
    /// Reason to stop before the next attempt, if any.
    fn should_stop(&self) -> Option<StopReason> {
        if self.progress.matches >= self.config.quota {
            Some(StopReason::QuotaReached)
        } else if self.stop.load(Ordering::Relaxed) {
            Some(StopReason::Cancelled)
        } else if self.remaining_attempts() == 0 {
            Some(StopReason::AttemptsExhausted)
        } else {
            None
        }
    }

    fn remaining_attempts(&self) -> u64 {
        self.config
            .max_attempts
            .map_or(u64::MAX, |max| max.saturating_sub(self.progress.attempts))
    }

    /// Count `n` finished attempts and report if a cadence boundary passed.
    fn record_attempts(&mut self, n: u64) {
        let before = self.progress.attempts;
        self.progress.attempts += n;
        self.counters.add_attempts(n);

        let every = self.config.report_every;
        if every > 0 && before / every != self.progress.attempts / every {
            debug!(
                attempts = self.progress.attempts,
                matches = self.progress.matches,
                "search in progress"
            );
            self.observer.on_progress(self.progress);
        }
    }

    /// Persist a match and count it. Surplus matches past the quota are dropped.
    fn record_match(&mut self, candidate: Candidate) -> Result<(), SearchError> {
        if self.progress.matches >= self.config.quota {
            return Ok(());
        }

        let address = candidate.address().to_string();
        let account = candidate.account().clone();
        let store = candidate.into_store();

        (self.persist)(&store).map_err(|e| SearchError::Persist {
            address: address.clone(),
            source: e,
        })?;

        self.progress.matches += 1;
        self.counters.add_match();
        info!(
            address = %address,
            matches = self.progress.matches,
            attempts = self.progress.attempts,
            "found matching address"
        );
        self.observer.on_match(&account, self.progress);
        Ok(())
    }

    fn finish(self, stop: StopReason) -> SearchResult {
        SearchResult {
            attempts: self.progress.attempts,
            matches: self.progress.matches,
            stop,
        }
    }
}

/// Reference loop: one attempt at a time, drawing entropy from `rng`.
///
/// Returns once `config.quota` matches are persisted, `stop` is set, or the
/// attempt budget runs out. `persist` sees each match's single-entry store
/// before it is counted; its error aborts the search.
pub fn search_sequential<R, O, P, E>(
    rng: &mut R,
    predicate: &MatchPredicate,
    config: &SearchConfig,
    counters: &SearchCounters,
    stop: &AtomicBool,
    observer: &mut O,
    mut persist: P,
) -> Result<SearchResult, SearchError>
where
    R: RngCore + CryptoRng,
    O: SearchObserver + ?Sized,
    P: FnMut(&AccountStore) -> Result<(), E>,
    E: Into<BoxError>,
{
    let mut persist = |store: &AccountStore| -> Result<(), BoxError> {
        persist(store).map_err(Into::into)
    };
    let mut run = Run {
        predicate,
        config,
        counters,
        stop,
        observer,
        persist: &mut persist,
        progress: Progress::default(),
    };

    loop {
        if let Some(reason) = run.should_stop() {
            return Ok(run.finish(reason));
        }

        let candidate = Candidate::generate(rng, &config.path)?;
        run.record_attempts(1);

        if run.predicate.matches(candidate.address()) {
            run.record_match(candidate)?;
        }
    }
}

/// Parallel search on a dedicated rayon pool of `config.workers` threads.
///
/// Same contract as [`search_sequential`]. The stop flag is also polled per
/// attempt inside a batch; attempts already running finish, and their
/// matches are persisted only if the quota still needs them.
pub fn search<O, P, E>(
    predicate: &MatchPredicate,
    config: &SearchConfig,
    counters: &SearchCounters,
    stop: &AtomicBool,
    observer: &mut O,
    mut persist: P,
) -> Result<SearchResult, SearchError>
where
    O: SearchObserver + ?Sized,
    P: FnMut(&AccountStore) -> Result<(), E>,
    E: Into<BoxError>,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("eth-vanity-{}", i))
        .build()?;

    let mut persist = |store: &AccountStore| -> Result<(), BoxError> {
        persist(store).map_err(Into::into)
    };
    let mut run = Run {
        predicate,
        config,
        counters,
        stop,
        observer,
        persist: &mut persist,
        progress: Progress::default(),
    };

    debug!(
        workers = pool.current_num_threads(),
        path = %config.path,
        quota = config.quota,
        "starting parallel search"
    );

    loop {
        if let Some(reason) = run.should_stop() {
            return Ok(run.finish(reason));
        }

        let batch = BATCH_SIZE.min(run.remaining_attempts());
        let outcomes = pool.install(|| run_batch(batch, predicate, &config.path, stop))?;

        run.record_attempts(outcomes.attempts);
        for candidate in outcomes.found {
            run.record_match(candidate)?;
        }
    }
}

struct BatchOutcome {
    attempts: u64,
    found: Vec<Candidate>,
}

enum Attempt {
    Skipped,
    Miss,
    Hit(Box<Candidate>),
}

fn run_batch(
    batch: u64,
    predicate: &MatchPredicate,
    path: &DerivationPath,
    stop: &AtomicBool,
) -> Result<BatchOutcome, SearchError> {
    let attempts: Vec<Attempt> = (0..batch)
        .into_par_iter()
        .map_init(
            || ChaCha20Rng::from_rng(OsRng),
            |rng, _| -> Result<Attempt, SearchError> {
                if stop.load(Ordering::Relaxed) {
                    return Ok(Attempt::Skipped);
                }
                let rng = rng
                    .as_mut()
                    .map_err(|e| SearchError::Entropy(e.to_string()))?;

                let candidate = Candidate::generate(rng, path)?;
                if predicate.matches(candidate.address()) {
                    Ok(Attempt::Hit(Box::new(candidate)))
                } else {
                    Ok(Attempt::Miss)
                }
            },
        )
        .collect::<Result<_, SearchError>>()?;

    let mut outcome = BatchOutcome {
        attempts: 0,
        found: Vec::new(),
    };
    for attempt in attempts {
        match attempt {
            Attempt::Skipped => {}
            Attempt::Miss => outcome.attempts += 1,
            Attempt::Hit(candidate) => {
                outcome.attempts += 1;
                outcome.found.push(*candidate);
            }
        }
    }
    Ok(outcome)
}
