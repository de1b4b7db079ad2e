//! Vanity address search for eth-vanity.
//!
//! Each attempt draws a fresh 24-word root secret, derives one account and
//! tests its checksummed address against a [`MatchPredicate`].

#![forbid(unsafe_code)]

pub mod generator;
pub mod matcher;
pub mod parallel;

pub use generator::Candidate;
pub use matcher::{estimate_difficulty, MatchPredicate};
pub use parallel::{
    search, search_sequential, Progress, SearchConfig, SearchCounters, SearchError,
    SearchObserver, SearchResult, StopReason,
};
