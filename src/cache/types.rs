//! Shared state and statistics types for the caches

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a cache is memoizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// Every query goes straight to the calculator
    Inactive,

    /// Queries are answered from stored entries when possible
    Active,
}

impl CacheState {
    pub fn from_flag(active: bool) -> Self {
        if active {
            CacheState::Active
        } else {
            CacheState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CacheState::Active)
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheState::Inactive => write!(f, "inactive"),
            CacheState::Active => write!(f, "active"),
        }
    }
}

/// Counters describing how a cache has been used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Queries answered from a stored entry
    pub hits: u64,

    /// Active queries with no entry yet
    pub misses: u64,

    /// Queries made while inactive
    pub bypassed: u64,

    /// Entries recomputed because the node moved
    pub recomputed_moved: u64,

    /// Entries recomputed because the node changed in place
    pub recomputed_mutated: u64,

    /// Sweeps run, periodic or manual
    pub sweeps: u64,

    /// Entries removed by sweeps
    pub swept_entries: u64,

    /// Whole-table clears
    pub clears: u64,

    /// Entries currently stored
    pub entries: usize,
}

impl CacheStats {
    /// Total number of calculator invocations caused by active queries
    pub fn recomputations(&self) -> u64 {
        self.misses + self.recomputed_moved + self.recomputed_mutated
    }

    /// Share of active queries answered without the calculator, in percent
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.recomputations();
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, recomputed: {}, hit_rate: {:.2}%, entries: {}, swept: {} }}",
            self.hits,
            self.misses,
            self.recomputed_moved + self.recomputed_mutated,
            self.hit_rate(),
            self.entries,
            self.swept_entries
        )
    }
}
