//! Why cached geometry gets thrown away
//!
//! Per-query invalidation (a node moved or was edited) only ever replaces one
//! entry and is counted in [`CacheStats`](crate::cache::CacheStats). Bulk
//! removals, meaning sweeps and clears, are also reported as
//! [`InvalidationEvent`]s so callers can log or inspect them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason a cached geometry stopped being served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    /// The node's position changed
    Moved,

    /// The node no longer equals its stored copy
    Mutated,

    /// Swept because the node left its diagram
    Detached,

    /// Swept because the node itself was dropped
    Dropped,

    /// Whole table cleared on deactivation
    Deactivated,

    /// Whole table cleared on request
    Cleared,
}

impl std::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidationReason::Moved => write!(f, "element moved"),
            InvalidationReason::Mutated => write!(f, "element mutated"),
            InvalidationReason::Detached => write!(f, "element detached from diagram"),
            InvalidationReason::Dropped => write!(f, "element dropped"),
            InvalidationReason::Deactivated => write!(f, "cache deactivated"),
            InvalidationReason::Cleared => write!(f, "cache cleared"),
        }
    }
}

/// Record of a bulk removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationEvent {
    /// Reason for invalidation
    pub reason: InvalidationReason,

    /// When the removal happened
    pub timestamp: DateTime<Utc>,

    /// Number of entries removed
    pub entries: usize,

    /// Additional context
    pub context: Option<String>,
}

impl InvalidationEvent {
    pub fn new(reason: InvalidationReason, entries: usize) -> Self {
        Self {
            reason,
            timestamp: Utc::now(),
            entries,
            context: None,
        }
    }

    /// Add context to the event
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
