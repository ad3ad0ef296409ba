//! Call counting for the periodic sweep of detached nodes

/// Decides on which query the node cache runs its sweep.
///
/// The sweep runs at the start of the query that follows `interval` counted
/// queries, after which counting starts over. With an interval of 1000 the
/// first sweep therefore happens on query 1001, the next on query 2001.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSchedule {
    interval: usize,
    calls_since_sweep: usize,
}

impl SweepSchedule {
    pub fn new(interval: usize) -> Self {
        Self {
            interval,
            calls_since_sweep: 0,
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Count one query. Returns `true` when a sweep is due before answering it.
    pub fn tick(&mut self) -> bool {
        let due = self.calls_since_sweep >= self.interval;
        if due {
            self.calls_since_sweep = 0;
        }
        self.calls_since_sweep += 1;
        due
    }

    /// Queries that can still be answered before the next sweep
    pub fn calls_until_sweep(&self) -> usize {
        self.interval.saturating_sub(self.calls_since_sweep)
    }

    pub fn reset(&mut self) {
        self.calls_since_sweep = 0;
    }
}
