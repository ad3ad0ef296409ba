//! Node bounds cache with per-query staleness detection

use crate::cache::{
    config::CacheConfig,
    entry::NodeEntry,
    invalidation::{InvalidationEvent, InvalidationReason},
    snapshot::Freshness,
    sweep::SweepSchedule,
    types::{CacheState, CacheStats},
};
use crate::element::{ElementKey, NodeElement, Shared};
use crate::error::Result;
use crate::geom::Rectangle;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use tracing::{debug, info, trace};

/// Memoizes node geometry and notices when a node has changed.
///
/// Every active query compares the node against the snapshot stored with its
/// geometry. A move is detected from the position alone; anything else is
/// detected by comparing against a stored deep copy (unless the cache is
/// configured for position-only snapshots). Unchanged nodes get back the very
/// same `Rc` as last time, so callers can use `Rc::ptr_eq` to skip
/// downstream work.
///
/// Nodes removed from their diagram are not reported to the cache. Instead,
/// every `sweep_interval` queries the cache drops the entries of nodes that
/// are no longer attached, or no longer exist.
pub struct NodeGeometryCache<N, G = Rectangle> {
    config: CacheConfig,
    state: CacheState,
    entries: HashMap<ElementKey, NodeEntry<N, G>>,
    schedule: SweepSchedule,
    stats: CacheStats,
}

impl<N: NodeElement, G> NodeGeometryCache<N, G> {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        debug!("Initializing node geometry cache with config: {:?}", config);

        Self {
            state: CacheState::from_flag(config.start_active),
            schedule: SweepSchedule::new(config.sweep_interval),
            entries: HashMap::new(),
            stats: CacheStats::default(),
            config,
        }
    }

    /// Create a cache after validating the configuration
    pub fn try_new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Bounds of `node`, computed by `calculate` unless a valid entry exists.
    ///
    /// # Panics
    ///
    /// Panics if `node` is mutably borrowed while the query runs.
    pub fn get_bounds<F>(&mut self, node: &Shared<N>, calculate: F) -> Rc<G>
    where
        F: FnOnce(&N) -> G,
    {
        match self.try_get_bounds(node, |n| Ok::<G, Infallible>(calculate(n))) {
            Ok(geometry) => geometry,
            Err(never) => match never {},
        }
    }

    /// Like [`get_bounds`](Self::get_bounds) with a fallible calculator.
    ///
    /// The calculator's error is returned as is and nothing is stored for
    /// that query. An existing entry keeps its old snapshot, so the next query
    /// tries again.
    pub fn try_get_bounds<F, E>(&mut self, node: &Shared<N>, calculate: F) -> std::result::Result<Rc<G>, E>
    where
        F: FnOnce(&N) -> std::result::Result<G, E>,
    {
        if !self.state.is_active() {
            if self.config.enable_metrics {
                self.stats.bypassed += 1;
            }
            let current = node.borrow();
            return calculate(&*current).map(Rc::new);
        }

        if self.schedule.tick() {
            self.sweep();
        }

        let key = ElementKey::of(node);
        let current = node.borrow();

        let Some(entry) = self.entries.get_mut(&key) else {
            let geometry = calculate(&*current)?;
            let entry = NodeEntry::new(node, &*current, geometry, self.config.snapshot_policy);
            let geometry = entry.geometry();
            self.entries.insert(key, entry);
            if self.config.enable_metrics {
                self.stats.misses += 1;
            }
            trace!("Node bounds cache miss");
            return Ok(geometry);
        };

        match entry.snapshot.compare(&*current) {
            Freshness::Fresh => {
                if self.config.enable_metrics {
                    self.stats.hits += 1;
                }
                trace!("Node bounds cache hit");
                Ok(entry.hit())
            }
            Freshness::Moved { dx, dy } => {
                let geometry = calculate(&*current)?;
                entry.snapshot.follow_move(dx, dy);
                if self.config.enable_metrics {
                    self.stats.recomputed_moved += 1;
                }
                debug!(dx, dy, "Recomputing node bounds: {}", InvalidationReason::Moved);
                Ok(entry.replace_geometry(geometry))
            }
            Freshness::Mutated => {
                let geometry = calculate(&*current)?;
                entry.snapshot.refresh(&*current);
                if self.config.enable_metrics {
                    self.stats.recomputed_mutated += 1;
                }
                debug!("Recomputing node bounds: {}", InvalidationReason::Mutated);
                Ok(entry.replace_geometry(geometry))
            }
        }
    }

    /// Drop entries of nodes that left their diagram or no longer exist.
    ///
    /// Runs automatically every `sweep_interval` active queries; calling it
    /// directly does not move the automatic schedule.
    pub fn sweep(&mut self) -> Vec<InvalidationEvent> {
        let mut detached = 0;
        let mut dropped = 0;

        self.entries.retain(|_, entry| match entry.reclaim_reason() {
            Some(InvalidationReason::Dropped) => {
                dropped += 1;
                false
            }
            Some(_) => {
                detached += 1;
                false
            }
            None => true,
        });

        if self.config.enable_metrics {
            self.stats.sweeps += 1;
            self.stats.swept_entries += (detached + dropped) as u64;
        }

        let mut events = Vec::new();
        for (reason, count) in [
            (InvalidationReason::Detached, detached),
            (InvalidationReason::Dropped, dropped),
        ] {
            if count > 0 {
                events.push(
                    InvalidationEvent::new(reason, count)
                        .with_context(format!("Swept {} node entries", count)),
                );
            }
        }

        debug!(
            detached,
            dropped,
            remaining = self.entries.len(),
            "Swept node geometry cache"
        );
        events
    }

    /// Start memoizing
    pub fn activate(&mut self) {
        if !self.state.is_active() {
            info!("Activating node geometry cache");
        }
        self.state = CacheState::Active;
    }

    /// Stop memoizing and forget every entry
    pub fn deactivate(&mut self) -> InvalidationEvent {
        self.state = CacheState::Inactive;
        self.remove_all(InvalidationReason::Deactivated)
    }

    /// Forget every entry but keep the current state
    pub fn clear(&mut self) -> InvalidationEvent {
        self.remove_all(InvalidationReason::Cleared)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Whether an entry is stored for `node`, fresh or not
    pub fn contains(&self, node: &Shared<N>) -> bool {
        self.entries.contains_key(&ElementKey::of(node))
    }

    /// Number of recomputations of the entry for `node`, if there is one
    pub fn entry_version(&self, node: &Shared<N>) -> Option<u64> {
        self.entries
            .get(&ElementKey::of(node))
            .map(|entry| entry.metadata.version)
    }

    /// Active queries left before the next automatic sweep
    pub fn calls_until_sweep(&self) -> usize {
        self.schedule.calls_until_sweep()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    fn remove_all(&mut self, reason: InvalidationReason) -> InvalidationEvent {
        let count = self.entries.len();
        self.entries.clear();
        self.schedule.reset();
        if self.config.enable_metrics {
            self.stats.clears += 1;
        }

        info!(entries = count, "Node geometry cache: {}", reason);
        InvalidationEvent::new(reason, count)
    }
}

impl<N: NodeElement, G> Default for NodeGeometryCache<N, G> {
    fn default() -> Self {
        Self::new(CacheConfig::node_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::snapshot::SnapshotPolicy;
    use crate::element::shared;
    use crate::geom::Point;
    use crate::model::{Diagram, DiagramType, Node, NodeKind};
    use std::cell::Cell;

    fn bounds_at_position(node: &Node) -> Rectangle {
        let position = node.position();
        Rectangle::new(position.x, position.y, 10, 10)
    }

    #[test]
    fn test_returns_calculated_bounds() {
        let mut cache = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));

        let bounds = cache.get_bounds(&node, bounds_at_position);
        assert_eq!(*bounds, Rectangle::new(0, 0, 10, 10));
    }

    #[test]
    fn test_returns_calculated_bounds_after_translation() {
        let mut cache = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));
        node.borrow_mut().translate(20, 20);

        let bounds = cache.get_bounds(&node, bounds_at_position);
        assert_eq!(*bounds, Rectangle::new(20, 20, 10, 10));
    }

    #[test]
    fn test_hit_returns_same_allocation() {
        let mut cache = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));
        let calls = Cell::new(0);
        let counting = |n: &Node| {
            calls.set(calls.get() + 1);
            bounds_at_position(n)
        };

        let first = cache.get_bounds(&node, counting);
        let second = cache.get_bounds(&node, counting);

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_move_recomputes_and_follows_snapshot() {
        let mut cache = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));

        let before = cache.get_bounds(&node, bounds_at_position);
        node.borrow_mut().translate(5, 5);
        let moved = cache.get_bounds(&node, bounds_at_position);
        let again = cache.get_bounds(&node, bounds_at_position);

        assert!(!Rc::ptr_eq(&before, &moved));
        assert_eq!(*moved, Rectangle::new(5, 5, 10, 10));
        assert!(Rc::ptr_eq(&moved, &again));
        assert_eq!(cache.stats().recomputed_moved, 1);
        assert_eq!(cache.entry_version(&node), Some(2));
    }

    #[test]
    fn test_move_across_the_coordinate_range() {
        let mut cache = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));
        node.borrow_mut().move_to(Point::new(-2_000_000_000, 0));
        let before = cache.get_bounds(&node, bounds_at_position);

        node.borrow_mut().move_to(Point::new(2_000_000_000, 0));
        let after = cache.get_bounds(&node, bounds_at_position);
        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(after.x, 2_000_000_000);

        let again = cache.get_bounds(&node, bounds_at_position);
        assert!(Rc::ptr_eq(&after, &again));
        assert_eq!(cache.entry_version(&node), Some(2));
    }

    #[test]
    fn test_rename_recomputes() {
        let mut cache = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));
        node.borrow_mut().translate(20, 20);

        let before = cache.get_bounds(&node, bounds_at_position);
        node.borrow_mut().set_name("TrialName");
        let after = cache.get_bounds(&node, bounds_at_position);

        assert_eq!(*before, Rectangle::new(20, 20, 10, 10));
        assert_eq!(*after, Rectangle::new(20, 20, 10, 10));
        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(cache.stats().recomputed_mutated, 1);
    }

    #[test]
    fn test_move_and_rename_in_one_step() {
        let mut cache = NodeGeometryCache::default();
        let node = shared(Node::named(NodeKind::Class, "A"));
        cache.get_bounds(&node, bounds_at_position);

        {
            let mut n = node.borrow_mut();
            n.translate(1, 2);
            n.set_name("B");
        }
        let moved = cache.get_bounds(&node, bounds_at_position);
        let refreshed = cache.get_bounds(&node, bounds_at_position);
        let settled = cache.get_bounds(&node, bounds_at_position);

        assert!(!Rc::ptr_eq(&moved, &refreshed));
        assert!(Rc::ptr_eq(&refreshed, &settled));
        assert_eq!(*settled, Rectangle::new(1, 2, 10, 10));
    }

    #[test]
    fn test_position_policy_misses_rename() {
        let config = CacheConfig::builder()
            .snapshot_policy(SnapshotPolicy::Position)
            .build();
        let mut cache = NodeGeometryCache::new(config);
        let node = shared(Node::new(NodeKind::Class));

        let before = cache.get_bounds(&node, bounds_at_position);
        node.borrow_mut().set_name("Renamed");
        let after = cache.get_bounds(&node, bounds_at_position);

        assert!(Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_inactive_cache_never_stores() {
        let config = CacheConfig::builder().start_active(false).build();
        let mut cache = NodeGeometryCache::new(config);
        let node = shared(Node::new(NodeKind::Class));

        let first = cache.get_bounds(&node, bounds_at_position);
        let second = cache.get_bounds(&node, bounds_at_position);

        assert_eq!(first, second);
        assert!(!Rc::ptr_eq(&first, &second));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().bypassed, 2);
    }

    #[test]
    fn test_calculator_error_propagates_and_nothing_is_stored() {
        let mut cache: NodeGeometryCache<Node> = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));

        let result = cache.try_get_bounds(&node, |_| Err::<Rectangle, _>("font missing"));
        assert_eq!(result.unwrap_err(), "font missing");
        assert!(!cache.contains(&node));

        let bounds = cache
            .try_get_bounds(&node, |n| Ok::<_, &str>(bounds_at_position(n)))
            .unwrap();
        assert_eq!(*bounds, Rectangle::new(0, 0, 10, 10));
    }

    #[test]
    fn test_failed_recompute_keeps_entry_stale() {
        let mut cache: NodeGeometryCache<Node> = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));
        let before = cache.get_bounds(&node, bounds_at_position);

        node.borrow_mut().translate(3, 3);
        let failed = cache.try_get_bounds(&node, |_| Err::<Rectangle, _>(()));
        assert!(failed.is_err());

        let after = cache.get_bounds(&node, bounds_at_position);
        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(*after, Rectangle::new(3, 3, 10, 10));
    }

    #[test]
    fn test_manual_sweep_reports_detached_and_dropped() {
        let diagram = Diagram::new(DiagramType::Class);
        let mut cache = NodeGeometryCache::default();
        let attached = shared(Node::new(NodeKind::Class));
        attached.borrow_mut().attach(&diagram);
        let loose = shared(Node::new(NodeKind::Note));
        let doomed = shared(Node::new(NodeKind::Package));

        cache.get_bounds(&attached, bounds_at_position);
        cache.get_bounds(&loose, bounds_at_position);
        cache.get_bounds(&doomed, bounds_at_position);
        drop(doomed);

        let events = cache.sweep();
        assert_eq!(events.len(), 2);
        assert!(events
            .iter()
            .any(|e| e.reason == InvalidationReason::Detached && e.entries == 1));
        assert!(events
            .iter()
            .any(|e| e.reason == InvalidationReason::Dropped && e.entries == 1));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&attached));
        assert_eq!(cache.stats().swept_entries, 2);
    }

    #[test]
    fn test_deactivate_clears_and_reactivate_recomputes() {
        let mut cache = NodeGeometryCache::default();
        let node = shared(Node::new(NodeKind::Class));
        let before = cache.get_bounds(&node, bounds_at_position);

        let event = cache.deactivate();
        assert_eq!(event.reason, InvalidationReason::Deactivated);
        assert_eq!(event.entries, 1);
        assert!(cache.is_empty());

        cache.activate();
        let after = cache.get_bounds(&node, bounds_at_position);
        assert!(!Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_try_new_rejects_zero_interval() {
        let config = CacheConfig::builder().sweep_interval(0).build();
        assert!(NodeGeometryCache::<Node>::try_new(config).is_err());
    }
}
