//! Edge geometry cache, valid for the duration of one layout pass

use crate::cache::{
    config::CacheConfig,
    entry::EdgeEntry,
    invalidation::{InvalidationEvent, InvalidationReason},
    types::{CacheState, CacheStats},
};
use crate::element::{ElementKey, Shared};
use crate::geom::{Line, Rectangle};
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use tracing::{info, trace};

/// Memoizes edge bounds and connection points without any change detection.
///
/// Once active, the first answer computed for an edge is returned for every
/// later query about that edge, whatever happens to the edge in between.
/// Everything is forgotten on [`deactivate`](Self::deactivate). Bounds and
/// connection points are stored separately, so one can be cached without the
/// other.
pub struct EdgeGeometryCache<E, B = Rectangle, C = Line> {
    config: CacheConfig,
    state: CacheState,
    bounds: HashMap<ElementKey, EdgeEntry<E, B>>,
    connection_points: HashMap<ElementKey, EdgeEntry<E, C>>,
    stats: CacheStats,
}

impl<E, B, C> EdgeGeometryCache<E, B, C> {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        Self {
            state: CacheState::from_flag(config.start_active),
            bounds: HashMap::new(),
            connection_points: HashMap::new(),
            stats: CacheStats::default(),
            config,
        }
    }

    /// Bounds of `edge`.
    ///
    /// # Panics
    ///
    /// Panics if `edge` is mutably borrowed while the query runs.
    pub fn get_bounds<F>(&mut self, edge: &Shared<E>, calculate: F) -> Rc<B>
    where
        F: FnOnce(&E) -> B,
    {
        match self.try_get_bounds(edge, |e| Ok::<B, Infallible>(calculate(e))) {
            Ok(bounds) => bounds,
            Err(never) => match never {},
        }
    }

    /// Bounds of `edge` from a fallible calculator; its error is returned as is
    pub fn try_get_bounds<F, Err>(&mut self, edge: &Shared<E>, calculate: F) -> Result<Rc<B>, Err>
    where
        F: FnOnce(&E) -> Result<B, Err>,
    {
        let metrics = self.config.enable_metrics.then_some(&mut self.stats);
        memoize(self.state, &mut self.bounds, metrics, edge, calculate)
    }

    /// Connection points of `edge`.
    ///
    /// # Panics
    ///
    /// Panics if `edge` is mutably borrowed while the query runs.
    pub fn get_connection_points<F>(&mut self, edge: &Shared<E>, calculate: F) -> Rc<C>
    where
        F: FnOnce(&E) -> C,
    {
        match self.try_get_connection_points(edge, |e| Ok::<C, Infallible>(calculate(e))) {
            Ok(points) => points,
            Err(never) => match never {},
        }
    }

    /// Connection points of `edge` from a fallible calculator
    pub fn try_get_connection_points<F, Err>(
        &mut self,
        edge: &Shared<E>,
        calculate: F,
    ) -> Result<Rc<C>, Err>
    where
        F: FnOnce(&E) -> Result<C, Err>,
    {
        let metrics = self.config.enable_metrics.then_some(&mut self.stats);
        memoize(self.state, &mut self.connection_points, metrics, edge, calculate)
    }

    /// Start memoizing
    pub fn activate(&mut self) {
        if !self.state.is_active() {
            info!("Activating edge geometry cache");
        }
        self.state = CacheState::Active;
    }

    /// Stop memoizing and forget all bounds and connection points
    pub fn deactivate(&mut self) -> InvalidationEvent {
        let count = self.bounds.len() + self.connection_points.len();
        self.state = CacheState::Inactive;
        self.bounds.clear();
        self.connection_points.clear();
        if self.config.enable_metrics {
            self.stats.clears += 1;
        }

        info!(entries = count, "Edge geometry cache: {}", InvalidationReason::Deactivated);
        InvalidationEvent::new(InvalidationReason::Deactivated, count)
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

    /// Number of edges with cached bounds
    pub fn bounds_len(&self) -> usize {
        self.bounds.len()
    }

    /// Number of edges with cached connection points
    pub fn connection_points_len(&self) -> usize {
        self.connection_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty() && self.connection_points.is_empty()
    }

    /// Get cache statistics; `entries` counts both tables
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.bounds.len() + self.connection_points.len(),
            ..self.stats.clone()
        }
    }
}

impl<E, B, C> Default for EdgeGeometryCache<E, B, C> {
    fn default() -> Self {
        Self::new(CacheConfig::layout_pass())
    }
}

fn memoize<E, G, F, Err>(
    state: CacheState,
    table: &mut HashMap<ElementKey, EdgeEntry<E, G>>,
    stats: Option<&mut CacheStats>,
    edge: &Shared<E>,
    calculate: F,
) -> Result<Rc<G>, Err>
where
    F: FnOnce(&E) -> Result<G, Err>,
{
    if !state.is_active() {
        if let Some(stats) = stats {
            stats.bypassed += 1;
        }
        return calculate(&*edge.borrow()).map(Rc::new);
    }

    let key = ElementKey::of(edge);
    if let Some(entry) = table.get(&key) {
        if let Some(stats) = stats {
            stats.hits += 1;
        }
        trace!("Edge geometry cache hit");
        return Ok(entry.value());
    }

    let value = calculate(&*edge.borrow())?;
    let entry = EdgeEntry::new(edge, value);
    let value = entry.value();
    table.insert(key, entry);
    if let Some(stats) = stats {
        stats.misses += 1;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::shared;
    use crate::geom::Point;
    use crate::model::{Edge, EdgeKind};
    use std::cell::Cell;

    fn zero_bounds(_: &Edge) -> Rectangle {
        Rectangle::new(0, 0, 0, 0)
    }

    fn diagonal(_: &Edge) -> Line {
        Line::new(Point::new(0, 0), Point::new(100, 100))
    }

    fn active_cache() -> EdgeGeometryCache<Edge> {
        let mut cache = EdgeGeometryCache::default();
        cache.activate();
        cache
    }

    #[test]
    fn test_starts_inactive() {
        let cache: EdgeGeometryCache<Edge> = EdgeGeometryCache::default();
        assert!(!cache.is_active());
    }

    #[test]
    fn test_inactive_returns_fresh_values() {
        let mut cache: EdgeGeometryCache<Edge> = EdgeGeometryCache::default();
        let edge = shared(Edge::new(EdgeKind::Note));

        let a = cache.get_bounds(&edge, zero_bounds);
        let b = cache.get_bounds(&edge, zero_bounds);
        assert_eq!(a, b);
        assert!(!Rc::ptr_eq(&a, &b));

        let p = cache.get_connection_points(&edge, diagonal);
        let q = cache.get_connection_points(&edge, diagonal);
        assert!(!Rc::ptr_eq(&p, &q));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_active_memoizes_per_edge() {
        let mut cache = active_cache();
        let first = shared(Edge::new(EdgeKind::Note));
        let second = shared(Edge::new(EdgeKind::Note));

        let a = cache.get_bounds(&first, zero_bounds);
        let b = cache.get_bounds(&second, zero_bounds);
        let a_again = cache.get_bounds(&first, zero_bounds);

        assert!(!Rc::ptr_eq(&a, &b));
        assert!(Rc::ptr_eq(&a, &a_again));
        assert_eq!(cache.bounds_len(), 2);
    }

    #[test]
    fn test_quantities_are_independent() {
        let mut cache = active_cache();
        let edge = shared(Edge::new(EdgeKind::Dependency));

        cache.get_connection_points(&edge, diagonal);
        assert_eq!(cache.connection_points_len(), 1);
        assert_eq!(cache.bounds_len(), 0);

        let calls = Cell::new(0);
        let bounds = cache.get_bounds(&edge, |_| {
            calls.set(calls.get() + 1);
            Rectangle::new(1, 1, 1, 1)
        });
        assert_eq!(*bounds, Rectangle::new(1, 1, 1, 1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_mutation_is_ignored_while_active() {
        let mut cache = active_cache();
        let edge = shared(Edge::new(EdgeKind::StateTransition));

        let before = cache.get_bounds(&edge, |e| {
            Rectangle::new(0, 0, e.label().len() as i32, 10)
        });
        edge.borrow_mut().set_label("on click");
        let after = cache.get_bounds(&edge, |e| {
            Rectangle::new(0, 0, e.label().len() as i32, 10)
        });

        assert!(Rc::ptr_eq(&before, &after));
        assert_eq!(after.width, 0);
    }

    #[test]
    fn test_deactivate_clears_both_tables() {
        let mut cache = active_cache();
        let edge = shared(Edge::new(EdgeKind::Call));
        let bounds = cache.get_bounds(&edge, zero_bounds);
        let points = cache.get_connection_points(&edge, diagonal);

        let event = cache.deactivate();
        assert_eq!(event.entries, 2);
        assert!(cache.is_empty());

        cache.activate();
        assert!(!Rc::ptr_eq(&bounds, &cache.get_bounds(&edge, zero_bounds)));
        assert!(!Rc::ptr_eq(
            &points,
            &cache.get_connection_points(&edge, diagonal)
        ));
    }

    #[test]
    fn test_calculator_error_is_not_cached() {
        let mut cache = active_cache();
        let edge = shared(Edge::new(EdgeKind::Note));

        let failed = cache.try_get_connection_points(&edge, |_| Err::<Line, _>("no endpoints"));
        assert_eq!(failed.unwrap_err(), "no endpoints");
        assert_eq!(cache.connection_points_len(), 0);
    }

    #[test]
    fn test_stats() {
        let mut cache = active_cache();
        let edge = shared(Edge::new(EdgeKind::Note));
        cache.get_bounds(&edge, zero_bounds);
        cache.get_bounds(&edge, zero_bounds);
        cache.get_connection_points(&edge, diagonal);

        let stats = cache.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 2);
    }
}
