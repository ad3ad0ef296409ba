//! One node cache and one edge cache for a diagram view
//!
//! A diagram view keeps its node cache on permanently and turns the edge cache
//! on only while it lays out the whole diagram. [`DiagramGeometryCache`] owns
//! both, and [`LayoutPass`] scopes the edge cache's active period to a guard.

use crate::cache::{
    config::CacheConfig, edge::EdgeGeometryCache, node::NodeGeometryCache, types::CacheStats,
};
use crate::element::{NodeElement, Shared};
use crate::error::Result;
use crate::geom::{Line, Rectangle};
use crate::model::{Edge, Node};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use tracing::debug;

/// Node and edge geometry caches for one diagram view
pub struct DiagramGeometryCache<N = Node, E = Edge> {
    nodes: NodeGeometryCache<N, Rectangle>,
    edges: EdgeGeometryCache<E, Rectangle, Line>,
}

impl<N: NodeElement, E> DiagramGeometryCache<N, E> {
    /// Build both caches; the edge cache starts inactive whatever
    /// `node_config.start_active` says.
    pub fn new(node_config: CacheConfig) -> Self {
        let edge_config = CacheConfig {
            start_active: false,
            ..node_config.clone()
        };
        Self {
            nodes: NodeGeometryCache::new(node_config),
            edges: EdgeGeometryCache::new(edge_config),
        }
    }

    /// Caches configured from `GEOMETRY_CACHE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(CacheConfig::from_env()?))
    }

    pub fn node_bounds<F>(&mut self, node: &Shared<N>, calculate: F) -> Rc<Rectangle>
    where
        F: FnOnce(&N) -> Rectangle,
    {
        self.nodes.get_bounds(node, calculate)
    }

    pub fn edge_bounds<F>(&mut self, edge: &Shared<E>, calculate: F) -> Rc<Rectangle>
    where
        F: FnOnce(&E) -> Rectangle,
    {
        self.edges.get_bounds(edge, calculate)
    }

    pub fn edge_connection_points<F>(&mut self, edge: &Shared<E>, calculate: F) -> Rc<Line>
    where
        F: FnOnce(&E) -> Line,
    {
        self.edges.get_connection_points(edge, calculate)
    }

    /// Activate the edge cache until the returned guard is dropped.
    ///
    /// If the edge cache was already active it stays active afterwards, so
    /// passes can nest.
    pub fn begin_layout_pass(&mut self) -> LayoutPass<'_, N, E> {
        let edges_were_active = self.edges.is_active();
        self.edges.activate();
        debug!(nested = edges_were_active, "Layout pass started");
        LayoutPass {
            cache: self,
            edges_were_active,
        }
    }

    pub fn nodes(&self) -> &NodeGeometryCache<N, Rectangle> {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeGeometryCache<N, Rectangle> {
        &mut self.nodes
    }

    pub fn edges(&self) -> &EdgeGeometryCache<E, Rectangle, Line> {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut EdgeGeometryCache<E, Rectangle, Line> {
        &mut self.edges
    }

    /// Statistics of both caches
    pub fn stats(&self) -> DiagramCacheStats {
        DiagramCacheStats {
            nodes: self.nodes.stats(),
            edges: self.edges.stats(),
        }
    }
}

impl<N: NodeElement, E> Default for DiagramGeometryCache<N, E> {
    fn default() -> Self {
        Self::new(CacheConfig::node_default())
    }
}

/// Statistics of a [`DiagramGeometryCache`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramCacheStats {
    pub nodes: CacheStats,
    pub edges: CacheStats,
}

/// Guard for one full-diagram layout pass.
///
/// Gives access to the caches through `Deref`; dropping it deactivates the
/// edge cache unless it was already active when the pass began.
pub struct LayoutPass<'a, N: NodeElement, E> {
    cache: &'a mut DiagramGeometryCache<N, E>,
    edges_were_active: bool,
}

impl<N: NodeElement, E> Deref for LayoutPass<'_, N, E> {
    type Target = DiagramGeometryCache<N, E>;

    fn deref(&self) -> &Self::Target {
        self.cache
    }
}

impl<N: NodeElement, E> DerefMut for LayoutPass<'_, N, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cache
    }
}

impl<N: NodeElement, E> Drop for LayoutPass<'_, N, E> {
    fn drop(&mut self) {
        if !self.edges_were_active {
            self.cache.edges.deactivate();
        }
        debug!("Layout pass finished");
    }
}
