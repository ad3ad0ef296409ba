//! # Diagram geometry cache
//!
//! Memoization of element geometry for diagram editors. A layout or render
//! engine asks for the bounds of nodes and the bounds and connection points of
//! edges over and over. These caches hand back the previous answer as long as
//! the element has not changed, and call the supplied calculator otherwise.
//!
//! ## Overview
//!
//! - Elements are shared with the cache as [`Shared`](element::Shared)
//!   handles (`Rc<RefCell<_>>`) and are keyed by identity, not value.
//! - Geometry comes from a calculator closure passed with every query. The
//!   cache never measures anything itself.
//! - Results are returned as `Rc`. A repeated query for an unchanged element
//!   returns the same allocation.
//! - Everything is single-threaded and synchronous.
//!
//! ## Node bounds
//!
//! ```rust
//! use diagram_geometry_cache::{shared, Diagram, DiagramType, Node, NodeGeometryCache, NodeKind, Rectangle};
//! use std::rc::Rc;
//!
//! let diagram = Diagram::new(DiagramType::Class);
//! let node = shared(Node::named(NodeKind::Class, "Order"));
//! node.borrow_mut().attach(&diagram);
//!
//! let mut cache = NodeGeometryCache::default();
//! let bounds = |n: &Node| Rectangle::new(n.position().x, n.position().y, 100, 60);
//!
//! let a = cache.get_bounds(&node, bounds);
//! node.borrow_mut().translate(15, 0);
//! let b = cache.get_bounds(&node, bounds);
//!
//! assert!(!Rc::ptr_eq(&a, &b));
//! assert_eq!(b.x, 15);
//! ```
//!
//! ## Edge geometry during a layout pass
//!
//! ```rust
//! use diagram_geometry_cache::{shared, DiagramGeometryCache, Edge, EdgeKind, Rectangle};
//! use std::rc::Rc;
//!
//! let mut caches: DiagramGeometryCache = DiagramGeometryCache::default();
//! let edge = shared(Edge::new(EdgeKind::Dependency));
//! let bounds = |_: &Edge| Rectangle::new(0, 0, 40, 2);
//!
//! let mut pass = caches.begin_layout_pass();
//! let first = pass.edge_bounds(&edge, bounds);
//! let second = pass.edge_bounds(&edge, bounds);
//! assert!(Rc::ptr_eq(&first, &second));
//! drop(pass);
//!
//! assert!(!caches.edges().is_active());
//! ```

pub mod cache;
pub mod element;
pub mod error;
pub mod geom;
pub mod model;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheState, CacheStats, DiagramCacheStats,
    DiagramGeometryCache, EdgeGeometryCache, InvalidationEvent, InvalidationReason, LayoutPass,
    NodeGeometryCache, SnapshotPolicy,
};
pub use element::{shared, DiagramElement, ElementKey, NodeElement, Shared};
pub use error::{GeometryCacheError, Result};
pub use geom::{Dimension, Line, Point, Rectangle};
pub use model::{Diagram, DiagramId, DiagramType, Edge, EdgeKind, ElementId, Node, NodeKind};
