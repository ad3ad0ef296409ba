//! # Geometry caching layer
//!
//! Layout and rendering ask for the same element geometry many times per
//! frame, and computing it (text metrics, label wrapping) is not cheap. This
//! module remembers the answers without ever being told that an element
//! changed. Staleness is detected when the next query comes in.
//!
//! ## Caches
//!
//! - [`NodeGeometryCache`]: node bounds. Each entry stores a snapshot of the
//!   node (its position and, by default, a deep copy). A moved or edited node
//!   is recomputed. Entries of nodes that left their diagram are swept every
//!   `sweep_interval` queries.
//! - [`EdgeGeometryCache`]: edge bounds and connection points. There is no
//!   change detection: while active, the first answer for an edge is kept
//!   until the cache is deactivated.
//! - [`DiagramGeometryCache`]: both of the above, plus a [`LayoutPass`] guard
//!   that keeps the edge cache active for one layout pass.
//!
//! ## Example
//!
//! ```rust
//! use diagram_geometry_cache::cache::{CacheConfig, NodeGeometryCache};
//! use diagram_geometry_cache::element::shared;
//! use diagram_geometry_cache::geom::Rectangle;
//! use diagram_geometry_cache::model::{Node, NodeKind};
//! use std::rc::Rc;
//!
//! let mut cache = NodeGeometryCache::new(CacheConfig::default());
//! let node = shared(Node::named(NodeKind::Class, "Shape"));
//! let measure = |n: &Node| {
//!     let p = n.position();
//!     Rectangle::new(p.x, p.y, 8 * n.name().len() as i32, 30)
//! };
//!
//! let first = cache.get_bounds(&node, measure);
//! let second = cache.get_bounds(&node, measure);
//! assert!(Rc::ptr_eq(&first, &second));
//!
//! node.borrow_mut().set_name("Polygon");
//! let renamed = cache.get_bounds(&node, measure);
//! assert_eq!(renamed.width, 56);
//! ```

pub mod config;
pub mod edge;
pub mod entry;
pub mod integration;
pub mod invalidation;
pub mod node;
pub mod snapshot;
pub mod sweep;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_SWEEP_INTERVAL};
pub use edge::EdgeGeometryCache;
pub use entry::{EdgeEntry, EntryMetadata, NodeEntry};
pub use integration::{DiagramCacheStats, DiagramGeometryCache, LayoutPass};
pub use invalidation::{InvalidationEvent, InvalidationReason};
pub use node::NodeGeometryCache;
pub use snapshot::{Freshness, NodeSnapshot, SnapshotPolicy};
pub use sweep::SweepSchedule;
pub use types::{CacheState, CacheStats};
