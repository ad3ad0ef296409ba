//! Cache entries for node and edge geometry

use crate::cache::invalidation::InvalidationReason;
use crate::cache::snapshot::{NodeSnapshot, SnapshotPolicy};
use crate::element::{DiagramElement, NodeElement, Shared};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Cached bounds of one node plus the snapshot they were computed from
#[derive(Debug)]
pub struct NodeEntry<N, G> {
    /// Non-owning link back to the node, used by the sweep
    element: Weak<RefCell<N>>,

    /// Geometry handed out on hits
    geometry: Rc<G>,

    /// State of the node when `geometry` was computed
    pub(crate) snapshot: NodeSnapshot<N>,

    /// Entry metadata
    pub metadata: EntryMetadata,
}

impl<N: NodeElement, G> NodeEntry<N, G> {
    pub fn new(element: &Shared<N>, node: &N, geometry: G, policy: SnapshotPolicy) -> Self {
        Self {
            element: Rc::downgrade(element),
            geometry: Rc::new(geometry),
            snapshot: NodeSnapshot::capture(node, policy),
            metadata: EntryMetadata::default(),
        }
    }

    /// The stored geometry, same allocation on every call
    pub fn geometry(&self) -> Rc<G> {
        Rc::clone(&self.geometry)
    }

    /// Answer a query from this entry
    pub fn hit(&mut self) -> Rc<G> {
        self.metadata.hits += 1;
        self.geometry()
    }

    /// Swap in freshly computed geometry
    pub fn replace_geometry(&mut self, geometry: G) -> Rc<G> {
        self.geometry = Rc::new(geometry);
        self.metadata.version += 1;
        Rc::clone(&self.geometry)
    }

    /// Why the sweep may drop this entry, if it may: the node was dropped or
    /// no longer belongs to a diagram. A node that is mutably borrowed right
    /// now is left alone until the next sweep.
    pub fn reclaim_reason(&self) -> Option<InvalidationReason> {
        let element = match self.element.upgrade() {
            Some(element) => element,
            None => return Some(InvalidationReason::Dropped),
        };
        let attached = element
            .try_borrow()
            .map(|node| node.is_attached())
            .unwrap_or(true);
        if attached {
            None
        } else {
            Some(InvalidationReason::Detached)
        }
    }
}

/// One memoized edge quantity
#[derive(Debug)]
pub struct EdgeEntry<E, G> {
    /// Pins the edge allocation so its key stays unique while cached
    _element: Weak<RefCell<E>>,

    value: Rc<G>,
}

impl<E, G> EdgeEntry<E, G> {
    pub fn new(element: &Shared<E>, value: G) -> Self {
        Self {
            _element: Rc::downgrade(element),
            value: Rc::new(value),
        }
    }

    pub fn value(&self) -> Rc<G> {
        Rc::clone(&self.value)
    }
}

/// Bookkeeping attached to a node entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Incremented every time the geometry is recomputed
    pub version: u64,

    /// Number of queries answered from this entry
    pub hits: u64,
}

impl Default for EntryMetadata {
    fn default() -> Self {
        Self { version: 1, hits: 0 }
    }
}
