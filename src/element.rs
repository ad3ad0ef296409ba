//! What the cache needs from diagram elements
//!
//! Elements are owned by the diagram model and shared with the cache as
//! [`Shared`] handles. The cache keys its tables by the allocation behind the
//! handle, so two elements with identical contents are still two keys.

use crate::geom::Point;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared, mutable handle to a model element
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap an element into a [`Shared`] handle
pub fn shared<T>(element: T) -> Shared<T> {
    Rc::new(RefCell::new(element))
}

/// Any element that can sit in a diagram
pub trait DiagramElement {
    /// Whether the element currently belongs to a diagram.
    ///
    /// Consulted only by the node cache sweep.
    fn is_attached(&self) -> bool;
}

/// A node whose bounds can be cached
///
/// `Clone` must produce an independent deep copy and `PartialEq` must compare
/// every attribute the geometry depends on. Neither may look at the element's
/// identity or at its diagram association.
pub trait NodeElement: DiagramElement + Clone + PartialEq {
    /// Current top-left position
    fn position(&self) -> Point;

    /// Move the element by `(dx, dy)`
    fn translate(&mut self, dx: i32, dy: i32);
}

/// Identity of a shared element.
///
/// Derived from the address of the `Rc` allocation. Caches hold a `Weak` next
/// to every key they store, which keeps the allocation (not the element)
/// alive, so a key cannot be reused by a different element while its entry
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementKey(usize);

impl ElementKey {
    pub fn of<T>(element: &Rc<T>) -> Self {
        ElementKey(Rc::as_ptr(element) as *const () as usize)
    }
}
