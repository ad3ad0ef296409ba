//! Snapshots used to tell whether a node changed since it was measured

use crate::element::NodeElement;
use crate::geom::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the node cache records about a node when it stores its geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPolicy {
    /// Position only: cheap, but blind to anything that is not a move
    Position,

    /// Position plus a deep copy compared by value
    #[default]
    Structural,
}

impl fmt::Display for SnapshotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotPolicy::Position => write!(f, "position"),
            SnapshotPolicy::Structural => write!(f, "structural"),
        }
    }
}

impl FromStr for SnapshotPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "position" => Ok(SnapshotPolicy::Position),
            "structural" => Ok(SnapshotPolicy::Structural),
            other => Err(format!(
                "unknown snapshot policy '{}', expected 'position' or 'structural'",
                other
            )),
        }
    }
}

/// Outcome of comparing a live node to its snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Nothing the policy looks at has changed
    Fresh,

    /// The node moved by `(dx, dy)`
    Moved { dx: i32, dy: i32 },

    /// Same position, but the copy no longer compares equal
    Mutated,
}

/// State of a node at the time its geometry was computed
#[derive(Debug, Clone)]
pub struct NodeSnapshot<N> {
    position: Point,
    copy: Option<N>,
}

impl<N: NodeElement> NodeSnapshot<N> {
    pub fn capture(node: &N, policy: SnapshotPolicy) -> Self {
        let copy = match policy {
            SnapshotPolicy::Position => None,
            SnapshotPolicy::Structural => Some(node.clone()),
        };
        Self {
            position: node.position(),
            copy,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn policy(&self) -> SnapshotPolicy {
        if self.copy.is_some() {
            SnapshotPolicy::Structural
        } else {
            SnapshotPolicy::Position
        }
    }

    /// Position is checked first; the deep comparison only runs for a node
    /// that has not moved.
    pub fn compare(&self, node: &N) -> Freshness {
        let current = node.position();
        if current != self.position {
            let (dx, dy) = current.delta_from(self.position);
            return Freshness::Moved { dx, dy };
        }

        match &self.copy {
            Some(copy) if copy != node => Freshness::Mutated,
            _ => Freshness::Fresh,
        }
    }

    /// Shift the snapshot by a move the node made, without re-cloning it.
    ///
    /// If the node was also edited in the same interval, the translated copy
    /// still differs from it and the next comparison reports `Mutated`.
    pub fn follow_move(&mut self, dx: i32, dy: i32) {
        self.position = self.position.translated(dx, dy);
        if let Some(copy) = self.copy.as_mut() {
            copy.translate(dx, dy);
        }
    }

    /// Retake the snapshot from the live node, keeping the same policy
    pub fn refresh(&mut self, node: &N) {
        *self = Self::capture(node, self.policy());
    }
}
