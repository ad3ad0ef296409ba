//! Minimal diagram model
//!
//! Just enough of a UML-style model to drive the caches: nodes and edges with
//! a position or endpoints, a label, and an optional diagram they belong to.

use crate::element::{DiagramElement, NodeElement};
use crate::geom::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagramId(Uuid);

/// Identifier of a node or edge, stable for the element's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    fn generate() -> Self {
        ElementId(Uuid::new_v4())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    Class,
    Sequence,
    State,
    Object,
    UseCase,
}

/// A diagram that nodes and edges can be attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    id: DiagramId,
    diagram_type: DiagramType,
}

impl Diagram {
    pub fn new(diagram_type: DiagramType) -> Self {
        Self {
            id: DiagramId(Uuid::new_v4()),
            diagram_type,
        }
    }

    pub fn id(&self) -> DiagramId {
        self.id
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Interface,
    Package,
    Note,
    Actor,
    State,
    Object,
}

/// A diagram node.
///
/// Equality is structural: kind, name and position. Identity and diagram
/// membership are ignored, so a clone taken before detaching still compares
/// equal afterwards.
#[derive(Debug, Clone)]
pub struct Node {
    id: ElementId,
    kind: NodeKind,
    name: String,
    position: Point,
    diagram: Option<DiagramId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: ElementId::generate(),
            kind,
            name: String::new(),
            position: Point::ORIGIN,
            diagram: None,
        }
    }

    pub fn named(kind: NodeKind, name: impl Into<String>) -> Self {
        let mut node = Self::new(kind);
        node.name = name.into();
        node
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.position = self.position.translated(dx, dy);
    }

    pub fn diagram(&self) -> Option<DiagramId> {
        self.diagram
    }

    pub fn attach(&mut self, diagram: &Diagram) {
        self.diagram = Some(diagram.id());
    }

    pub fn detach(&mut self) {
        self.diagram = None;
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.name == other.name && self.position == other.position
    }
}

impl Eq for Node {}

impl DiagramElement for Node {
    fn is_attached(&self) -> bool {
        self.diagram.is_some()
    }
}

impl NodeElement for Node {
    fn position(&self) -> Point {
        self.position
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        Node::translate(self, dx, dy);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Note,
    Dependency,
    Generalization,
    Aggregation,
    StateTransition,
    Call,
}

/// A diagram edge between two nodes
#[derive(Debug, Clone)]
pub struct Edge {
    id: ElementId,
    kind: EdgeKind,
    start: Option<ElementId>,
    end: Option<ElementId>,
    label: String,
    diagram: Option<DiagramId>,
}

impl Edge {
    pub fn new(kind: EdgeKind) -> Self {
        Self {
            id: ElementId::generate(),
            kind,
            start: None,
            end: None,
            label: String::new(),
            diagram: None,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn connect(&mut self, start: &Node, end: &Node) {
        self.start = Some(start.id());
        self.end = Some(end.id());
    }

    pub fn start(&self) -> Option<ElementId> {
        self.start
    }

    pub fn end(&self) -> Option<ElementId> {
        self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn attach(&mut self, diagram: &Diagram) {
        self.diagram = Some(diagram.id());
    }

    pub fn detach(&mut self) {
        self.diagram = None;
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.start == other.start
            && self.end == other.end
            && self.label == other.label
    }
}

impl Eq for Edge {}

impl DiagramElement for Edge {
    fn is_attached(&self) -> bool {
        self.diagram.is_some()
    }
}
