//! Graphol diagram items.
//!
//! Nodes and edges are plain data addressed by interned ids. Relationships
//! between items (which edges a node knows about, where each edge anchors on
//! a node, the ordered inputs of role chains and property assertions) are
//! stored as id-keyed collections on the items themselves, never as live
//! references, so a detached item can sit in the diagram arena untouched
//! until a command brings it back.

use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Ordered list of edge ids (node registrations, input orders).
pub type EdgeList = SmallVec<[EdgeId; 4]>;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round both coordinates to the closest multiple of `grid`.
    pub fn snapped(self, grid: f64) -> Self {
        if grid <= 0.0 {
            return self;
        }
        Self {
            x: (self.x / grid).round() * grid,
            y: (self.y / grid).round() * grid,
        }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Node bounding size; the node's position is the centre of this box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA brush color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let channel = |i: usize| -> Option<f32> {
            let v = hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?;
            Some(v as f32 / 255.0)
        };
        match bytes.len() {
            6 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, 1.0)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let to_u8 = |v: f32| (v * 255.0).round() as u8;
        let (r, g, b, a) = (to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a));
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// Fill used by every white-ish Graphol shape.
pub const DEFAULT_BRUSH: Color = Color::rgba(252.0 / 255.0, 252.0 / 255.0, 252.0 / 255.0, 1.0);
/// Fill used by the solid black constructors.
pub const SOLID_BRUSH: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

// ─── Identities ──────────────────────────────────────────────────────────

/// The kind of expression a node denotes, derived from its type and, for
/// constructors, from its neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    Neutral,
    Concept,
    Role,
    Attribute,
    ValueDomain,
    Individual,
    Value,
    RoleInstance,
    AttributeInstance,
    Facet,
    Unknown,
}

// ─── Node kinds ──────────────────────────────────────────────────────────

/// Closed set of Graphol node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // Predicates
    Concept,
    Role,
    Attribute,
    ValueDomain,
    Individual,
    Literal,
    Facet,
    // Constructors
    DomainRestriction,
    RangeRestriction,
    Union,
    Intersection,
    Complement,
    Enumeration,
    DisjointUnion,
    RoleChain,
    RoleInverse,
    DatatypeRestriction,
    PropertyAssertion,
    HasKey,
}

impl NodeKind {
    /// Short readable name, e.g. `role chain`.
    pub fn short_name(self) -> &'static str {
        match self {
            NodeKind::Concept => "concept",
            NodeKind::Role => "role",
            NodeKind::Attribute => "attribute",
            NodeKind::ValueDomain => "value domain",
            NodeKind::Individual => "individual",
            NodeKind::Literal => "literal",
            NodeKind::Facet => "facet",
            NodeKind::DomainRestriction => "domain restriction",
            NodeKind::RangeRestriction => "range restriction",
            NodeKind::Union => "union",
            NodeKind::Intersection => "intersection",
            NodeKind::Complement => "complement",
            NodeKind::Enumeration => "enumeration",
            NodeKind::DisjointUnion => "disjoint union",
            NodeKind::RoleChain => "role chain",
            NodeKind::RoleInverse => "role inverse",
            NodeKind::DatatypeRestriction => "datatype restriction",
            NodeKind::PropertyAssertion => "property assertion",
            NodeKind::HasKey => "has key",
        }
    }

    /// Nodes whose incoming input edges are semantically ordered.
    pub fn has_ordered_inputs(self) -> bool {
        matches!(self, NodeKind::RoleChain | NodeKind::PropertyAssertion)
    }

    /// Nodes tracked by the predicate index.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            NodeKind::Concept
                | NodeKind::Role
                | NodeKind::Attribute
                | NodeKind::ValueDomain
                | NodeKind::Individual
        )
    }

    /// Constructors whose identity is computed from their neighbourhood.
    pub fn is_weak(self) -> bool {
        matches!(
            self,
            NodeKind::Union
                | NodeKind::Intersection
                | NodeKind::Complement
                | NodeKind::Enumeration
                | NodeKind::DisjointUnion
                | NodeKind::RangeRestriction
        )
    }

    pub fn default_size(self) -> Size {
        match self {
            NodeKind::Concept => Size::new(110.0, 50.0),
            NodeKind::Role => Size::new(70.0, 50.0),
            NodeKind::Attribute => Size::new(20.0, 20.0),
            NodeKind::ValueDomain => Size::new(90.0, 40.0),
            NodeKind::Individual | NodeKind::Literal => Size::new(60.0, 60.0),
            NodeKind::Facet => Size::new(80.0, 40.0),
            NodeKind::DomainRestriction | NodeKind::RangeRestriction => Size::new(20.0, 20.0),
            NodeKind::PropertyAssertion => Size::new(52.0, 30.0),
            _ => Size::new(50.0, 30.0),
        }
    }

    pub fn default_brush(self) -> Color {
        match self {
            NodeKind::DisjointUnion | NodeKind::RangeRestriction => SOLID_BRUSH,
            _ => DEFAULT_BRUSH,
        }
    }

    pub fn default_text(self) -> &'static str {
        match self {
            NodeKind::Concept => "concept",
            NodeKind::Role => "role",
            NodeKind::Attribute => "attribute",
            NodeKind::ValueDomain => "xsd:string",
            NodeKind::Individual => "individual",
            NodeKind::Literal => "\"literal\"^^xsd:string",
            NodeKind::Facet => "xsd:length",
            NodeKind::DomainRestriction | NodeKind::RangeRestriction => "exists",
            NodeKind::Union => "or",
            NodeKind::Intersection => "and",
            NodeKind::Complement => "not",
            NodeKind::Enumeration => "oneOf",
            NodeKind::RoleChain => "chain",
            NodeKind::RoleInverse => "inv",
            NodeKind::DatatypeRestriction => "data",
            NodeKind::HasKey => "key",
            NodeKind::DisjointUnion | NodeKind::PropertyAssertion => "",
        }
    }

    /// Identity of a freshly created node of this kind.
    pub fn default_identity(self) -> Identity {
        match self {
            NodeKind::Concept | NodeKind::DomainRestriction => Identity::Concept,
            NodeKind::Role | NodeKind::RoleInverse | NodeKind::RoleChain => Identity::Role,
            NodeKind::Attribute => Identity::Attribute,
            NodeKind::ValueDomain | NodeKind::DatatypeRestriction => Identity::ValueDomain,
            NodeKind::Individual => Identity::Individual,
            NodeKind::Literal => Identity::Value,
            NodeKind::Facet => Identity::Facet,
            _ => Identity::Neutral,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ─── Edge kinds ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Inclusion,
    Equivalence,
    Input,
    Membership,
    Same,
    Different,
}

impl EdgeKind {
    pub fn short_name(self) -> &'static str {
        match self {
            EdgeKind::Inclusion => "inclusion",
            EdgeKind::Equivalence => "equivalence",
            EdgeKind::Input => "input",
            EdgeKind::Membership => "membership",
            EdgeKind::Same => "same",
            EdgeKind::Different => "different",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Boolean edge attributes that commands can toggle in bulk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeFlag {
    /// Inclusion edge drawn as an equivalence (complete inclusion).
    Equivalence,
    /// Input edge marking a functional role/attribute.
    Functional,
}

impl EdgeFlag {
    pub fn describe(self) -> &'static str {
        match self {
            EdgeFlag::Equivalence => "completeness",
            EdgeFlag::Functional => "functionality",
        }
    }
}

// ─── Items ───────────────────────────────────────────────────────────────

/// A diagram vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Centre of the node in scene coordinates.
    pub pos: Point,
    pub size: Size,
    pub brush: Color,
    pub z: f64,
    pub font_size: u32,
    pub text: String,
    /// Custom label position; `None` means the kind's default placement.
    pub text_pos: Option<Point>,
    pub identity: Identity,
    /// Edges registered on this node (no duplicates).
    pub edges: EdgeList,
    /// Per-edge anchor points; edges without an entry anchor at `pos`.
    pub anchors: HashMap<EdgeId, Point>,
    /// Ordered input edges (role chain and property assertion only).
    pub inputs: EdgeList,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, pos: Point) -> Self {
        let text = kind.default_text().to_string();
        let identity = match kind {
            NodeKind::Individual => individual_identity(&text),
            _ => kind.default_identity(),
        };
        Self {
            id,
            kind,
            pos,
            size: kind.default_size(),
            brush: kind.default_brush(),
            z: 0.0,
            font_size: 12,
            text,
            text_pos: None,
            identity,
            edges: EdgeList::new(),
            anchors: HashMap::new(),
            inputs: EdgeList::new(),
        }
    }

    /// Human-readable name, e.g. `role chain node`.
    pub fn name(&self) -> String {
        format!("{} node", self.kind.short_name())
    }

    /// Register an edge on this node. Returns false if it was already known.
    pub fn add_edge(&mut self, edge: EdgeId) -> bool {
        if self.edges.contains(&edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Forget an edge. Returns false if it was not registered.
    pub fn remove_edge(&mut self, edge: EdgeId) -> bool {
        match self.edges.iter().position(|e| *e == edge) {
            Some(i) => {
                self.edges.remove(i);
                true
            }
            None => false,
        }
    }

    /// Anchor point of the given edge, defaulting to the node centre.
    pub fn anchor(&self, edge: EdgeId) -> Point {
        self.anchors.get(&edge).copied().unwrap_or(self.pos)
    }

    /// Topmost point of the bounding box.
    pub fn top(&self) -> f64 {
        self.pos.y - self.size.height / 2.0
    }
}

/// Identity of an individual node given its label: quoted labels are values.
pub fn individual_identity(text: &str) -> Identity {
    if text.starts_with('"') {
        Identity::Value
    } else {
        Identity::Individual
    }
}

/// A diagram edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: NodeId,
    /// Intermediate routing points, source to target.
    pub breakpoints: Vec<Point>,
    pub equivalence: bool,
    pub functional: bool,
    /// Routing cache: resolved anchor per endpoint.
    pub anchors: HashMap<NodeId, Point>,
    /// Routing cache: polyline through anchors and breakpoints.
    pub path: Vec<Point>,
    /// Routing cache: 1-based input position on an ordered-input target.
    pub label: Option<String>,
}

impl Edge {
    pub fn new(id: EdgeId, kind: EdgeKind, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            kind,
            source,
            target,
            breakpoints: Vec::new(),
            equivalence: kind == EdgeKind::Equivalence,
            functional: false,
            anchors: HashMap::new(),
            path: Vec::new(),
            label: None,
        }
    }

    /// Human-readable name, e.g. `input edge`.
    pub fn name(&self) -> String {
        format!("{} edge", self.kind.short_name())
    }

    /// The endpoint opposite to `node`, if `node` is an endpoint at all.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.source {
            Some(self.target)
        } else if node == self.target {
            Some(self.source)
        } else {
            None
        }
    }

    pub fn flag(&self, flag: EdgeFlag) -> bool {
        match flag {
            EdgeFlag::Equivalence => self.equivalence,
            EdgeFlag::Functional => self.functional,
        }
    }

    pub fn set_flag(&mut self, flag: EdgeFlag, value: bool) {
        match flag {
            EdgeFlag::Equivalence => self.equivalence = value,
            EdgeFlag::Functional => self.functional = value,
        }
    }
}

/// Descriptive metadata attached to a predicate (kind + label).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredicateMeta {
    pub description: String,
    pub url: String,
}
