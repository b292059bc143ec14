//! Graph entities decoded from compact replies.
//!
//! Entities carry resolved names only; they hold no reference to the graph or
//! cache that produced them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use super::value::Value;
use crate::error::{GraphError, Result};

/// Maximum absolute difference at which two coordinates compare equal.
pub const POINT_EPSILON: f64 = 1e-5;

/// A named property value attached to a node or edge.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Property {
    /// Property key.
    pub name: String,
    /// Decoded value.
    pub value: Value,
}

impl Property {
    /// Creates a property.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Node with its resolved labels and properties.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Node {
    id: i64,
    labels: SmallVec<[String; 2]>,
    properties: BTreeMap<String, Value>,
}

impl Node {
    /// Creates a node with no labels or properties.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Builder-style label addition.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.add_label(label);
        self
    }

    /// Builder-style property addition.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Entity id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Labels in the order the server listed them.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Appends `label` unless the node already carries it.
    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    /// True when the node carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Inserts or replaces a property.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Inserts or replaces a property.
    pub fn add_property(&mut self, property: Property) {
        self.properties.insert(property.name, property.value);
    }

    /// Value of property `name`.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// All properties keyed by name.
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Number of properties.
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.labels.len() == other.labels.len()
            && self.labels.iter().all(|l| other.labels.contains(l))
            && self.properties == other.properties
    }
}

/// Relationship between two nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Edge {
    id: i64,
    relationship_type: String,
    source: i64,
    destination: i64,
    properties: BTreeMap<String, Value>,
}

impl Edge {
    /// Creates an edge with no properties.
    pub fn new(id: i64, relationship_type: impl Into<String>, source: i64, destination: i64) -> Self {
        Self {
            id,
            relationship_type: relationship_type.into(),
            source,
            destination,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property addition.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Entity id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Relationship type name.
    pub fn relationship_type(&self) -> &str {
        &self.relationship_type
    }

    /// Source node id.
    pub fn source(&self) -> i64 {
        self.source
    }

    /// Destination node id.
    pub fn destination(&self) -> i64 {
        self.destination
    }

    /// Inserts or replaces a property.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Inserts or replaces a property.
    pub fn add_property(&mut self, property: Property) {
        self.properties.insert(property.name, property.value);
    }

    /// Value of property `name`.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// All properties keyed by name.
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Number of properties.
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Alternating node/edge sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Path {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Path {
    /// Builds a path, checking that it holds one more node than edges (or nothing).
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let valid = if nodes.is_empty() {
            edges.is_empty()
        } else {
            nodes.len() == edges.len() + 1
        };
        if !valid {
            return Err(crate::error::ProtocolError::PathShape {
                nodes: nodes.len(),
                edges: edges.len(),
            }
            .into());
        }
        Ok(Self { nodes, edges })
    }

    /// Starts an alternating builder.
    pub fn builder() -> PathBuilder {
        PathBuilder::default()
    }

    /// Nodes in traversal order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in traversal order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of edges.
    pub fn length(&self) -> usize {
        self.edges.len()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node at `index`.
    pub fn node(&self, index: usize) -> Result<&Node> {
        self.nodes.get(index).ok_or(GraphError::IndexOutOfBounds {
            index,
            len: self.nodes.len(),
        })
    }

    /// Edge at `index`.
    pub fn edge(&self, index: usize) -> Result<&Edge> {
        self.edges.get(index).ok_or(GraphError::IndexOutOfBounds {
            index,
            len: self.edges.len(),
        })
    }

    /// First node.
    pub fn first_node(&self) -> Result<&Node> {
        self.node(0)
    }

    /// Last node.
    pub fn last_node(&self) -> Result<&Node> {
        self.node(self.nodes.len().saturating_sub(1))
    }
}

/// Incremental path construction that enforces node, edge, node, ... order.
#[derive(Debug, Default)]
pub struct PathBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl PathBuilder {
    /// Appends a node; the previous element must have been an edge (or none).
    pub fn node(mut self, node: Node) -> Result<Self> {
        if self.nodes.len() != self.edges.len() {
            return Err(GraphError::InvalidArgument(
                "path builder expected an edge but got a node".into(),
            ));
        }
        self.nodes.push(node);
        Ok(self)
    }

    /// Appends an edge; the previous element must have been a node.
    pub fn edge(mut self, edge: Edge) -> Result<Self> {
        if self.nodes.len() != self.edges.len() + 1 {
            return Err(GraphError::InvalidArgument(
                "path builder expected a node but got an edge".into(),
            ));
        }
        self.edges.push(edge);
        Ok(self)
    }

    /// Finishes the path; a non-empty path must end with a node.
    pub fn build(self) -> Result<Path> {
        if !self.nodes.is_empty() && self.nodes.len() != self.edges.len() + 1 {
            return Err(GraphError::InvalidArgument(
                "path builder nodes count should be edge count + 1".into(),
            ));
        }
        Path::new(self.nodes, self.edges)
    }
}

/// Geographic point.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Point {
    latitude: f64,
    longitude: f64,
}

impl Point {
    /// Creates a point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl TryFrom<&[f64]> for Point {
    type Error = GraphError;

    fn try_from(values: &[f64]) -> Result<Self> {
        match values {
            [latitude, longitude] => Ok(Point::new(*latitude, *longitude)),
            _ => Err(GraphError::InvalidArgument(format!(
                "point requires 2 coordinates, got {}",
                values.len()
            ))),
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        (self.latitude - other.latitude).abs() < POINT_EPSILON
            && (self.longitude - other.longitude).abs() < POINT_EPSILON
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Point{{latitude={}, longitude={}}}",
            self.latitude, self.longitude
        )
    }
}
