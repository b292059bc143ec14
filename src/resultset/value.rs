//! Decoded value model and the compact type tags that select it.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::entity::{Edge, Node, Path, Point};
use crate::error::ProtocolError;
use crate::protocol::Reply;

/// Type tag carried in front of every compact value.
///
/// Ordinals are fixed by the server; anything past `Time` is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarType {
    /// 0
    Unknown,
    /// 1
    Null,
    /// 2
    String,
    /// 3, 64-bit signed.
    Integer,
    /// 4
    Boolean,
    /// 5
    Double,
    /// 6
    Array,
    /// 7
    Edge,
    /// 8
    Node,
    /// 9
    Path,
    /// 10
    Map,
    /// 11
    Point,
    /// 12, 32-bit float vector.
    Vector,
    /// 13
    DateTime,
    /// 14
    Date,
    /// 15
    Time,
}

impl ScalarType {
    const ALL: [ScalarType; 16] = [
        ScalarType::Unknown,
        ScalarType::Null,
        ScalarType::String,
        ScalarType::Integer,
        ScalarType::Boolean,
        ScalarType::Double,
        ScalarType::Array,
        ScalarType::Edge,
        ScalarType::Node,
        ScalarType::Path,
        ScalarType::Map,
        ScalarType::Point,
        ScalarType::Vector,
        ScalarType::DateTime,
        ScalarType::Date,
        ScalarType::Time,
    ];

    /// Wire ordinal of this tag.
    pub fn ordinal(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for ScalarType {
    type Error = ProtocolError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(ProtocolError::UnrecognizedType(value))
    }
}

/// A decoded result value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value.
    Null,
    /// Boolean.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// Double precision float.
    Double(f64),
    /// UTF-8 text.
    String(String),
    /// Ordered list.
    Array(Vec<Value>),
    /// Graph node.
    Node(Node),
    /// Graph edge.
    Edge(Edge),
    /// Graph path.
    Path(Path),
    /// String-keyed map.
    Map(BTreeMap<String, Value>),
    /// Geographic point.
    Point(Point),
    /// Float vector.
    Vector(Vec<f32>),
    /// Payload of a tag this layer does not interpret, kept as received.
    Opaque {
        /// Tag the payload arrived with.
        kind: ScalarType,
        /// Raw payload.
        payload: Reply,
    },
}

impl Value {
    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer payload.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Double payload; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// String payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// List payload.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Node payload.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(v) => Some(v),
            _ => None,
        }
    }

    /// Edge payload.
    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Value::Edge(v) => Some(v),
            _ => None,
        }
    }

    /// Path payload.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(v) => Some(v),
            _ => None,
        }
    }

    /// Map payload.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Point payload.
    pub fn as_point(&self) -> Option<&Point> {
        match self {
            Value::Point(v) => Some(v),
            _ => None,
        }
    }

    /// Vector payload.
    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::String(v) => f.write_str(v),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {item}")?;
                }
                f.write_str("}")
            }
            Value::Point(p) => write!(f, "{p}"),
            Value::Vector(v) => write!(f, "{v:?}"),
            Value::Node(n) => write!(f, "Node{{id={}, labels={:?}}}", n.id(), n.labels()),
            Value::Edge(e) => write!(
                f,
                "Edge{{id={}, type={}, {}->{}}}",
                e.id(),
                e.relationship_type(),
                e.source(),
                e.destination()
            ),
            Value::Path(p) => write!(f, "Path{{nodes={}, edges={}}}", p.node_count(), p.length()),
            Value::Opaque { kind, payload } => write!(f, "{kind:?}({payload:?})"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Value::Node(value)
    }
}

impl From<Edge> for Value {
    fn from(value: Edge) -> Self {
        Value::Edge(value)
    }
}

impl From<Path> for Value {
    fn from(value: Path) -> Self {
        Value::Path(value)
    }
}

impl From<Point> for Value {
    fn from(value: Point) -> Self {
        Value::Point(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
