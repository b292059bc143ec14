//! Recursive decoding of compact `(tag, payload)` values and graph entities.

use std::collections::BTreeMap;

use tracing::trace;

use super::entity::{Edge, Node, Path, Point};
use super::value::{ScalarType, Value};
use crate::cache::{MetadataSource, SchemaCache, SchemaKind};
use crate::error::{ProtocolError, Result};
use crate::protocol::Reply;

/// Decodes values of one reply, resolving schema ids through `cache`.
///
/// `source` is only consulted when the cache misses.
pub struct Decoder<'a> {
    cache: &'a SchemaCache,
    source: &'a dyn MetadataSource,
}

impl<'a> Decoder<'a> {
    /// Binds a decoder to a cache and the graph that can refresh it.
    pub fn new(cache: &'a SchemaCache, source: &'a dyn MetadataSource) -> Self {
        Self { cache, source }
    }

    /// Decodes a `[tag, payload]` pair.
    pub fn value(&self, raw: Reply) -> Result<Value> {
        let [tag, payload] = raw.into_tuple::<2>("scalar")?;
        let tag = ScalarType::try_from(tag.as_integer("scalar type")?)?;
        self.tagged(tag, payload)
    }

    /// Decodes `payload` according to an already-read tag.
    pub fn tagged(&self, tag: ScalarType, payload: Reply) -> Result<Value> {
        let value = match tag {
            ScalarType::Null => Value::Null,
            ScalarType::String => Value::String(payload.into_text("string value")?),
            ScalarType::Integer => Value::Integer(payload.as_integer("integer value")?),
            ScalarType::Boolean => {
                Value::Boolean(payload.as_text("boolean value")?.eq_ignore_ascii_case("true"))
            }
            ScalarType::Double => Value::Double(payload.as_f64("double value")?),
            ScalarType::Array => Value::Array(self.array(payload)?),
            ScalarType::Edge => Value::Edge(self.edge(payload)?),
            ScalarType::Node => Value::Node(self.node(payload)?),
            ScalarType::Path => Value::Path(self.path(payload)?),
            ScalarType::Map => Value::Map(self.map(payload)?),
            ScalarType::Point => Value::Point(point(payload)?),
            ScalarType::Vector => Value::Vector(vector(payload)?),
            ScalarType::Unknown | ScalarType::DateTime | ScalarType::Date | ScalarType::Time => {
                trace!(?tag, "decode.opaque");
                Value::Opaque { kind: tag, payload }
            }
        };
        Ok(value)
    }

    /// Decodes a bare node payload `[id, [label_id..], [property..]]`.
    pub fn node(&self, raw: Reply) -> Result<Node> {
        let [id, labels, properties] = raw.into_tuple::<3>("node")?;
        let mut node = Node::new(id.as_integer("node id")?);
        for label in labels.into_array("node labels")? {
            let index = label.as_index("node label id")?;
            node.add_label(self.cache.resolve(SchemaKind::Label, index, self.source)?);
        }
        self.properties(properties, |name, value| node.set_property(name, value))?;
        Ok(node)
    }

    /// Decodes a bare edge payload `[id, type_id, src, dst, [property..]]`.
    pub fn edge(&self, raw: Reply) -> Result<Edge> {
        let [id, rel_type, src, dst, properties] = raw.into_tuple::<5>("edge")?;
        let rel_type = self.cache.resolve(
            SchemaKind::RelationshipType,
            rel_type.as_index("edge type id")?,
            self.source,
        )?;
        let mut edge = Edge::new(
            id.as_integer("edge id")?,
            rel_type,
            src.as_integer("edge source")?,
            dst.as_integer("edge destination")?,
        );
        self.properties(properties, |name, value| edge.set_property(name, value))?;
        Ok(edge)
    }

    fn properties(&self, raw: Reply, mut insert: impl FnMut(String, Value)) -> Result<()> {
        for property in raw.into_array("properties")? {
            let [key, tag, payload] = property.into_tuple::<3>("property")?;
            let name = self.cache.resolve(
                SchemaKind::PropertyKey,
                key.as_index("property key id")?,
                self.source,
            )?;
            let tag = ScalarType::try_from(tag.as_integer("property type")?)?;
            insert(name, self.tagged(tag, payload)?);
        }
        Ok(())
    }

    fn array(&self, raw: Reply) -> Result<Vec<Value>> {
        raw.into_array("array value")?
            .into_iter()
            .map(|item| self.value(item))
            .collect()
    }

    fn map(&self, raw: Reply) -> Result<BTreeMap<String, Value>> {
        let entries = raw.into_array("map value")?;
        if entries.len() % 2 != 0 {
            return Err(ProtocolError::UnexpectedShape {
                expected: "even number of key/value entries",
                context: "map value",
            }
            .into());
        }
        let mut map = BTreeMap::new();
        let mut entries = entries.into_iter();
        while let (Some(key), Some(value)) = (entries.next(), entries.next()) {
            let key = key.into_text("map key")?;
            map.insert(key, self.value(value)?);
        }
        Ok(map)
    }

    fn path(&self, raw: Reply) -> Result<Path> {
        let [nodes, edges] = raw.into_tuple::<2>("path")?;
        let nodes = match self.value(nodes)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Node(node) => Ok(node),
                    _ => Err(path_shape("path node")),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(path_shape("path nodes")),
        };
        let edges = match self.value(edges)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Edge(edge) => Ok(edge),
                    _ => Err(path_shape("path edge")),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(path_shape("path edges")),
        };
        Path::new(nodes, edges)
    }
}

fn path_shape(context: &'static str) -> crate::error::GraphError {
    ProtocolError::UnexpectedShape {
        expected: "array of entities",
        context,
    }
    .into()
}

fn point(raw: Reply) -> Result<Point> {
    let [latitude, longitude] = raw.into_tuple::<2>("point value")?;
    Ok(Point::new(
        latitude.as_f64("point latitude")?,
        longitude.as_f64("point longitude")?,
    ))
}

fn vector(raw: Reply) -> Result<Vec<f32>> {
    raw.into_array("vector value")?
        .into_iter()
        .map(|entry| -> Result<f32> {
            match entry {
                Reply::Double(v) => Ok(v as f32),
                Reply::Integer(v) => Ok(v as f32),
                other => {
                    let text = other.as_text("vector entry")?;
                    let parsed = text
                        .trim()
                        .parse::<f32>()
                        .map_err(|_| ProtocolError::InvalidVectorEntry(text.to_owned()))?;
                    Ok(parsed)
                }
            }
        })
        .collect()
}
