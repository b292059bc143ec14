#![forbid(unsafe_code)]

//! Result sets decoded from compact query replies.
//!
//! A reply is `[header, rows, statistics]`. Write-only queries send a shorter
//! array ending in statistics, and a query that fails after the header was
//! produced carries the server error as its last element.

/// Recursive value and entity decoding.
pub mod decode;
/// Nodes, edges, paths, and points.
pub mod entity;
/// Column names and kinds.
pub mod header;
/// Decoded rows.
pub mod record;
/// Query statistics.
pub mod statistics;
/// Decoded value model and type tags.
pub mod value;

pub use decode::Decoder;
pub use entity::{Edge, Node, Path, PathBuilder, Point, Property};
pub use header::{ColumnKind, Header};
pub use record::{ColumnIndex, Record};
pub use statistics::{StatLabel, Statistics};
pub use value::{ScalarType, Value};

use serde::Serialize;
use tracing::{trace, warn};

use crate::cache::{MetadataSource, SchemaCache};
use crate::error::{GraphError, ProtocolError, Result};
use crate::protocol::Reply;

/// Fully materialized result of one query.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResultSet {
    header: Header,
    records: Vec<Record>,
    statistics: Statistics,
}

impl ResultSet {
    /// Assembles a result set from already-decoded rows.
    ///
    /// Fails when a row's width differs from the header.
    pub fn new(header: Header, rows: Vec<Vec<Value>>, statistics: Statistics) -> Result<Self> {
        let names = header.shared_names();
        let records = rows
            .into_iter()
            .map(|values| {
                if values.len() != header.len() {
                    return Err(row_width(header.len(), values.len()));
                }
                Ok(Record::new(names.clone(), values))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            header,
            records,
            statistics,
        })
    }

    /// Column metadata.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Query statistics.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// All rows in server order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterates rows; may be called any number of times.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the query returned no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows as a JSON array of column-keyed objects.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(&self.records).map_err(|e| GraphError::Serialization(e.to_string()))
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

fn row_width(expected: usize, found: usize) -> GraphError {
    ProtocolError::Arity {
        expected,
        found,
        context: "result row",
    }
    .into()
}

/// Decodes a compact query reply.
///
/// Schema ids are resolved through `cache`, which refreshes from `source` on
/// a miss. A server error anywhere at the top level wins over every other
/// part of the reply.
pub fn decode(raw: Reply, cache: &SchemaCache, source: &dyn MetadataSource) -> Result<ResultSet> {
    let mut parts = match raw {
        Reply::Error(message) => {
            warn!(graph = %cache.graph(), %message, "resultset.evaluation_error");
            return Err(GraphError::evaluation(message));
        }
        other => other.into_array("query reply")?,
    };

    if let Some(Reply::Error(message)) = parts.last_mut() {
        let message = std::mem::take(message);
        warn!(graph = %cache.graph(), %message, "resultset.evaluation_error");
        return Err(GraphError::evaluation(message));
    }

    if parts.len() != 3 {
        let statistics = match parts.pop() {
            Some(stats) => Statistics::parse(stats)?,
            None => Statistics::default(),
        };
        trace!(graph = %cache.graph(), parts = parts.len() + 1, "resultset.statistics_only");
        return Ok(ResultSet {
            header: Header::default(),
            records: Vec::new(),
            statistics,
        });
    }

    let [header, rows, stats] = Reply::Array(parts).into_tuple::<3>("query reply")?;
    let header = Header::parse(header)?;
    let decoder = Decoder::new(cache, source);
    let names = header.shared_names();

    let rows = rows.into_array("result rows")?;
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let cells = row.into_array("result row")?;
        if cells.len() != header.len() {
            return Err(row_width(header.len(), cells.len()));
        }
        let values = cells
            .into_iter()
            .zip(header.schema_types())
            .map(|(cell, kind)| match kind {
                ColumnKind::Scalar => decoder.value(cell),
                ColumnKind::Node => decoder.node(cell).map(Value::Node),
                ColumnKind::Relation => decoder.edge(cell).map(Value::Edge),
                ColumnKind::Unknown => Ok(Value::Null),
            })
            .collect::<Result<Vec<_>>>()?;
        records.push(Record::new(names.clone(), values));
    }

    let statistics = Statistics::parse(stats)?;
    trace!(
        graph = %cache.graph(),
        columns = header.len(),
        rows = records.len(),
        "resultset.decoded"
    );
    Ok(ResultSet {
        header,
        records,
        statistics,
    })
}
