use std::sync::Arc;

use serde::Serialize;

use crate::error::ProtocolError;
use crate::protocol::Reply;

/// Declared kind of a result column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnKind {
    /// Kind the server did not declare; values decode to null.
    Unknown,
    /// Tagged `(type, payload)` value.
    Scalar,
    /// Bare node payload.
    Node,
    /// Bare edge payload.
    Relation,
}

impl TryFrom<i64> for ColumnKind {
    type Error = ProtocolError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ColumnKind::Unknown),
            1 => Ok(ColumnKind::Scalar),
            2 => Ok(ColumnKind::Node),
            3 => Ok(ColumnKind::Relation),
            other => Err(ProtocolError::UnrecognizedColumn(other)),
        }
    }
}

/// Column names and kinds of a result set, in declared order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Header {
    names: Arc<[String]>,
    kinds: Vec<ColumnKind>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            names: Arc::from(Vec::new()),
            kinds: Vec::new(),
        }
    }
}

impl Header {
    /// Builds a header from `(name, kind)` pairs.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnKind)>,
        S: Into<String>,
    {
        let (names, kinds): (Vec<String>, Vec<ColumnKind>) = columns
            .into_iter()
            .map(|(name, kind)| (name.into(), kind))
            .unzip();
        Self {
            names: names.into(),
            kinds,
        }
    }

    /// Parses the wire header: an array of `[kind, name]` pairs.
    pub fn parse(raw: Reply) -> Result<Self, ProtocolError> {
        let entries = raw.into_array("header")?;
        let mut names = Vec::with_capacity(entries.len());
        let mut kinds = Vec::with_capacity(entries.len());
        for entry in entries {
            let [kind, name] = entry.into_tuple::<2>("header entry")?;
            kinds.push(ColumnKind::try_from(kind.as_integer("header column kind")?)?);
            names.push(name.into_text("header column name")?);
        }
        Ok(Self {
            names: names.into(),
            kinds,
        })
    }

    /// Column names in order.
    pub fn schema_names(&self) -> &[String] {
        &self.names
    }

    /// Column kinds in order.
    pub fn schema_types(&self) -> &[ColumnKind] {
        &self.kinds
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// True when the result has no columns.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Position of the first column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub(crate) fn shared_names(&self) -> Arc<[String]> {
        Arc::clone(&self.names)
    }
}
