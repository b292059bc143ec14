use thiserror::Error;

use crate::cache::SchemaKind;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors surfaced by decoding, schema resolution, and the graph handle.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The reply did not have the shape the compact protocol promises.
    #[error("protocol corruption: {0}")]
    Protocol(#[from] ProtocolError),
    /// The server rejected or failed the query. The message is passed through verbatim.
    #[error("{message}")]
    Evaluation {
        /// Server error text.
        message: String,
    },
    /// An entity referenced a schema id the server never reported.
    #[error("{kind} index {index} unresolved after refresh ({len} known)")]
    Schema {
        /// Which schema list was consulted.
        kind: SchemaKind,
        /// Requested index.
        index: usize,
        /// Number of names known after the refresh.
        len: usize,
    },
    /// The transport failed to deliver the command.
    #[error("transport: {0}")]
    Transport(String),
    /// Positional access past the end of a path.
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        /// Requested position.
        index: usize,
        /// Number of available elements.
        len: usize,
    },
    /// A decoded result could not be exported.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Caller supplied something that cannot be sent or built.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl GraphError {
    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        GraphError::Evaluation {
            message: message.into(),
        }
    }

    /// True when the reply itself was malformed.
    pub fn is_protocol(&self) -> bool {
        matches!(self, GraphError::Protocol(_))
    }

    /// True when the server reported a query error.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, GraphError::Evaluation { .. })
    }
}

/// Malformed reply conditions. Each is fatal for the reply being decoded.
#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unrecognized response type {0}")]
    UnrecognizedType(i64),
    #[error("unrecognized column type {0}")]
    UnrecognizedColumn(i64),
    #[error("expected {expected} for {context}")]
    UnexpectedShape {
        expected: &'static str,
        context: &'static str,
    },
    #[error("expected {expected} elements for {context}, got {found}")]
    Arity {
        expected: usize,
        found: usize,
        context: &'static str,
    },
    #[error("invalid utf-8 in {0}")]
    InvalidUtf8(&'static str),
    #[error("invalid number '{text}' in {context}")]
    InvalidNumber { text: String, context: &'static str },
    #[error("invalid float value in vector data: '{0}'")]
    InvalidVectorEntry(String),
    #[error("path has {nodes} nodes and {edges} edges")]
    PathShape { nodes: usize, edges: usize },
}
