//! Client-side decoding for compact graph query replies.
//!
//! Queries issued with `--compact` come back as nested arrays of integers and
//! strings in which labels, relationship types, and property keys are sent as
//! ids. This crate turns those replies into typed [`ResultSet`]s, resolving
//! ids through a per-graph [`SchemaCache`] that refreshes itself from the
//! server's `db.*` procedures.
//!
//! Framing and connection pooling are left to a [`Transport`] implementation.

#![warn(missing_docs)]

pub mod cache;
/// Graph handle options.
pub mod config;
pub mod driver;
/// Error types.
pub mod error;
pub mod graph;
/// Subscriber setup for `tracing` output.
pub mod logging;
pub mod protocol;
pub mod resultset;
#[doc(hidden)]
pub mod testkit;

pub use cache::{CacheMetricsSnapshot, MetadataSource, SchemaCache, SchemaKind};
pub use config::GraphOptions;
pub use driver::Driver;
pub use error::{GraphError, ProtocolError, Result};
pub use graph::Graph;
pub use protocol::{GraphCommand, Reply, Transport};
pub use resultset::{
    decode, ColumnKind, Edge, Header, Node, Path, PathBuilder, Point, Property, Record, ResultSet,
    ScalarType, StatLabel, Statistics, Value,
};
