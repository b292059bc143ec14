use std::fmt;

use bytes::Bytes;

/// Flag asking the server for the compact, id-based reply encoding.
pub const COMPACT_FLAG: &str = "--compact";
/// Keyword preceding a per-query timeout in milliseconds.
pub const TIMEOUT_KEYWORD: &str = "timeout";

/// Graph module commands issued by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GraphCommand {
    /// `GRAPH.QUERY`
    Query,
    /// `GRAPH.RO_QUERY`
    ReadOnlyQuery,
    /// `GRAPH.EXPLAIN`
    Explain,
    /// `GRAPH.PROFILE`
    Profile,
    /// `GRAPH.DELETE`
    Delete,
    /// `GRAPH.COPY`
    Copy,
    /// `GRAPH.LIST`
    List,
}

impl GraphCommand {
    /// Wire name of the command.
    pub const fn name(self) -> &'static str {
        match self {
            GraphCommand::Query => "GRAPH.QUERY",
            GraphCommand::ReadOnlyQuery => "GRAPH.RO_QUERY",
            GraphCommand::Explain => "GRAPH.EXPLAIN",
            GraphCommand::Profile => "GRAPH.PROFILE",
            GraphCommand::Delete => "GRAPH.DELETE",
            GraphCommand::Copy => "GRAPH.COPY",
            GraphCommand::List => "GRAPH.LIST",
        }
    }
}

impl fmt::Display for GraphCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments for a query-style command: `<graph> <query> --compact [timeout <ms>]`.
pub fn query_args(graph: &str, query: &str, timeout_ms: Option<u64>) -> Vec<Bytes> {
    let mut args = Vec::with_capacity(5);
    args.push(Bytes::copy_from_slice(graph.as_bytes()));
    args.push(Bytes::copy_from_slice(query.as_bytes()));
    args.push(Bytes::from_static(COMPACT_FLAG.as_bytes()));
    if let Some(ms) = timeout_ms {
        args.push(Bytes::from_static(TIMEOUT_KEYWORD.as_bytes()));
        args.push(Bytes::from(ms.to_string()));
    }
    args
}

/// Plain text arguments, one per element.
pub fn text_args<'a>(parts: impl IntoIterator<Item = &'a str>) -> Vec<Bytes> {
    parts
        .into_iter()
        .map(|part| Bytes::copy_from_slice(part.as_bytes()))
        .collect()
}
