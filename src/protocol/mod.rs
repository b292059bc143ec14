#![forbid(unsafe_code)]

//! Wire-level vocabulary shared with the key-value transport.
//!
//! The transport itself (framing, pooling, pipelining) lives outside this
//! crate; [`Transport`] is the seam it plugs into.

/// Graph command names and argument builders.
pub mod command;

/// Nested reply tree produced by the transport.
pub mod reply;

pub use command::GraphCommand;
pub use reply::Reply;

use bytes::Bytes;

use crate::error::Result;

/// Synchronous request/response channel to the server.
///
/// Implementations are expected to hand out an independent connection per
/// call (a pool checkout). Schema refreshes re-enter `send` while a reply is
/// being decoded, so an implementation pinned to one connection that is still
/// busy would deadlock.
pub trait Transport: Send + Sync {
    /// Sends `command` with `args` and returns the raw reply.
    ///
    /// Server-side query errors may arrive either as `Err(GraphError::Evaluation)`
    /// or embedded in the reply as [`Reply::Error`]; both are handled upstream.
    fn send(&self, command: GraphCommand, args: Vec<Bytes>) -> Result<Reply>;
}
