#![forbid(unsafe_code)]

//! Entry point tying a transport to graph handles.

use std::sync::Arc;

use tracing::debug;

use crate::config::GraphOptions;
use crate::error::Result;
use crate::graph::Graph;
use crate::protocol::{GraphCommand, Reply, Transport};

/// Hands out [`Graph`] handles over one shared transport.
#[derive(Clone)]
pub struct Driver {
    transport: Arc<dyn Transport>,
}

impl Driver {
    /// Wraps a pooled transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Handle for `name` with default options.
    ///
    /// Each call creates a handle with its own empty schema cache; clone the
    /// returned [`Graph`] to share one.
    pub fn select_graph(&self, name: &str) -> Result<Graph> {
        self.select_graph_with(name, GraphOptions::default())
    }

    /// Handle for `name` with explicit options.
    pub fn select_graph_with(&self, name: &str, options: GraphOptions) -> Result<Graph> {
        Graph::new(name, Arc::clone(&self.transport), options)
    }

    /// Names of every graph on the server.
    ///
    /// A reply that is not an array yields an empty list; non-text entries
    /// are skipped.
    pub fn list_graphs(&self) -> Result<Vec<String>> {
        let reply = self.transport.send(GraphCommand::List, Vec::new())?;
        let names = match reply {
            Reply::Array(items) => items
                .iter()
                .filter_map(|item| item.as_text("graph name").ok())
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        };
        debug!(count = names.len(), "driver.list_graphs");
        Ok(names)
    }
}
