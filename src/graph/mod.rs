#![forbid(unsafe_code)]

//! Handle for one named graph.
//!
//! A [`Graph`] owns the schema cache for its graph and shares it across
//! clones, so every query issued through the handle decodes against the same
//! label, relationship-type, and property-key lists.

/// Parameter and procedure call rendering.
pub mod params;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{MetadataSource, SchemaCache};
use crate::config::GraphOptions;
use crate::error::{GraphError, Result};
use crate::protocol::command::{query_args, text_args};
use crate::protocol::{GraphCommand, Reply, Transport};
use crate::resultset::{self, ResultSet, Value};

/// Query handle bound to a graph name.
#[derive(Clone)]
pub struct Graph {
    name: String,
    transport: Arc<dyn Transport>,
    cache: Arc<SchemaCache>,
    options: GraphOptions,
}

impl Graph {
    /// Opens a handle, warming the schema cache when the options ask for it.
    pub fn new(
        name: impl Into<String>,
        transport: Arc<dyn Transport>,
        options: GraphOptions,
    ) -> Result<Self> {
        let name = name.into();
        let graph = Self {
            cache: Arc::new(SchemaCache::new(name.clone())),
            name,
            transport,
            options,
        };
        if graph.options.warm_cache_on_open {
            graph.cache.warm(&graph)?;
            debug!(graph = %graph.name, "graph.cache.warmed");
        }
        Ok(graph)
    }

    /// Graph name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options this handle was opened with.
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Schema cache shared by all clones of this handle.
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    fn write_command(&self) -> GraphCommand {
        if self.options.read_only {
            GraphCommand::ReadOnlyQuery
        } else {
            GraphCommand::Query
        }
    }

    fn run(&self, command: GraphCommand, query: &str, timeout_ms: Option<u64>) -> Result<ResultSet> {
        let timeout_ms = timeout_ms.or(self.options.default_timeout_ms);
        debug!(graph = %self.name, %command, ?timeout_ms, "graph.query");
        let reply = self
            .transport
            .send(command, query_args(&self.name, query, timeout_ms))?;
        resultset::decode(reply, &self.cache, self)
    }

    /// Runs `query`; read-only handles send it as `GRAPH.RO_QUERY`.
    pub fn query(&self, query: &str) -> Result<ResultSet> {
        self.run(self.write_command(), query, None)
    }

    /// Runs `query` as `GRAPH.RO_QUERY`.
    pub fn ro_query(&self, query: &str) -> Result<ResultSet> {
        self.run(GraphCommand::ReadOnlyQuery, query, None)
    }

    /// Runs `query` with a server-side timeout.
    pub fn query_with_timeout(&self, query: &str, timeout_ms: u64) -> Result<ResultSet> {
        self.run(self.write_command(), query, Some(timeout_ms))
    }

    /// Runs a read-only `query` with a server-side timeout.
    pub fn ro_query_with_timeout(&self, query: &str, timeout_ms: u64) -> Result<ResultSet> {
        self.run(GraphCommand::ReadOnlyQuery, query, Some(timeout_ms))
    }

    /// Runs `query` with inline parameters.
    pub fn query_with_params(
        &self,
        query: &str,
        params: &BTreeMap<String, Value>,
    ) -> Result<ResultSet> {
        let prepared = params::prepare_query(query, params)?;
        self.run(self.write_command(), &prepared, None)
    }

    /// Runs a read-only `query` with inline parameters.
    pub fn ro_query_with_params(
        &self,
        query: &str,
        params: &BTreeMap<String, Value>,
    ) -> Result<ResultSet> {
        let prepared = params::prepare_query(query, params)?;
        self.run(GraphCommand::ReadOnlyQuery, &prepared, None)
    }

    /// Runs `query` with inline parameters and a server-side timeout.
    pub fn query_with_params_and_timeout(
        &self,
        query: &str,
        params: &BTreeMap<String, Value>,
        timeout_ms: u64,
    ) -> Result<ResultSet> {
        let prepared = params::prepare_query(query, params)?;
        self.run(self.write_command(), &prepared, Some(timeout_ms))
    }

    /// Runs a read-only `query` with inline parameters and a server-side timeout.
    pub fn ro_query_with_params_and_timeout(
        &self,
        query: &str,
        params: &BTreeMap<String, Value>,
        timeout_ms: u64,
    ) -> Result<ResultSet> {
        let prepared = params::prepare_query(query, params)?;
        self.run(GraphCommand::ReadOnlyQuery, &prepared, Some(timeout_ms))
    }

    /// Calls a procedure without arguments.
    pub fn call_procedure(&self, procedure: &str) -> Result<ResultSet> {
        self.call_procedure_with_args(procedure, &[], &[])
    }

    /// Calls a procedure with quoted string arguments and an optional `YIELD` list.
    pub fn call_procedure_with_args(
        &self,
        procedure: &str,
        args: &[&str],
        yields: &[&str],
    ) -> Result<ResultSet> {
        let query = params::prepare_procedure(procedure, args, yields);
        self.run(self.write_command(), &query, None)
    }

    /// Execution plan for `query`, one line per operation.
    pub fn explain(&self, query: &str) -> Result<Vec<String>> {
        self.plan(GraphCommand::Explain, query)
    }

    /// Runs `query` and returns the profiled plan lines.
    pub fn profile(&self, query: &str) -> Result<Vec<String>> {
        self.plan(GraphCommand::Profile, query)
    }

    fn plan(&self, command: GraphCommand, query: &str) -> Result<Vec<String>> {
        debug!(graph = %self.name, %command, "graph.plan");
        let reply = self.transport.send(command, text_args([self.name.as_str(), query]))?;
        let lines = match reply {
            Reply::Error(message) => return Err(self.evaluation(message)),
            other => other.into_array("plan")?,
        };
        lines
            .into_iter()
            .map(|line| line.into_text("plan line").map_err(GraphError::from))
            .collect()
    }

    /// Copies this graph to `destination`.
    pub fn copy(&self, destination: &str) -> Result<String> {
        debug!(graph = %self.name, destination, "graph.copy");
        let reply = self
            .transport
            .send(GraphCommand::Copy, text_args([self.name.as_str(), destination]))?;
        self.status(reply)
    }

    /// Deletes the graph on the server and drops cached schema names.
    pub fn delete(&self) -> Result<String> {
        debug!(graph = %self.name, "graph.delete");
        let reply = self
            .transport
            .send(GraphCommand::Delete, text_args([self.name.as_str()]))?;
        let status = self.status(reply)?;
        self.cache.clear();
        Ok(status)
    }

    /// Drops cached schema names. The transport is left open.
    pub fn close(&self) {
        self.cache.clear();
    }

    fn status(&self, reply: Reply) -> Result<String> {
        match reply {
            Reply::Error(message) => Err(self.evaluation(message)),
            other => Ok(other.into_text("command status")?),
        }
    }

    fn evaluation(&self, message: String) -> GraphError {
        warn!(graph = %self.name, %message, "graph.evaluation_error");
        GraphError::evaluation(message)
    }
}

impl MetadataSource for Graph {
    fn call_procedure(&self, procedure: &str) -> Result<ResultSet> {
        Graph::call_procedure(self, procedure)
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("cache", &self.cache)
            .finish()
    }
}
