//! Test doubles and reply builders.
//!
//! Used by this crate's unit and integration tests, and usable by downstream
//! crates that want to exercise decoding without a server.

use std::collections::{BTreeMap, VecDeque};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::cache::{MetadataSource, SchemaKind};
use crate::error::{GraphError, Result};
use crate::protocol::{GraphCommand, Reply, Transport};
use crate::resultset::{ColumnKind, Header, ResultSet, ScalarType, Statistics, Value};

/// `[tag, payload]` pair as the server encodes a scalar.
pub fn scalar(tag: ScalarType, payload: impl Into<Reply>) -> Reply {
    Reply::array([Reply::Integer(tag.ordinal()), payload.into()])
}

/// `[kind, name]` header entry.
pub fn header_entry(kind: ColumnKind, name: &str) -> Reply {
    let kind = match kind {
        ColumnKind::Unknown => 0,
        ColumnKind::Scalar => 1,
        ColumnKind::Node => 2,
        ColumnKind::Relation => 3,
    };
    Reply::array([Reply::Integer(kind), Reply::text(name)])
}

/// Full `[header, rows, statistics]` reply.
pub fn query_reply(header: Vec<Reply>, rows: Vec<Vec<Reply>>, stats: &[&str]) -> Reply {
    Reply::array([
        Reply::Array(header),
        Reply::array(rows.into_iter().map(Reply::Array)),
        Reply::array(stats.iter().map(Reply::text)),
    ])
}

fn column_name(kind: SchemaKind) -> &'static str {
    match kind {
        SchemaKind::Label => "label",
        SchemaKind::RelationshipType => "relationshipType",
        SchemaKind::PropertyKey => "propertyKey",
    }
}

fn kind_for(procedure: &str) -> Option<SchemaKind> {
    SchemaKind::ALL
        .into_iter()
        .find(|kind| kind.procedure() == procedure)
}

/// In-memory schema lists answering the `db.*` procedures.
#[derive(Default)]
pub struct StaticSchema {
    lists: Mutex<BTreeMap<&'static str, Vec<String>>>,
    calls: Mutex<BTreeMap<String, usize>>,
}

impl StaticSchema {
    /// Seeds the three lists in id order.
    pub fn new(labels: &[&str], relationship_types: &[&str], property_keys: &[&str]) -> Self {
        let schema = Self::default();
        {
            let mut lists = schema.lists.lock();
            for (kind, names) in SchemaKind::ALL
                .into_iter()
                .zip([labels, relationship_types, property_keys])
            {
                lists.insert(
                    kind.procedure(),
                    names.iter().map(|n| n.to_string()).collect(),
                );
            }
        }
        schema
    }

    /// Appends a name, as the server does when a query introduces one.
    pub fn push(&self, kind: SchemaKind, name: &str) {
        self.lists
            .lock()
            .entry(kind.procedure())
            .or_default()
            .push(name.to_owned());
    }

    /// How many times `procedure` was invoked.
    pub fn calls(&self, procedure: &str) -> usize {
        self.calls.lock().get(procedure).copied().unwrap_or(0)
    }

    /// Current names for `procedure`, counting the call.
    pub fn answer(&self, procedure: &str) -> Option<(SchemaKind, Vec<String>)> {
        let kind = kind_for(procedure)?;
        *self.calls.lock().entry(procedure.to_owned()).or_default() += 1;
        let names = self
            .lists
            .lock()
            .get(kind.procedure())
            .cloned()
            .unwrap_or_default();
        Some((kind, names))
    }
}

impl MetadataSource for StaticSchema {
    fn call_procedure(&self, procedure: &str) -> Result<ResultSet> {
        let (kind, names) = self
            .answer(procedure)
            .ok_or_else(|| GraphError::evaluation(format!("Procedure `{procedure}` is not registered")))?;
        ResultSet::new(
            Header::new([(column_name(kind), ColumnKind::Scalar)]),
            names.into_iter().map(|n| vec![Value::String(n)]).collect(),
            Statistics::default(),
        )
    }
}

/// A command captured by [`ScriptedTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct SentCommand {
    /// Command issued.
    pub command: GraphCommand,
    /// Arguments as text.
    pub args: Vec<String>,
}

impl SentCommand {
    /// Query text, the second argument of query-style commands.
    pub fn query(&self) -> Option<&str> {
        self.args.get(1).map(String::as_str)
    }
}

/// Transport double replaying queued replies.
///
/// Queries of the form `CALL db.labels()` and friends are answered from the
/// attached [`StaticSchema`] instead of the queue, so schema refreshes can
/// interleave with scripted replies.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Reply>>>,
    sent: Mutex<Vec<SentCommand>>,
    schema: StaticSchema,
}

impl ScriptedTransport {
    /// Empty script with an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty script answering schema procedures from `schema`.
    pub fn with_schema(schema: StaticSchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Queues a reply.
    pub fn push_reply(&self, reply: Reply) -> &Self {
        self.replies.lock().push_back(Ok(reply));
        self
    }

    /// Queues a transport-level failure.
    pub fn push_error(&self, error: GraphError) -> &Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    /// Schema backing procedure answers.
    pub fn schema(&self) -> &StaticSchema {
        &self.schema
    }

    /// Commands sent so far, oldest first.
    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.lock().clone()
    }

    /// Sent commands that were not schema refreshes.
    pub fn sent_queries(&self) -> Vec<SentCommand> {
        self.sent()
            .into_iter()
            .filter(|cmd| cmd.query().map_or(true, |q| procedure_call(q).is_none()))
            .collect()
    }

    /// Replies still queued.
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }

    fn schema_reply(&self, procedure: &str) -> Option<Reply> {
        let (kind, names) = self.schema.answer(procedure)?;
        Some(query_reply(
            vec![header_entry(ColumnKind::Scalar, column_name(kind))],
            names
                .iter()
                .map(|name| vec![scalar(ScalarType::String, name.as_str())])
                .collect(),
            &["Cached execution: 0"],
        ))
    }
}

fn procedure_call(query: &str) -> Option<&str> {
    let name = query.strip_prefix("CALL ")?.strip_suffix("()")?;
    kind_for(name).map(|_| name)
}

impl Transport for ScriptedTransport {
    fn send(&self, command: GraphCommand, args: Vec<Bytes>) -> Result<Reply> {
        let args: Vec<String> = args
            .iter()
            .map(|arg| String::from_utf8_lossy(arg).into_owned())
            .collect();
        let sent = SentCommand { command, args };
        let procedure = sent.query().and_then(procedure_call).map(str::to_owned);
        self.sent.lock().push(sent);

        if let Some(reply) = procedure.and_then(|name| self.schema_reply(&name)) {
            return Ok(reply);
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GraphError::Transport("no scripted reply left".into())))
    }
}
