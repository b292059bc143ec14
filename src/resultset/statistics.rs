use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::ProtocolError;
use crate::protocol::Reply;

/// Statistic labels the server is known to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatLabel {
    /// `Labels added`
    LabelsAdded,
    /// `Labels removed`
    LabelsRemoved,
    /// `Indices created`
    IndicesCreated,
    /// `Indices deleted`
    IndicesDeleted,
    /// `Nodes created`
    NodesCreated,
    /// `Nodes deleted`
    NodesDeleted,
    /// `Relationships created`
    RelationshipsCreated,
    /// `Relationships deleted`
    RelationshipsDeleted,
    /// `Properties set`
    PropertiesSet,
    /// `Properties removed`
    PropertiesRemoved,
    /// `Cached execution`
    CachedExecution,
    /// `Query internal execution time`
    QueryInternalExecutionTime,
}

impl StatLabel {
    /// Every known label.
    pub const ALL: [StatLabel; 12] = [
        StatLabel::LabelsAdded,
        StatLabel::LabelsRemoved,
        StatLabel::IndicesCreated,
        StatLabel::IndicesDeleted,
        StatLabel::NodesCreated,
        StatLabel::NodesDeleted,
        StatLabel::RelationshipsCreated,
        StatLabel::RelationshipsDeleted,
        StatLabel::PropertiesSet,
        StatLabel::PropertiesRemoved,
        StatLabel::CachedExecution,
        StatLabel::QueryInternalExecutionTime,
    ];

    /// Text the server uses for this label.
    pub const fn text(self) -> &'static str {
        match self {
            StatLabel::LabelsAdded => "Labels added",
            StatLabel::LabelsRemoved => "Labels removed",
            StatLabel::IndicesCreated => "Indices created",
            StatLabel::IndicesDeleted => "Indices deleted",
            StatLabel::NodesCreated => "Nodes created",
            StatLabel::NodesDeleted => "Nodes deleted",
            StatLabel::RelationshipsCreated => "Relationships created",
            StatLabel::RelationshipsDeleted => "Relationships deleted",
            StatLabel::PropertiesSet => "Properties set",
            StatLabel::PropertiesRemoved => "Properties removed",
            StatLabel::CachedExecution => "Cached execution",
            StatLabel::QueryInternalExecutionTime => "Query internal execution time",
        }
    }

    /// Case-insensitive lookup by label text.
    pub fn from_text(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|label| label.text().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for StatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Counters and timings reported for one query.
///
/// A label the server did not report is absent, which is distinct from zero:
/// [`Statistics::get`] returns `None` for it while the typed counters fall
/// back to `0` / `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    entries: BTreeMap<String, String>,
}

impl Statistics {
    /// Parses `Label: value` lines.
    pub fn parse(raw: Reply) -> Result<Self, ProtocolError> {
        let mut stats = Statistics::default();
        for line in raw.into_array("statistics")? {
            stats.insert_line(line.as_text("statistics line")?);
        }
        Ok(stats)
    }

    /// Builds statistics from already-decoded lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut stats = Statistics::default();
        for line in lines {
            stats.insert_line(line);
        }
        stats
    }

    fn insert_line(&mut self, line: &str) {
        let (label, value) = match line.split_once(':') {
            Some((label, value)) => (label.trim(), value.trim()),
            None => (line.trim(), ""),
        };
        if label.is_empty() {
            return;
        }
        let label = StatLabel::from_text(label)
            .map(|known| known.text().to_owned())
            .unwrap_or_else(|| label.to_owned());
        self.entries.insert(label, value.to_owned());
    }

    /// Raw value of a known label, `None` if the server did not report it.
    pub fn get(&self, label: StatLabel) -> Option<&str> {
        self.entries.get(label.text()).map(String::as_str)
    }

    /// Raw value by label text, including labels this crate does not know.
    pub fn get_raw(&self, label: &str) -> Option<&str> {
        if let Some(known) = StatLabel::from_text(label) {
            return self.get(known);
        }
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(label))
            .map(|(_, value)| value.as_str())
    }

    /// Every reported `(label, value)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of reported statistics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn counter(&self, label: StatLabel) -> u64 {
        self.get(label)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    }

    /// Nodes created.
    pub fn nodes_created(&self) -> u64 {
        self.counter(StatLabel::NodesCreated)
    }

    /// Nodes deleted.
    pub fn nodes_deleted(&self) -> u64 {
        self.counter(StatLabel::NodesDeleted)
    }

    /// Relationships created.
    pub fn relationships_created(&self) -> u64 {
        self.counter(StatLabel::RelationshipsCreated)
    }

    /// Relationships deleted.
    pub fn relationships_deleted(&self) -> u64 {
        self.counter(StatLabel::RelationshipsDeleted)
    }

    /// Properties set.
    pub fn properties_set(&self) -> u64 {
        self.counter(StatLabel::PropertiesSet)
    }

    /// Properties removed.
    pub fn properties_removed(&self) -> u64 {
        self.counter(StatLabel::PropertiesRemoved)
    }

    /// Labels added.
    pub fn labels_added(&self) -> u64 {
        self.counter(StatLabel::LabelsAdded)
    }

    /// Labels removed.
    pub fn labels_removed(&self) -> u64 {
        self.counter(StatLabel::LabelsRemoved)
    }

    /// Indices created.
    pub fn indices_created(&self) -> u64 {
        self.counter(StatLabel::IndicesCreated)
    }

    /// Indices deleted.
    pub fn indices_deleted(&self) -> u64 {
        self.counter(StatLabel::IndicesDeleted)
    }

    /// Whether the server reused a cached execution plan.
    pub fn cached_execution(&self) -> bool {
        self.counter(StatLabel::CachedExecution) == 1
    }

    /// Server-side execution time in milliseconds.
    pub fn query_internal_execution_time(&self) -> f64 {
        self.get(StatLabel::QueryInternalExecutionTime)
            .and_then(|value| value.split_whitespace().next())
            .and_then(|number| number.parse().ok())
            .unwrap_or(0.0)
    }
}
