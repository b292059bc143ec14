#![forbid(unsafe_code)]

//! Per-graph cache of schema names.
//!
//! Compact replies refer to labels, relationship types, and property keys by
//! position in server-side lists that only ever grow. Each list is mirrored
//! here as an immutable snapshot that readers load without locking; a miss
//! takes the list's refresh lock, re-checks, calls the matching `db.*`
//! procedure, appends the unseen tail, and publishes a new snapshot.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{GraphError, Result};
use crate::resultset::ResultSet;

/// Which schema list an id refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Node labels.
    Label,
    /// Relationship types.
    RelationshipType,
    /// Property keys.
    PropertyKey,
}

impl SchemaKind {
    /// All kinds, in cache slot order.
    pub const ALL: [SchemaKind; 3] = [
        SchemaKind::Label,
        SchemaKind::RelationshipType,
        SchemaKind::PropertyKey,
    ];

    /// Procedure listing every name of this kind in id order.
    pub const fn procedure(self) -> &'static str {
        match self {
            SchemaKind::Label => "db.labels",
            SchemaKind::RelationshipType => "db.relationshipTypes",
            SchemaKind::PropertyKey => "db.propertyKeys",
        }
    }

    fn slot(self) -> usize {
        match self {
            SchemaKind::Label => 0,
            SchemaKind::RelationshipType => 1,
            SchemaKind::PropertyKey => 2,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaKind::Label => "label",
            SchemaKind::RelationshipType => "relationship type",
            SchemaKind::PropertyKey => "property key",
        })
    }
}

/// Something able to run a schema procedure against the cached graph.
///
/// Implemented by [`crate::graph::Graph`]. Implementations must not route the
/// call through a connection that is busy decoding the reply that missed.
pub trait MetadataSource {
    /// Runs `CALL <procedure>()` and returns its result set.
    fn call_procedure(&self, procedure: &str) -> Result<ResultSet>;
}

#[derive(Default)]
struct CacheMetrics {
    resolve_calls: AtomicU64,
    resolve_hits: AtomicU64,
    refreshes: AtomicU64,
    clears: AtomicU64,
}

/// Point-in-time view of cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    /// Calls to [`SchemaCache::resolve`].
    pub resolve_calls: u64,
    /// Resolutions served from the published snapshot without locking.
    pub resolve_hits: u64,
    /// Metadata procedures issued.
    pub refreshes: u64,
    /// Calls to [`SchemaCache::clear`].
    pub clears: u64,
}

impl CacheMetricsSnapshot {
    /// Fraction of resolutions served without a lock.
    pub fn hit_rate(&self) -> f64 {
        if self.resolve_calls == 0 {
            return 0.0;
        }
        self.resolve_hits as f64 / self.resolve_calls as f64
    }
}

impl CacheMetrics {
    fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            resolve_calls: self.resolve_calls.load(Ordering::Relaxed),
            resolve_hits: self.resolve_hits.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }
}

struct SchemaList {
    kind: SchemaKind,
    names: ArcSwap<Vec<Arc<str>>>,
    refresh_lock: Mutex<()>,
}

impl SchemaList {
    fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            names: ArcSwap::from_pointee(Vec::new()),
            refresh_lock: Mutex::new(()),
        }
    }

    fn get(&self, index: usize) -> Option<Arc<str>> {
        self.names.load().get(index).cloned()
    }

    fn refresh(
        &self,
        graph: &str,
        source: &dyn MetadataSource,
        metrics: &CacheMetrics,
    ) -> Result<()> {
        let current = self.names.load_full();
        let result = source.call_procedure(self.kind.procedure())?;
        CacheMetrics::inc(&metrics.refreshes);
        let mut next: Option<Vec<Arc<str>>> = None;
        for (row, record) in result.iter().enumerate() {
            if row < current.len() {
                continue;
            }
            let name = record.get_string(0).ok_or_else(|| {
                GraphError::from(crate::error::ProtocolError::UnexpectedShape {
                    expected: "string name column",
                    context: "schema procedure",
                })
            })?;
            next.get_or_insert_with(|| (*current).clone())
                .push(Arc::from(name));
        }
        if let Some(next) = next {
            debug!(
                graph,
                kind = %self.kind,
                before = current.len(),
                after = next.len(),
                "cache.refresh.grown"
            );
            self.names.store(Arc::new(next));
        } else {
            debug!(graph, kind = %self.kind, len = current.len(), "cache.refresh.unchanged");
        }
        Ok(())
    }

    fn clear(&self) {
        let _guard = self.refresh_lock.lock();
        self.names.store(Arc::new(Vec::new()));
    }

    fn len(&self) -> usize {
        self.names.load().len()
    }
}

/// Label, relationship-type, and property-key names of one graph.
pub struct SchemaCache {
    graph: String,
    lists: [SchemaList; 3],
    metrics: CacheMetrics,
}

impl SchemaCache {
    /// Creates an empty cache for `graph`.
    pub fn new(graph: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            lists: SchemaKind::ALL.map(SchemaList::new),
            metrics: CacheMetrics::default(),
        }
    }

    /// Graph this cache mirrors.
    pub fn graph(&self) -> &str {
        &self.graph
    }

    /// Resolves `index` in the `kind` list, refreshing from `source` on a miss.
    pub fn resolve(
        &self,
        kind: SchemaKind,
        index: usize,
        source: &dyn MetadataSource,
    ) -> Result<String> {
        CacheMetrics::inc(&self.metrics.resolve_calls);
        let list = &self.lists[kind.slot()];
        if let Some(name) = list.get(index) {
            CacheMetrics::inc(&self.metrics.resolve_hits);
            trace!(graph = %self.graph, %kind, index, "cache.resolve.hit");
            return Ok(name.to_string());
        }

        let _guard = list.refresh_lock.lock();
        if list.len() <= index {
            list.refresh(&self.graph, source, &self.metrics)?;
        }
        list.get(index)
            .map(|name| name.to_string())
            .ok_or_else(|| GraphError::Schema {
                kind,
                index,
                len: list.len(),
            })
    }

    /// Fetches all three lists up front.
    pub fn warm(&self, source: &dyn MetadataSource) -> Result<()> {
        for list in &self.lists {
            let _guard = list.refresh_lock.lock();
            list.refresh(&self.graph, source, &self.metrics)?;
        }
        Ok(())
    }

    /// Number of cached names of `kind`.
    pub fn len(&self, kind: SchemaKind) -> usize {
        self.lists[kind.slot()].len()
    }

    /// True when no names of any kind are cached.
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(|list| list.len() == 0)
    }

    /// Drops every cached name. Waits for in-flight refreshes on each list.
    pub fn clear(&self) {
        for list in &self.lists {
            list.clear();
        }
        CacheMetrics::inc(&self.metrics.clears);
        debug!(graph = %self.graph, "cache.clear");
    }

    /// Current counters.
    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("graph", &self.graph)
            .field("labels", &self.len(SchemaKind::Label))
            .field("relationship_types", &self.len(SchemaKind::RelationshipType))
            .field("property_keys", &self.len(SchemaKind::PropertyKey))
            .finish()
    }
}
