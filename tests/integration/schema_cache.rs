#![allow(clippy::all)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use falkordb_compact::{
    testkit::StaticSchema, GraphError, MetadataSource, Result, ResultSet, SchemaCache, SchemaKind,
};

#[test]
fn second_resolve_issues_no_query() -> Result<()> {
    let schema = StaticSchema::new(&["person"], &["knows"], &["name"]);
    let cache = SchemaCache::new("social");

    for kind in SchemaKind::ALL {
        cache.resolve(kind, 0, &schema)?;
        cache.resolve(kind, 0, &schema)?;
        assert_eq!(schema.calls(kind.procedure()), 1, "{kind} refreshed twice");
    }

    cache.clear();
    assert_eq!(cache.resolve(SchemaKind::Label, 0, &schema)?, "person");
    assert_eq!(schema.calls("db.labels"), 2);
    assert_eq!(cache.metrics().clears, 1);
    Ok(())
}

#[test]
fn concurrent_misses_collapse_into_one_refresh() -> Result<()> {
    const THREADS: usize = 8;
    let schema = StaticSchema::new(&["a", "b", "c"], &[], &[]);
    let cache = SchemaCache::new("social");
    let barrier = Barrier::new(THREADS);

    let names = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let (cache, schema, barrier) = (&cache, &schema, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    cache.resolve(SchemaKind::Label, i % 3, schema)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("resolver thread panicked"))
            .collect::<Result<Vec<_>>>()
    })?;

    for (i, name) in names.iter().enumerate() {
        assert_eq!(name, ["a", "b", "c"][i % 3]);
    }
    assert_eq!(schema.calls("db.labels"), 1);
    assert_eq!(cache.metrics().refreshes, 1);
    Ok(())
}

/// Blocks the label refresh until released, leaving other lists free.
struct GatedSchema {
    inner: StaticSchema,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl MetadataSource for GatedSchema {
    fn call_procedure(&self, procedure: &str) -> Result<ResultSet> {
        if procedure == SchemaKind::Label.procedure() {
            self.entered
                .lock()
                .send(())
                .map_err(|e| GraphError::Transport(e.to_string()))?;
            self.release
                .lock()
                .recv()
                .map_err(|e| GraphError::Transport(e.to_string()))?;
        }
        self.inner.call_procedure(procedure)
    }
}

#[test]
fn refresh_on_one_list_does_not_block_another() -> Result<()> {
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let source = GatedSchema {
        inner: StaticSchema::new(&["person"], &["knows"], &["name"]),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let cache = SchemaCache::new("social");

    thread::scope(|scope| -> Result<()> {
        let labels = scope.spawn(|| cache.resolve(SchemaKind::Label, 0, &source));
        entered_rx
            .recv()
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        assert_eq!(cache.resolve(SchemaKind::PropertyKey, 0, &source)?, "name");
        assert_eq!(
            cache.resolve(SchemaKind::RelationshipType, 0, &source)?,
            "knows"
        );
        assert_eq!(cache.len(SchemaKind::Label), 0);

        release_tx
            .send(())
            .map_err(|e| GraphError::Transport(e.to_string()))?;
        let label = labels.join().expect("label thread panicked")?;
        assert_eq!(label, "person");
        Ok(())
    })?;

    assert_eq!(cache.len(SchemaKind::Label), 1);
    Ok(())
}

#[test]
fn clear_waits_for_in_flight_refresh() -> Result<()> {
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let source = GatedSchema {
        inner: StaticSchema::new(&["person"], &[], &[]),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let cache = SchemaCache::new("social");
    let cleared = AtomicBool::new(false);

    thread::scope(|scope| -> Result<()> {
        let labels = scope.spawn(|| cache.resolve(SchemaKind::Label, 0, &source));
        entered_rx
            .recv()
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        let clearer = scope.spawn(|| {
            cache.clear();
            cleared.store(true, Ordering::SeqCst);
        });
        thread::sleep(Duration::from_millis(50));
        assert!(
            !cleared.load(Ordering::SeqCst),
            "clear ran while the label refresh held the list"
        );

        release_tx
            .send(())
            .map_err(|e| GraphError::Transport(e.to_string()))?;
        let label = labels.join().expect("label thread panicked")?;
        assert_eq!(label, "person");
        clearer.join().expect("clear thread panicked");
        Ok(())
    })?;

    assert!(cleared.load(Ordering::SeqCst));
    assert_eq!(cache.len(SchemaKind::Label), 0);
    assert_eq!(cache.metrics().clears, 1);
    Ok(())
}

#[test]
fn names_added_after_first_refresh_are_picked_up() -> Result<()> {
    let schema = StaticSchema::new(&["a"], &[], &["k"]);
    let cache = SchemaCache::new("social");
    assert_eq!(cache.resolve(SchemaKind::PropertyKey, 0, &schema)?, "k");

    schema.push(SchemaKind::PropertyKey, "k2");
    schema.push(SchemaKind::PropertyKey, "k3");
    assert_eq!(cache.resolve(SchemaKind::PropertyKey, 2, &schema)?, "k3");
    assert_eq!(cache.resolve(SchemaKind::PropertyKey, 1, &schema)?, "k2");
    assert_eq!(schema.calls("db.propertyKeys"), 2);

    let metrics = cache.metrics();
    assert_eq!(metrics.resolve_calls, 3);
    assert_eq!(metrics.resolve_hits, 1);
    assert!(metrics.hit_rate() > 0.3 && metrics.hit_rate() < 0.34);
    Ok(())
}

#[test]
fn failed_refresh_propagates_and_leaves_cache_untouched() {
    struct Broken;
    impl MetadataSource for Broken {
        fn call_procedure(&self, _: &str) -> Result<ResultSet> {
            Err(GraphError::Transport("connection reset".into()))
        }
    }

    let cache = SchemaCache::new("social");
    let err = cache.resolve(SchemaKind::Label, 0, &Broken).unwrap_err();
    assert!(matches!(err, GraphError::Transport(_)));
    assert!(cache.is_empty());
}
