#![allow(clippy::all)]

use falkordb_compact::{
    decode,
    testkit::{header_entry, query_reply, scalar, StaticSchema},
    ColumnKind, Edge, Node, Path, Point, Reply, Result, ScalarType, SchemaCache, Value,
};

fn prop(key: i64, tag: ScalarType, payload: Reply) -> Reply {
    Reply::array([Reply::Integer(key), Reply::Integer(tag.ordinal()), payload])
}

fn node_payload(id: i64, labels: &[i64], props: Vec<Reply>) -> Reply {
    Reply::array([
        Reply::Integer(id),
        Reply::array(labels.iter().copied().map(Reply::Integer)),
        Reply::Array(props),
    ])
}

fn edge_payload(id: i64, rel: i64, src: i64, dst: i64) -> Reply {
    Reply::array([
        Reply::Integer(id),
        Reply::Integer(rel),
        Reply::Integer(src),
        Reply::Integer(dst),
        Reply::array([]),
    ])
}

#[test]
fn simple_scalar_query() -> Result<()> {
    let schema = StaticSchema::new(&[], &[], &[]);
    let cache = SchemaCache::new("social");
    let raw = query_reply(
        vec![header_entry(ColumnKind::Scalar, "x")],
        vec![vec![scalar(ScalarType::Integer, 1i64)]],
        &["Query internal execution time: 0.1 milliseconds"],
    );

    let result = decode(raw, &cache, &schema)?;
    assert_eq!(result.header().schema_names(), ["x"]);
    assert_eq!(result.header().schema_types(), [ColumnKind::Scalar]);
    assert_eq!(result.len(), 1);
    assert_eq!(result.records()[0].get("x"), Some(&Value::Integer(1)));
    assert!((result.statistics().query_internal_execution_time() - 0.1).abs() < 1e-9);
    assert!(cache.is_empty(), "scalars never touch the schema cache");
    Ok(())
}

#[test]
fn node_with_two_labels_and_properties() -> Result<()> {
    let schema = StaticSchema::new(&["person", "worker"], &[], &["name", "age", "doubleValue", "boolValue"]);
    let cache = SchemaCache::new("social");
    let raw = query_reply(
        vec![header_entry(ColumnKind::Node, "a")],
        vec![vec![node_payload(
            0,
            &[0, 1],
            vec![
                prop(0, ScalarType::String, Reply::text("roi")),
                prop(1, ScalarType::Integer, Reply::Integer(32)),
                prop(2, ScalarType::Double, Reply::text("3.14")),
                prop(3, ScalarType::Boolean, Reply::text("true")),
            ],
        )]],
        &["Cached execution: 1"],
    );

    let result = decode(raw, &cache, &schema)?;
    let node = result.records()[0].get("a").and_then(Value::as_node).cloned();
    let expected = Node::new(0)
        .with_label("worker")
        .with_label("person")
        .with_property("name", "roi")
        .with_property("age", 32i64)
        .with_property("doubleValue", 3.14)
        .with_property("boolValue", true);
    assert_eq!(node, Some(expected));
    assert!(result.statistics().cached_execution());
    assert_eq!(schema.calls("db.labels"), 1);
    assert_eq!(schema.calls("db.propertyKeys"), 1);
    assert_eq!(schema.calls("db.relationshipTypes"), 0);
    Ok(())
}

#[test]
fn relation_and_path_columns() -> Result<()> {
    let schema = StaticSchema::new(&["L"], &["R"], &[]);
    let cache = SchemaCache::new("social");
    let path = scalar(
        ScalarType::Path,
        Reply::array([
            scalar(
                ScalarType::Array,
                Reply::array([
                    scalar(ScalarType::Node, node_payload(0, &[0], vec![])),
                    scalar(ScalarType::Node, node_payload(1, &[0], vec![])),
                ]),
            ),
            scalar(
                ScalarType::Array,
                Reply::array([scalar(ScalarType::Edge, edge_payload(5, 0, 0, 1))]),
            ),
        ]),
    );
    let raw = query_reply(
        vec![
            header_entry(ColumnKind::Relation, "r"),
            header_entry(ColumnKind::Scalar, "p"),
        ],
        vec![vec![edge_payload(5, 0, 0, 1), path]],
        &[],
    );

    let result = decode(raw, &cache, &schema)?;
    let record = &result.records()[0];
    let edge = Edge::new(5, "R", 0, 1);
    assert_eq!(record.get("r"), Some(&Value::Edge(edge.clone())));

    let expected = Path::builder()
        .node(Node::new(0).with_label("L"))?
        .edge(edge)?
        .node(Node::new(1).with_label("L"))?
        .build()?;
    assert_eq!(record.get(1), Some(&Value::Path(expected)));
    Ok(())
}

#[test]
fn error_payload_is_surfaced_verbatim() {
    let schema = StaticSchema::new(&["person"], &[], &[]);
    let cache = SchemaCache::new("social");
    let raw = Reply::array([
        Reply::array([Reply::Integer(77), Reply::text("broken header")]),
        Reply::array([]),
        Reply::Error("Type mismatch: expected String but was Integer".into()),
    ]);

    let err = decode(raw, &cache, &schema).unwrap_err();
    assert!(err.is_evaluation());
    assert!(err
        .to_string()
        .contains("Type mismatch: expected String but was Integer"));
    assert_eq!(schema.calls("db.labels"), 0);
}

#[test]
fn top_level_error_reply() {
    let schema = StaticSchema::new(&[], &[], &[]);
    let cache = SchemaCache::new("social");
    let err = decode(Reply::Error("Query timed out".into()), &cache, &schema).unwrap_err();
    assert_eq!(err.to_string(), "Query timed out");
}

#[test]
fn write_only_reply_carries_statistics() -> Result<()> {
    let schema = StaticSchema::new(&[], &[], &[]);
    let cache = SchemaCache::new("social");
    let raw = Reply::array([Reply::array([
        Reply::text("Labels added: 1"),
        Reply::text("Nodes created: 1"),
        Reply::text("Properties set: 2"),
    ])]);

    let result = decode(raw, &cache, &schema)?;
    assert!(result.is_empty());
    assert!(result.header().is_empty());
    let stats = result.statistics();
    assert_eq!(stats.labels_added(), 1);
    assert_eq!(stats.nodes_created(), 1);
    assert_eq!(stats.properties_set(), 2);
    assert_eq!(stats.nodes_deleted(), 0);
    assert_eq!(stats.get_raw("Nodes deleted"), None);
    Ok(())
}

#[test]
fn corrupt_replies_are_protocol_errors() {
    let schema = StaticSchema::new(&[], &[], &[]);
    let cache = SchemaCache::new("social");

    let bad_tag = query_reply(
        vec![header_entry(ColumnKind::Scalar, "x")],
        vec![vec![Reply::array([Reply::Integer(16), Reply::Nil])]],
        &[],
    );
    assert!(decode(bad_tag, &cache, &schema).unwrap_err().is_protocol());

    let bad_kind = query_reply(
        vec![Reply::array([Reply::Integer(9), Reply::text("x")])],
        vec![],
        &[],
    );
    assert!(decode(bad_kind, &cache, &schema).unwrap_err().is_protocol());

    let short_point = query_reply(
        vec![header_entry(ColumnKind::Scalar, "p")],
        vec![vec![scalar(ScalarType::Point, Reply::array([Reply::text("1.0")]))]],
        &[],
    );
    assert!(decode(short_point, &cache, &schema).unwrap_err().is_protocol());
}

#[test]
fn points_compare_within_epsilon() -> Result<()> {
    let schema = StaticSchema::new(&[], &[], &[]);
    let cache = SchemaCache::new("social");
    let raw = query_reply(
        vec![header_entry(ColumnKind::Scalar, "p")],
        vec![vec![scalar(
            ScalarType::Point,
            Reply::array([Reply::text("32.070794860"), Reply::text("34.820751118")]),
        )]],
        &[],
    );
    let result = decode(raw, &cache, &schema)?;
    assert_eq!(
        result.records()[0].get("p"),
        Some(&Value::Point(Point::new(32.0707949, 34.8207511)))
    );
    Ok(())
}
