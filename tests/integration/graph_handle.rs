#![allow(clippy::all)]

use std::collections::BTreeMap;
use std::sync::Arc;

use falkordb_compact::{
    testkit::{header_entry, query_reply, scalar, ScriptedTransport, StaticSchema},
    ColumnKind, Driver, GraphCommand, GraphError, GraphOptions, Node, Reply, Result, ScalarType,
    SchemaKind, Value,
};

fn node_reply(label_id: i64) -> Reply {
    query_reply(
        vec![header_entry(ColumnKind::Node, "n")],
        vec![vec![Reply::array([
            Reply::Integer(0),
            Reply::array([Reply::Integer(label_id)]),
            Reply::array([]),
        ])]],
        &["Cached execution: 0"],
    )
}

fn setup(labels: &[&str]) -> (Arc<ScriptedTransport>, Driver) {
    let transport = Arc::new(ScriptedTransport::with_schema(StaticSchema::new(
        labels,
        &[],
        &[],
    )));
    let driver = Driver::new(transport.clone());
    (transport, driver)
}

#[test]
fn query_sends_compact_flag_and_resolves_labels() -> Result<()> {
    let (transport, driver) = setup(&["person"]);
    transport.push_reply(node_reply(0));
    let graph = driver.select_graph("social")?;

    let result = graph.query("MATCH (n) RETURN n")?;
    assert_eq!(
        result.records()[0].get("n"),
        Some(&Value::Node(Node::new(0).with_label("person")))
    );

    let sent = transport.sent();
    assert_eq!(sent.len(), 2, "query plus one label refresh");
    assert_eq!(sent[0].command, GraphCommand::Query);
    assert_eq!(sent[0].args, ["social", "MATCH (n) RETURN n", "--compact"]);
    assert_eq!(sent[1].query(), Some("CALL db.labels()"));
    assert_eq!(transport.schema().calls("db.labels"), 1);
    Ok(())
}

#[test]
fn read_only_and_timeout_variants() -> Result<()> {
    let (transport, driver) = setup(&[]);
    for _ in 0..3 {
        transport.push_reply(query_reply(vec![], vec![], &[]));
    }
    let graph = driver.select_graph("social")?;
    graph.ro_query("RETURN 1")?;
    graph.ro_query_with_timeout("RETURN 1", 1000)?;
    graph.query_with_timeout("RETURN 1", 20)?;

    let sent = transport.sent_queries();
    assert_eq!(sent[0].command, GraphCommand::ReadOnlyQuery);
    assert_eq!(sent[0].args.len(), 3);
    assert_eq!(sent[1].command, GraphCommand::ReadOnlyQuery);
    assert_eq!(sent[1].args[3..], ["timeout", "1000"]);
    assert_eq!(sent[2].command, GraphCommand::Query);
    assert_eq!(sent[2].args[3..], ["timeout", "20"]);
    Ok(())
}

#[test]
fn params_are_rendered_inline() -> Result<()> {
    let (transport, driver) = setup(&[]);
    transport.push_reply(query_reply(
        vec![header_entry(ColumnKind::Scalar, "$param")],
        vec![vec![scalar(ScalarType::String, "s\"tr")]],
        &[],
    ));
    let graph = driver.select_graph("social")?;

    let mut params = BTreeMap::new();
    params.insert("param".to_string(), Value::from("s\"tr"));
    let result = graph.query_with_params("RETURN $param", &params)?;
    assert_eq!(
        result.records()[0].get_string(0).as_deref(),
        Some("s\"tr")
    );
    assert_eq!(
        transport.sent()[0].query(),
        Some(r#"CYPHER param="s\"tr" RETURN $param"#)
    );
    Ok(())
}

#[test]
fn params_and_timeout_travel_together() -> Result<()> {
    let (transport, driver) = setup(&[]);
    transport
        .push_reply(query_reply(vec![], vec![], &[]))
        .push_reply(query_reply(vec![], vec![], &[]));
    let graph = driver.select_graph("social")?;

    let mut params = BTreeMap::new();
    params.insert("age".to_string(), Value::Integer(30));
    params.insert("name".to_string(), Value::from("ann"));
    graph.query_with_params_and_timeout(
        "MATCH (p {name: $name}) SET p.age = $age",
        &params,
        250,
    )?;
    graph.ro_query_with_params_and_timeout("MATCH (p {name: $name}) RETURN p", &params, 40)?;

    let sent = transport.sent_queries();
    assert_eq!(sent[0].command, GraphCommand::Query);
    assert_eq!(
        sent[0].query(),
        Some(r#"CYPHER age=30 name="ann" MATCH (p {name: $name}) SET p.age = $age"#)
    );
    assert_eq!(sent[0].args[3..], ["timeout", "250"]);
    assert_eq!(sent[1].command, GraphCommand::ReadOnlyQuery);
    assert_eq!(
        sent[1].query(),
        Some(r#"CYPHER age=30 name="ann" MATCH (p {name: $name}) RETURN p"#)
    );
    assert_eq!(sent[1].args[3..], ["timeout", "40"]);
    Ok(())
}

#[test]
fn evaluation_error_is_reported_before_header() -> Result<()> {
    let (transport, driver) = setup(&["person"]);
    transport.push_reply(Reply::array([
        Reply::array([Reply::Integer(42), Reply::text("never parsed")]),
        Reply::Error("Type mismatch: expected Integer but was String".into()),
    ]));
    let graph = driver.select_graph("social")?;

    let err = graph.query("RETURN 1 + 'a'").unwrap_err();
    assert!(matches!(err, GraphError::Evaluation { .. }));
    assert!(err.to_string().contains("Type mismatch"));
    assert_eq!(transport.schema().calls("db.labels"), 0);
    Ok(())
}

#[test]
fn delete_clears_cache_and_next_query_refreshes() -> Result<()> {
    let (transport, driver) = setup(&["person"]);
    transport
        .push_reply(node_reply(0))
        .push_reply(Reply::Status("Graph removed, internal execution time: 0.1 milliseconds".into()))
        .push_reply(node_reply(0));
    let graph = driver.select_graph("social")?;

    graph.query("MATCH (n) RETURN n")?;
    assert_eq!(graph.cache().len(SchemaKind::Label), 1);

    let status = graph.delete()?;
    assert!(status.starts_with("Graph removed"));
    assert!(graph.cache().is_empty());

    graph.query("MATCH (n) RETURN n")?;
    assert_eq!(transport.schema().calls("db.labels"), 2);
    Ok(())
}

#[test]
fn close_clears_cache_shared_by_clones() -> Result<()> {
    let (transport, driver) = setup(&["person"]);
    transport.push_reply(node_reply(0));
    let graph = driver.select_graph("social")?;
    let clone = graph.clone();

    graph.query("MATCH (n) RETURN n")?;
    assert_eq!(clone.cache().len(SchemaKind::Label), 1);
    clone.close();
    assert!(graph.cache().is_empty());
    Ok(())
}

#[test]
fn copy_and_list_graphs() -> Result<()> {
    let (transport, driver) = setup(&[]);
    transport
        .push_reply(Reply::Status("OK".into()))
        .push_reply(Reply::array([Reply::text("social"), Reply::text("social_copy")]));
    let graph = driver.select_graph("social")?;

    assert_eq!(graph.copy("social_copy")?, "OK");
    assert_eq!(driver.list_graphs()?, ["social", "social_copy"]);

    let sent = transport.sent();
    assert_eq!(sent[0].command, GraphCommand::Copy);
    assert_eq!(sent[0].args, ["social", "social_copy"]);
    assert_eq!(sent[1].command, GraphCommand::List);
    assert!(sent[1].args.is_empty());
    Ok(())
}

#[test]
fn transport_failures_propagate() {
    let (transport, driver) = setup(&[]);
    transport.push_error(GraphError::Transport("connection refused".into()));
    let graph = driver
        .select_graph_with("social", GraphOptions::read_only())
        .expect("graph handle");
    let err = graph.query("RETURN 1").unwrap_err();
    assert_eq!(err.to_string(), "transport: connection refused");
    assert_eq!(transport.remaining(), 0);
}
