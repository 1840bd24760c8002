//! End-to-end compilation of SELECT/MATCH statements into join pipelines.

use docgraph::compile_query;
use docgraph::config::{CompilerConfig, ComponentMode, CrossPredicatePolicy};
use docgraph::graph_catalog::CatalogConfig;
use docgraph::query_planner::{BindingError, CompiledQuery, PatternGraphError, QueryPlannerError};
use serde_json::json;
use std::sync::Arc;

fn people() -> CatalogConfig {
    CatalogConfig::default()
        .with_table("Person", &["name", "age", "city"], &["knows", "follows"])
        .with_table("Company", &["name", "founded"], &["employs"])
}

const KNOWS_QUERY: &str = "SELECT a.name, b.name FROM Person a, Person b \
                           MATCH a-[knows AS e]->b \
                           WHERE a.age > 20 AND e.since > 2010";

#[test]
fn test_single_hop_end_to_end() {
    let compiled = compile_query(KNOWS_QUERY, &people(), &CompilerConfig::default()).unwrap();
    assert!(compiled.residual_predicates.is_empty());
    assert_eq!(compiled.plans.len(), 1);

    let plan = compiled.main_plan().unwrap();
    assert_eq!(plan.component, "main");
    assert_eq!(
        plan.header.columns(),
        ["a", "a_ADJ", "a_SEG", "b", "b_ADJ", "b_SEG", "a.name", "b.name"]
    );

    let a_segment = r#"SELECT {"id":a.id, "edge":a._edge, "reverse":a._reverse_edge} AS NodeInfo, a.name AS a_name FROM a WHERE a.age > 20"#;
    let b_segment = r#"SELECT {"id":b.id, "edge":b._edge, "reverse":b._reverse_edge} AS NodeInfo, b.name AS b_name FROM b JOIN e IN b._reverse_edge WHERE (e.since > 2010)"#;
    assert_eq!(
        plan.segments,
        vec![
            ("a".to_string(), a_segment.to_string()),
            ("b".to_string(), b_segment.to_string()),
        ]
    );

    let slots = plan.record_zero.slots();
    assert_eq!(slots.len(), 8);
    assert_eq!(slots[2].as_deref(), Some(a_segment));
    assert_eq!(slots[5].as_deref(), Some(b_segment));
    assert_eq!(slots.iter().filter(|s| s.is_some()).count(), 2);

    let stages = plan.root.stages_in_order();
    assert_eq!(stages.len(), 2);
    assert_eq!((stages[0].source_alias.as_str(), stages[0].sink_alias.as_str()), ("", "a"));
    assert_eq!((stages[1].source_alias.as_str(), stages[1].sink_alias.as_str()), ("a", "b"));
    assert_eq!(stages[1].traversal.as_ref().unwrap().edge_alias, "e");
    for stage in &stages {
        assert_eq!(stage.start_of_result_index, 6);
        assert_eq!(stage.input_batch_size, 50);
        assert_eq!(stage.output_batch_size, 100);
        assert_eq!(stage.header.columns(), plan.header.columns());
    }
}

#[test]
fn test_aliases_are_case_insensitive() {
    let compiled = compile_query(
        "SELECT A.name FROM Person a, Person B MATCH a-[knows AS E]->b WHERE A.age > 20 AND e.since > 2010",
        &people(),
        &CompilerConfig::default(),
    )
    .unwrap();
    let plan = compiled.main_plan().unwrap();

    assert_eq!(plan.header.node_count(), 2);
    assert_eq!(
        plan.header.columns(),
        ["a", "a_ADJ", "a_SEG", "B", "B_ADJ", "B_SEG", "a.name"]
    );
    assert!(plan.segments[0].1.ends_with("FROM a WHERE a.age > 20"));
    assert!(plan.segments[1].1.ends_with("FROM B JOIN E IN B._reverse_edge WHERE (E.since > 2010)"));
}

#[test]
fn test_cross_alias_predicates_follow_policy() {
    let query = "SELECT * FROM Person a, Person b MATCH a-[knows]->b WHERE a.age > b.age AND b.city = 'Oslo'";

    let compiled = compile_query(query, &people(), &CompilerConfig::default()).unwrap();
    assert_eq!(compiled.residual_predicates.len(), 1);
    assert_eq!(compiled.residual_predicates[0].to_string(), "a.age > b.age");
    let segments = &compiled.main_plan().unwrap().segments;
    assert!(!segments[0].1.contains("WHERE"));
    assert!(segments[1].1.ends_with("WHERE b.city = 'Oslo'"));

    let reject = CompilerConfig {
        cross_predicate_policy: CrossPredicatePolicy::Reject,
        ..Default::default()
    };
    let err = compile_query(query, &people(), &reject).unwrap_err();
    assert!(matches!(
        err,
        QueryPlannerError::Binding(BindingError::CrossAliasPredicate { .. })
    ));
}

#[test]
fn test_connected_mode_compiles_one_plan_per_component() {
    let config = CompilerConfig {
        component_mode: ComponentMode::Connected,
        ..Default::default()
    };
    let compiled = compile_query(
        "SELECT a.name, c.name FROM Person a, Company c MATCH a-[knows]->b, c-[employs]->d",
        &people(),
        &config,
    )
    .unwrap();

    assert_eq!(compiled.plans.len(), 2);
    let first = &compiled.plans[0];
    let second = &compiled.plans[1];
    assert_eq!(first.header.columns(), ["a", "a_ADJ", "a_SEG", "b", "b_ADJ", "b_SEG", "a.name"]);
    assert_eq!(second.header.columns(), ["c", "c_ADJ", "c_SEG", "d", "d_ADJ", "d_SEG", "c.name"]);
    assert_eq!(first.root.len(), 2);
    assert_eq!(second.root.len(), 2);
    assert_eq!(second.root.stages_in_order()[0].sink_alias, "c");
}

#[test]
fn test_collapsed_mode_bridges_disconnected_paths() {
    let compiled = compile_query(
        "SELECT * FROM Person a, Company c MATCH a-[knows]->b, c-[employs]->d",
        &people(),
        &CompilerConfig::default(),
    )
    .unwrap();
    let plan = compiled.main_plan().unwrap();
    let hops: Vec<_> = plan
        .root
        .stages_in_order()
        .iter()
        .map(|s| format!("{}->{}", s.source_alias, s.sink_alias))
        .collect();
    // FROM aliases are discovered first: a, c, then b, d
    assert_eq!(hops, vec!["->a", "a->b", "b->c", "c->d"]);
}

#[test]
fn test_structural_errors_abort_compile() {
    let config = CompilerConfig::default();

    let err = compile_query("SELECT * FROM Person a MATCH a-[likes]->b", &people(), &config)
        .unwrap_err();
    assert_eq!(
        err,
        QueryPlannerError::PatternGraph(PatternGraphError::UnknownEdgeColumn {
            table: "Person".to_string(),
            column: "likes".to_string(),
        })
    );

    let err = compile_query("SELECT * FROM Person a MATCH a-[knows*0..2]->b", &people(), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        QueryPlannerError::PatternGraph(PatternGraphError::InvalidHopRange { min: 0, max: 2, .. })
    ));

    let err = compile_query("SELECT * FROM Person a WHERE", &people(), &config).unwrap_err();
    assert!(matches!(err, QueryPlannerError::Parse(_)));

    let err = compile_query("SELECT a.name FROM Person a, Person a_ADJ", &people(), &config)
        .unwrap_err();
    assert!(matches!(
        err,
        QueryPlannerError::PatternGraph(PatternGraphError::HeaderCollision { .. })
    ));
}

#[test]
fn test_variable_length_edge_carries_bounds_and_constraints() {
    let compiled = compile_query(
        "SELECT * FROM Person a MATCH a-[follows*1..3 AS p {verified: true}]->b",
        &people(),
        &CompilerConfig::default(),
    )
    .unwrap();
    let root = &compiled.main_plan().unwrap().root;
    let traversal = root.traversal.as_ref().unwrap();
    assert_eq!((traversal.min_hops, traversal.max_hops), (1, 3));
    assert_eq!(traversal.edge_column, "follows");
    assert_eq!(traversal.attribute_constraints.len(), 1);
    assert_eq!(traversal.attribute_constraints[0].0, "verified");
}

#[test]
fn test_plan_serializes_to_json() {
    let compiled = compile_query(KNOWS_QUERY, &people(), &CompilerConfig::default()).unwrap();
    let value = serde_json::to_value(&compiled).unwrap();

    let plan = &value["plans"][0];
    assert_eq!(
        plan["header"]["columns"],
        json!(["a", "a_ADJ", "a_SEG", "b", "b_ADJ", "b_SEG", "a.name", "b.name"])
    );
    assert_eq!(plan["root"]["sink_alias"], json!("b"));
    assert_eq!(plan["root"]["traversal"]["edge_alias"], json!("e"));
    assert_eq!(plan["root"]["predecessor"]["sink_alias"], json!("a"));
    assert!(plan["root"].get("header").is_none());
    assert!(plan["root"]["predecessor"].get("predecessor").is_none());
    assert_eq!(value["residual_predicates"], json!([]));
}

#[test]
fn test_deserialized_plan_stages_share_plan_header() {
    let compiled = compile_query(KNOWS_QUERY, &people(), &CompilerConfig::default()).unwrap();
    let json = serde_json::to_string(&compiled).unwrap();
    let restored: CompiledQuery = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, compiled);
    let plan = restored.main_plan().unwrap();
    assert_eq!(plan.root.len(), 2);
    assert!(plan
        .root
        .iter()
        .all(|stage| Arc::ptr_eq(&stage.header, &plan.header)));
}
