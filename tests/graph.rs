#![allow(missing_docs)]

use route_graph::{
    config::GraphConfig,
    error::RouteError,
    graph::RouteGraph,
    rule::Rule,
    types::{AnyKey, TypeKey},
    value::Value,
};

fn key(name: &'static str) -> TypeKey<u32> {
    TypeKey::named(name)
}

fn constant(dst: &TypeKey<u32>, value: u32) -> Rule {
    Rule::start(dst, move || Ok(Value::of(value)))
}

fn names(keys: &[AnyKey]) -> Vec<&str> {
    keys.iter().map(AnyKey::name).collect()
}

#[test]
fn keys_are_equal_by_name_and_type() {
    let a = TypeKey::<u32>::named("a");
    assert_eq!(a, TypeKey::<u32>::named("a"));
    assert_eq!(a.erase(), TypeKey::<u32>::named("a").erase());
    assert_ne!(a.erase(), TypeKey::<u64>::named("a").erase());
    assert_ne!(a.erase(), TypeKey::<u32>::named("b").erase());
    assert!(a.erase().is::<u32>());
    assert_eq!(TypeKey::<String>::of().name(), "String");
    assert_eq!(a.erase().to_string(), "a:u32");
}

#[test]
fn same_name_with_different_types_are_distinct_slots() {
    let as_number = TypeKey::<u32>::named("x");
    let as_text = TypeKey::<String>::named("x");
    let graph = RouteGraph::builder()
        .add(constant(&as_number, 7))
        .unwrap()
        .add(Rule::start(&as_text, || Ok(Value::of("seven".to_owned()))))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(graph.len(), 2);

    let number = graph.open(&as_number).unwrap();
    assert_eq!(*number.current(), 7);
    let text = number.open(&as_text).unwrap();
    assert_eq!(text.current(), "seven");
}

#[test]
fn duplicate_destination_is_rejected() {
    let a = key("a");
    let err = RouteGraph::builder()
        .add(constant(&a, 1))
        .unwrap()
        .add(constant(&a, 2))
        .unwrap_err();
    match err {
        RouteError::DuplicateDestination(dst) => assert_eq!(dst, a.erase()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn eager_validation_rejects_dangling_source() {
    let (a, b) = (key("a"), key("b"));
    let err = RouteGraph::builder()
        .add(Rule::bridge(&a, &b, |a| Ok(Value::of(*a))).labeled("copy"))
        .unwrap()
        .build()
        .unwrap_err();
    match err {
        RouteError::MissingSource { rule, missing } => {
            assert_eq!(rule, "copy");
            assert_eq!(missing, a.erase());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn lazy_validation_defers_dangling_source_to_resolution() {
    let (a, b, c) = (key("a"), key("b"), key("c"));
    let graph = RouteGraph::builder_with(GraphConfig::lazy())
        .add(Rule::bridge(&a, &b, |a| Ok(Value::of(*a))))
        .unwrap()
        .add(constant(&c, 3))
        .unwrap()
        .build()
        .unwrap();

    // Unaffected slots stay resolvable.
    assert_eq!(*graph.open(&c).unwrap().current(), 3);
    match graph.open(&b).unwrap_err() {
        RouteError::NoRouteFor(missing) => assert_eq!(missing, a.erase()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn root_rule_is_resolvable_alone() {
    let a = key("a");
    let graph = RouteGraph::builder()
        .add(constant(&a, 42))
        .unwrap()
        .build()
        .unwrap();
    let root = graph.open(&a).unwrap();
    assert_eq!(*root.current(), 42);
    assert_eq!(names(&root.owned_keys().cloned().collect::<Vec<_>>()), ["a"]);
    root.close().unwrap();
}

#[test]
fn plan_follows_depth_first_declaration_order() {
    // Graph:
    //   a   b
    //    \ / \
    //     c   d
    //      \ /
    //       e
    let (a, b, c, d, e) = (key("a"), key("b"), key("c"), key("d"), key("e"));
    let graph = RouteGraph::builder()
        .add(Rule::merge(&c, &d, &e, |c, d| Ok(Value::of(c + d))))
        .unwrap()
        .add(Rule::bridge(&b, &d, |b| Ok(Value::of(b * 10))))
        .unwrap()
        .add(Rule::merge(&a, &b, &c, |a, b| Ok(Value::of(a + b))))
        .unwrap()
        .add(constant(&b, 2))
        .unwrap()
        .add(constant(&a, 1))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(names(&graph.plan(&e).unwrap()), ["a", "b", "c", "d", "e"]);
    assert_eq!(names(&graph.plan(&d).unwrap()), ["b", "d"]);
}

#[test]
fn plan_reports_cycles_without_invoking_rules() {
    let (a, b) = (key("a"), key("b"));
    let graph = RouteGraph::builder()
        .add(Rule::bridge(&a, &b, |_| panic!("must not run")))
        .unwrap()
        .add(Rule::bridge(&b, &a, |_| panic!("must not run")))
        .unwrap()
        .build()
        .unwrap();
    assert!(matches!(
        graph.plan(&b),
        Err(RouteError::CyclicRoute { .. })
    ));
}

#[test]
fn dot_output_lists_slots_and_edges() {
    let (a, b) = (key("a"), key("b"));
    let graph = RouteGraph::builder()
        .add(constant(&a, 1))
        .unwrap()
        .add(Rule::bridge(&a, &b, |a| Ok(Value::of(*a))).labeled("copy"))
        .unwrap()
        .build()
        .unwrap();

    let dot = graph.to_dot();
    assert!(dot.starts_with("digraph routes {"));
    assert!(dot.contains("\"a:u32\"[shape=rectangle"));
    assert!(dot.contains("\"a:u32\" -> \"b:u32\"[label=\"copy\"];"));
    assert!(dot.contains("\"start\" -> \"a:u32\""));
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn rule_introspection() {
    let (a, b, c) = (key("a"), key("b"), key("c"));
    let rule = Rule::merge(&a, &b, &c, |a, b| Ok(Value::of(a + b)));
    assert_eq!(rule.sources(), [a.erase(), b.erase()]);
    assert_eq!(rule.destination(), &c.erase());
    assert!(!rule.is_start());
    assert_eq!(rule.label(), "merge(a:u32, b:u32 -> c:u32)");
    assert!(constant(&a, 0).is_start());
}
