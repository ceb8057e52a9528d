#![allow(missing_docs)]

use route_graph::{
    error::{Failure, RouteError},
    graph::RouteGraph,
    rule::Rule,
    types::TypeKey,
    value::Value,
};
use std::{cell::RefCell, rc::Rc};

/// Records release actions in the order they run.
#[derive(Debug, Clone, Default)]
struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

fn key(name: &'static str) -> TypeKey<String> {
    TypeKey::named(name)
}

/// Value named after its slot, journaled on release.
fn resource(journal: &Journal, name: &str) -> Value<String> {
    let journal = journal.clone();
    Value::with_release(name.to_owned(), move |name| {
        journal.record(name);
        Ok(())
    })
}

/// Value whose release fails after being journaled.
fn broken(journal: &Journal, name: &str) -> Value<String> {
    let journal = journal.clone();
    Value::with_release(name.to_owned(), move |name| {
        journal.record(name.clone());
        Err(Failure::new(format!("cannot release {name}")))
    })
}

fn start(journal: &Journal, dst: &TypeKey<String>) -> Rule {
    let (journal, name) = (journal.clone(), dst.name().to_owned());
    Rule::start(dst, move || Ok(resource(&journal, &name)))
}

fn bridge(journal: &Journal, src: &TypeKey<String>, dst: &TypeKey<String>) -> Rule {
    let (journal, name) = (journal.clone(), dst.name().to_owned());
    Rule::bridge(src, dst, move |_| Ok(resource(&journal, &name)))
}

#[test]
fn close_releases_in_reverse_creation_order() {
    let journal = Journal::default();
    let (a, b, c) = (key("a"), key("b"), key("c"));
    let graph = RouteGraph::builder()
        .add(start(&journal, &a))
        .unwrap()
        .add(bridge(&journal, &a, &b))
        .unwrap()
        .add(bridge(&journal, &b, &c))
        .unwrap()
        .build()
        .unwrap();

    let root = graph.open(&c).unwrap();
    assert!(journal.entries().is_empty());
    root.close().unwrap();
    assert_eq!(journal.entries(), ["c", "b", "a"]);
}

#[test]
fn child_close_leaves_inherited_values_alone() {
    let journal = Journal::default();
    let (store, path, file) = (key("store"), key("path"), key("file"));
    let graph = RouteGraph::builder()
        .add(start(&journal, &store))
        .unwrap()
        .add(bridge(&journal, &store, &path))
        .unwrap()
        .add(bridge(&journal, &path, &file))
        .unwrap()
        .build()
        .unwrap();

    let root = graph.open(&store).unwrap();
    let child = root.open(&file).unwrap();
    assert_eq!(child.current(), "file");
    child.close().unwrap();
    assert_eq!(journal.entries(), ["file", "path"]);

    let again = root.open(&file).unwrap();
    again.close().unwrap();
    assert_eq!(journal.entries(), ["file", "path", "file", "path"]);

    root.close().unwrap();
    assert_eq!(journal.entries(), ["file", "path", "file", "path", "store"]);
}

#[test]
fn all_releases_run_and_every_failure_is_reported() {
    let journal = Journal::default();
    let (a, b, c) = (key("a"), key("b"), key("c"));
    let (ja, jb) = (journal.clone(), journal.clone());
    let graph = RouteGraph::builder()
        .add(Rule::start(&a, move || Ok(broken(&ja, "a"))))
        .unwrap()
        .add(bridge(&journal, &a, &b))
        .unwrap()
        .add(Rule::bridge(&b, &c, move |_| Ok(broken(&jb, "c"))))
        .unwrap()
        .build()
        .unwrap();

    let root = graph.open(&c).unwrap();
    let err = root.close().unwrap_err();
    assert_eq!(journal.entries(), ["c", "b", "a"]);

    let RouteError::ReleaseFailed(failures) = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(failures.len(), 2);
    let keys: Vec<_> = failures.failures().iter().map(|f| f.key.name()).collect();
    assert_eq!(keys, ["c", "a"]);
    assert_eq!(failures.failures()[0].source.to_string(), "cannot release c");
    assert!(err.to_string().starts_with("2 release(s) failed"));

    // err -> failures -> first failure -> Failure -> original cause
    let failures = std::error::Error::source(&err).unwrap();
    let first = failures.source().unwrap();
    assert_eq!(first.to_string(), "release of c:String failed");
    let failure = first.source().unwrap();
    assert_eq!(failure.to_string(), "cannot release c");
    assert_eq!(failure.source().unwrap().to_string(), "cannot release c");
}

#[test]
fn drop_releases_like_close() {
    let journal = Journal::default();
    let (a, b) = (key("a"), key("b"));
    let graph = RouteGraph::builder()
        .add(start(&journal, &a))
        .unwrap()
        .add(bridge(&journal, &a, &b))
        .unwrap()
        .build()
        .unwrap();

    let use_and_bail = || -> Result<(), RouteError> {
        let root = graph.open(&a)?;
        let _child = root.open(&b)?;
        Err(RouteError::NoRouteFor(key("bail").erase()))
    };
    assert!(use_and_bail().is_err());
    assert_eq!(journal.entries(), ["b", "a"]);
}

#[test]
fn failed_open_releases_partial_results() {
    let journal = Journal::default();
    let (a, b, c, d) = (key("a"), key("b"), key("c"), key("d"));
    let graph = RouteGraph::builder()
        .add(start(&journal, &a))
        .unwrap()
        .add(start(&journal, &b))
        .unwrap()
        .add(Rule::start(&c, || Err(Failure::new("no c today"))))
        .unwrap()
        .add(Rule::join([a.erase(), b.erase(), c.erase()], &d, |_| {
            Ok(Value::of(String::new()))
        }))
        .unwrap()
        .build()
        .unwrap();

    let root = graph.open(&a).unwrap();
    let err = root.open(&d).unwrap_err();
    assert!(matches!(
        &err,
        RouteError::ResolutionFailure { destination, .. } if *destination == c.erase()
    ));
    // `b` was computed by the failed child and released with it; `a` belongs
    // to the root.
    assert_eq!(journal.entries(), ["b"]);
    root.close().unwrap();
    assert_eq!(journal.entries(), ["b", "a"]);
}

#[test]
fn inert_values_need_no_release() {
    let a = TypeKey::<u8>::named("a");
    let graph = RouteGraph::builder()
        .add(Rule::start(&a, || Ok(Value::of(1))))
        .unwrap()
        .build()
        .unwrap();
    let root = graph.open(&a).unwrap();
    assert_eq!(root.owned_keys().count(), 1);
    root.close().unwrap();

    let value = Value::with_release(5u8, |_| Ok(()));
    assert!(value.has_release());
    assert_eq!(*value.payload(), 5);
    assert!(!Value::of(5u8).has_release());
}
