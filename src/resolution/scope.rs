use crate::{
    error::{ReleaseFailure, ReleaseFailures, RouteError},
    graph::{RouteGraph, Visitor},
    rule::Rule,
    types::{AnyKey, IndexMap},
    value::Slot,
};
use core::any::Any;
use derive_more::Debug;
use log::{debug, error};

/// One level of the cache chain.
///
/// Owns every slot it computed; reads ancestors' slots by reference. Slots are
/// kept in insertion order and released newest first.
#[derive(Debug)]
pub(crate) struct Scope<'a> {
    #[debug(skip)]
    graph: &'a RouteGraph,
    parent: Option<&'a Scope<'a>>,
    owned: IndexMap<AnyKey, Slot>,
    depth: usize,
}

impl<'a> Scope<'a> {
    pub(crate) fn root(graph: &'a RouteGraph) -> Self {
        Self {
            graph,
            parent: None,
            owned: IndexMap::default(),
            depth: 0,
        }
    }

    pub(crate) fn child(parent: &'a Scope<'a>) -> Self {
        Self {
            graph: parent.graph,
            parent: Some(parent),
            owned: IndexMap::default(),
            depth: parent.depth + 1,
        }
    }

    /// Nearest slot for `key`, this scope first, then up the parent chain.
    pub(crate) fn lookup(&self, key: &AnyKey) -> Option<&Slot> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(slot) = current.owned.get(key) {
                return Some(slot);
            }
            scope = current.parent;
        }
        None
    }

    /// Compute `target` and every missing ancestor into this scope.
    pub(crate) fn resolve(&mut self, target: &AnyKey) -> Result<(), RouteError> {
        let graph = self.graph;
        graph.walk(target, self)
    }

    pub(crate) fn owned_keys(&self) -> impl Iterator<Item = &AnyKey> {
        self.owned.keys()
    }

    /// Release every owned slot, newest first, without stopping at failures.
    pub(crate) fn release(&mut self) -> ReleaseFailures {
        let mut failures = ReleaseFailures::default();
        while let Some((key, slot)) = self.owned.pop() {
            debug!("scope {}: releasing {key}", self.depth);
            if let Err(source) = slot.release() {
                failures.0.push(ReleaseFailure { key, source });
            }
        }
        failures
    }
}

impl Visitor for Scope<'_> {
    fn is_done(&self, key: &AnyKey) -> bool {
        self.lookup(key).is_some()
    }

    fn visit(&mut self, rule: &Rule) -> Result<(), RouteError> {
        let slot = {
            let payloads = rule
                .sources()
                .iter()
                .map(|source| {
                    self.lookup(source)
                        .map(Slot::payload)
                        .ok_or_else(|| RouteError::NoRouteFor(source.clone()))
                })
                .collect::<Result<Vec<&(dyn Any + 'static)>, _>>()?;
            debug!("scope {}: evaluating `{}`", self.depth, rule.label());
            rule.produce(&payloads)?
        };
        let replaced = self.owned.insert(rule.destination().clone(), slot);
        assert!(replaced.is_none(), "Scope::visit: [1]");
        Ok(())
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        for failure in self.release() {
            error!(
                "scope {}: {failure}: {}",
                self.depth, failure.source
            );
        }
    }
}
