mod build;
mod dot;

pub use crate::graph::build::GraphBuilder;
use crate::{
    config::GraphConfig,
    error::RouteError,
    resolution::Resolution,
    rule::Rule,
    types::{AnyKey, IndexMap, IndexSet, TypeKey},
};
use log::trace;

/// Immutable, validated set of rules, at most one per destination.
///
/// Built once through [`GraphBuilder`], then used to open any number of
/// [`Resolution`]s. The graph itself holds no computed values.
///
/// Cycles are not rejected at build time: a cycle that is reachable from a
/// requested target fails that resolution with [`RouteError::CyclicRoute`].
#[must_use]
#[derive(Debug)]
pub struct RouteGraph {
    rules: IndexMap<AnyKey, Rule>,
}

/// Callbacks of the depth-first walk shared by resolution and planning.
pub(crate) trait Visitor {
    /// `true` if the slot needs no rule invocation (already computed).
    fn is_done(&self, key: &AnyKey) -> bool;
    /// Invoked once all of `rule`'s sources are done.
    fn visit(&mut self, rule: &Rule) -> Result<(), RouteError>;
}

impl RouteGraph {
    /// Builder with eager source validation.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new(GraphConfig::default())
    }

    /// Builder with an explicit configuration.
    pub fn builder_with(config: GraphConfig) -> GraphBuilder {
        GraphBuilder::new(config)
    }

    /// Open a root resolution for `target`.
    ///
    /// Every value computed on the way is owned by the returned resolution
    /// and released when it is closed or dropped.
    ///
    /// # Errors
    /// - [`RouteError::NoRouteFor`] if `target` or one of its transitive
    ///   sources has no rule.
    /// - [`RouteError::CyclicRoute`] if `target` depends on itself.
    /// - [`RouteError::ResolutionFailure`] if a rule fails.
    pub fn open<T: 'static>(&self, target: &TypeKey<T>) -> Result<Resolution<'_, T>, RouteError> {
        Resolution::root(self, target)
    }

    /// Evaluation order the resolver would follow for `target` from an empty
    /// cache, without invoking any rule.
    ///
    /// # Errors
    /// Same structural errors as [`RouteGraph::open`].
    pub fn plan<T: 'static>(&self, target: &TypeKey<T>) -> Result<Vec<AnyKey>, RouteError> {
        struct Plan(IndexSet<AnyKey>);

        impl Visitor for Plan {
            fn is_done(&self, key: &AnyKey) -> bool {
                self.0.contains(key)
            }

            fn visit(&mut self, rule: &Rule) -> Result<(), RouteError> {
                self.0.insert(rule.destination().clone());
                Ok(())
            }
        }

        let mut plan = Plan(IndexSet::default());
        self.walk(&target.erase(), &mut plan)?;
        Ok(plan.0.into_iter().collect())
    }

    /// The rule producing `key`, if any.
    #[must_use]
    pub fn rule_for(&self, key: &AnyKey) -> Option<&Rule> {
        self.rules.get(key)
    }

    /// Every producible slot, in registration order.
    pub fn destinations(&self) -> impl Iterator<Item = &AnyKey> {
        self.rules.keys()
    }

    /// Every rule, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` if the graph has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Depth-first post-order walk from `target`.
    ///
    /// Sources are walked in declaration order. A slot reached again while it
    /// is still in progress is a cycle, whatever path led back to it.
    pub(crate) fn walk(
        &self,
        target: &AnyKey,
        visitor: &mut impl Visitor,
    ) -> Result<(), RouteError> {
        let mut in_progress = IndexSet::default();
        self.walk_from(target, visitor, &mut in_progress)
    }

    fn walk_from(
        &self,
        key: &AnyKey,
        visitor: &mut impl Visitor,
        in_progress: &mut IndexSet<AnyKey>,
    ) -> Result<(), RouteError> {
        if visitor.is_done(key) {
            trace!("{key}: already available");
            return Ok(());
        }
        if in_progress.contains(key) {
            return Err(RouteError::CyclicRoute {
                key: key.clone(),
                path: in_progress.iter().cloned().collect(),
            });
        }
        let rule = self
            .rules
            .get(key)
            .ok_or_else(|| RouteError::NoRouteFor(key.clone()))?;
        in_progress.insert(key.clone());
        for source in rule.sources() {
            self.walk_from(source, visitor, in_progress)?;
        }
        let popped = in_progress.pop();
        debug_assert_eq!(popped.as_ref(), Some(key), "RouteGraph::walk_from: [1]");
        visitor.visit(rule)
    }
}
