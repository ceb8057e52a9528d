use crate::{
    config::{GraphConfig, Validation},
    error::RouteError,
    graph::RouteGraph,
    rule::Rule,
    types::{AnyKey, IndexMap},
};
use log::debug;

/// Incremental, single-use builder of a [`RouteGraph`].
///
/// `build` consumes the builder, so a graph is frozen exactly once.
#[must_use]
#[derive(Debug)]
pub struct GraphBuilder {
    config: GraphConfig,
    rules: IndexMap<AnyKey, Rule>,
}

impl GraphBuilder {
    pub(super) fn new(config: GraphConfig) -> Self {
        Self {
            config,
            rules: IndexMap::default(),
        }
    }

    /// Register a rule.
    ///
    /// # Errors
    /// [`RouteError::DuplicateDestination`] if a rule for the same
    /// destination is already registered. The builder is consumed either way,
    /// so a failed graph can never be built.
    pub fn add(mut self, rule: Rule) -> Result<Self, RouteError> {
        let destination = rule.destination().clone();
        if self.rules.contains_key(&destination) {
            return Err(RouteError::DuplicateDestination(destination));
        }
        self.rules.insert(destination, rule);
        Ok(self)
    }

    /// Freeze the registered rules.
    ///
    /// # Errors
    /// [`RouteError::MissingSource`] under [`Validation::Eager`] if a rule
    /// requires a slot that no rule produces. Root rules need nothing.
    pub fn build(self) -> Result<RouteGraph, RouteError> {
        let Self { config, rules } = self;
        if config.validation == Validation::Eager {
            for rule in rules.values() {
                if let Some(missing) = rule
                    .sources()
                    .iter()
                    .find(|source| !rules.contains_key(*source))
                {
                    return Err(RouteError::MissingSource {
                        rule: rule.label().to_owned(),
                        missing: missing.clone(),
                    });
                }
            }
        }
        debug!(
            "route graph built: {} rule(s), {:?} validation",
            rules.len(),
            config.validation
        );
        Ok(RouteGraph { rules })
    }
}
