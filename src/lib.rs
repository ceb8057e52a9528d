//! Type-indexed, lazily evaluated dependency graph with scoped resource
//! release.
//!
//! A [`RouteGraph`](graph::RouteGraph) is a set of rules. Each rule declares
//! the typed slots it needs and the one typed slot it produces. Requesting a
//! slot:
//! - Resolves only the rules on the path to it, depth-first and in source
//!   declaration order.
//! - Caches every computed value, so shared ancestors are computed once.
//! - Records which values own a releasable resource, and releases them in
//!   reverse creation order when the requesting scope closes.
//!
//! Scopes nest. A child [`Resolution`](resolution::Resolution) reuses the
//! values of its ancestors by reference and owns only what it computes
//! itself, so closing a child never tears down a value that its parent still
//! hands out.
//!
//! Key modules:
//! - `types`: the [`TypeKey`](types::TypeKey) slot identity and its erased
//!   form.
//! - `value`: computed payloads with optional release actions.
//! - `rule`: production steps with any number of sources.
//! - `graph`: the immutable rule set, its builder, planning and DOT output.
//! - `resolution`: the scoped evaluator.
//! - `error`: the error taxonomy and the [`attempt`](error::attempt) adapter.
//! - `artifact` (feature `artifact`): a download-and-unpack demonstration
//!   built on the engine.
//!
//! Quick start:
//! ```
//! use route_graph::{graph::RouteGraph, rule::Rule, types::TypeKey, value::Value};
//!
//! let base = TypeKey::<u32>::named("base");
//! let doubled = TypeKey::<u32>::named("doubled");
//! let graph = RouteGraph::builder()
//!     .add(Rule::start(&base, || Ok(Value::of(21))))?
//!     .add(Rule::bridge(&base, &doubled, |n| Ok(Value::of(n * 2))))?
//!     .build()?;
//!
//! let root = graph.open(&base)?;
//! let child = root.open(&doubled)?;
//! assert_eq!(*child.current(), 42);
//! child.close()?;
//! root.close()?;
//! # Ok::<(), route_graph::error::RouteError>(())
//! ```

/// Artifact download demonstration: distribution descriptors, a temporary
/// artifact store and an HTTP fetch wired together as routes.
#[cfg(feature = "artifact")]
pub mod artifact;
/// Configuration of graph construction.
pub mod config;
/// Error taxonomy of the engine and the failure-adapting call wrapper.
pub mod error;
/// The immutable rule set.
///
/// Contains the single-use builder with duplicate and missing-source checks,
/// the depth-first walk shared by resolution and planning, and DOT rendering.
pub mod graph;
/// Scoped evaluation: cache chain, rule invocation and ordered release.
pub mod resolution;
/// Production rules and the inputs handed to them.
pub mod rule;
/// Slot identities and common collection aliases.
pub mod types;
/// Computed payloads and their release actions.
pub mod value;
