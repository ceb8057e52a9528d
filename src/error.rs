use crate::types::AnyKey;
use core::fmt;
use thiserror::Error;

/// Boxed error accepted as a failure cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Uniform failure kind returned by rule closures and release actions.
///
/// Wraps the original cause, which stays reachable through
/// [`std::error::Error::source`].
#[derive(Debug)]
pub struct Failure(BoxError);

impl Failure {
    /// Wrap any error (or message) as a failure.
    pub fn new(cause: impl Into<BoxError>) -> Self {
        Self(cause.into())
    }

    /// The original cause.
    #[must_use]
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.0
    }

    /// Try to recover the concrete cause type.
    #[must_use]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.0)
    }
}

impl From<RouteError> for Failure {
    fn from(err: RouteError) -> Self {
        Self::new(err)
    }
}

/// Invoke a fallible computation and re-signal its error as a [`Failure`].
///
/// Lets rule closures use `?` on any error type without declaring their own
/// failure taxonomy:
///
/// ```
/// use route_graph::{error::attempt, value::Value};
///
/// let dir = attempt(|| std::fs::create_dir_all(std::env::temp_dir())).map(Value::of);
/// assert!(dir.is_ok());
/// ```
///
/// # Errors
/// Whatever `f` fails with, wrapped.
pub fn attempt<T, E>(f: impl FnOnce() -> Result<T, E>) -> Result<T, Failure>
where
    E: Into<BoxError>,
{
    f().map_err(Failure::new)
}

/// A single release action that failed while a scope was closed.
#[derive(Debug, Error)]
#[error("release of {key} failed")]
pub struct ReleaseFailure {
    /// Slot whose release action failed.
    pub key: AnyKey,
    /// What went wrong.
    #[source]
    pub source: Failure,
}

/// All release failures collected while closing one scope, in release order.
#[derive(Debug, Default)]
pub struct ReleaseFailures(pub(crate) Vec<ReleaseFailure>);

impl ReleaseFailures {
    /// The collected failures.
    #[must_use]
    pub fn failures(&self) -> &[ReleaseFailure] {
        &self.0
    }

    /// Number of failed releases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if every release succeeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_result(self) -> Result<(), RouteError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(RouteError::ReleaseFailed(self))
        }
    }
}

impl IntoIterator for ReleaseFailures {
    type Item = ReleaseFailure;
    type IntoIter = std::vec::IntoIter<ReleaseFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ReleaseFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for failure in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}: {}", failure.key, failure.source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ReleaseFailures {
    /// The first failure in release order.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0
            .first()
            .map(|failure| failure as &(dyn std::error::Error + 'static))
    }
}

/// Error kind for graph construction, resolution and release.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouteError {
    /// Two rules claim the same destination.
    #[error("duplicate rule for destination {0}")]
    DuplicateDestination(AnyKey),
    /// A rule requires a slot that no rule produces.
    #[error("rule `{rule}` requires {missing}, which no rule produces")]
    MissingSource {
        /// Label of the rule with the dangling source.
        rule: String,
        /// The unproducible slot.
        missing: AnyKey,
    },
    /// A requested or transitively required slot has no rule.
    #[error("no route for {0}")]
    NoRouteFor(AnyKey),
    /// A slot depends on itself, directly or transitively.
    #[error("cyclic route: {key} is required while it is being resolved (via {})", render_path(.path))]
    CyclicRoute {
        /// The slot that was revisited.
        key: AnyKey,
        /// Slots in progress when the revisit happened, outermost first.
        path: Vec<AnyKey>,
    },
    /// A rule failed to produce its value.
    #[error("could not resolve {destination}")]
    ResolutionFailure {
        /// The slot the failing rule produces.
        destination: AnyKey,
        /// The rule's failure.
        #[source]
        source: Failure,
    },
    /// One or more release actions failed during close.
    #[error("{n} release(s) failed: {0}", n = .0.len())]
    ReleaseFailed(#[source] ReleaseFailures),
    /// A cached value does not have the type its key records.
    #[error("internal inconsistency: value for {key} is not a `{expected}`")]
    TypeMismatch {
        /// The slot that was read.
        key: AnyKey,
        /// The type the reader asked for.
        expected: &'static str,
    },
    /// A rule read an input by a position past its last source.
    #[error("rule `{rule}` read input #{index}, but has {len} source(s)")]
    InputOutOfRange {
        /// Label of the reading rule.
        rule: String,
        /// The requested position.
        index: usize,
        /// Number of declared sources.
        len: usize,
    },
    /// A rule read an input it did not declare as a source.
    #[error("rule `{rule}` read undeclared input {key}")]
    UndeclaredInput {
        /// Label of the reading rule.
        rule: String,
        /// The slot it tried to read.
        key: AnyKey,
    },
}

fn render_path(path: &[AnyKey]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
