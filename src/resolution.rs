mod scope;

use crate::{
    error::RouteError,
    graph::RouteGraph,
    resolution::scope::Scope,
    types::{AnyKey, TypeKey},
};
use derive_more::Debug;
use log::{debug, warn};

/// A live, cached, releasable evaluation context for one target.
///
/// A resolution owns every value it computed while resolving its target and
/// reads values computed by its ancestors by reference. Opening a child with
/// [`Resolution::open`] reuses everything visible here; whatever the child
/// has to compute on top belongs to the child alone, so siblings never see
/// each other's values.
///
/// Owned values are released in reverse creation order by [`close`], or by
/// `Drop` if the resolution goes out of scope on an early return, a `?` or a
/// panic. A child borrows its parent, so a parent cannot be closed while a
/// child is still open.
///
/// [`close`]: Resolution::close
#[must_use]
#[derive(Debug)]
pub struct Resolution<'a, T> {
    scope: Scope<'a>,
    target: TypeKey<T>,
}

impl<'a, T: 'static> Resolution<'a, T> {
    pub(crate) fn root(graph: &'a RouteGraph, target: &TypeKey<T>) -> Result<Self, RouteError> {
        Self::resolve_in(Scope::root(graph), target)
    }

    fn resolve_in(mut scope: Scope<'a>, target: &TypeKey<T>) -> Result<Self, RouteError> {
        match scope.resolve(&target.erase()) {
            Ok(()) => Ok(Self {
                scope,
                target: target.clone(),
            }),
            Err(err) => {
                // Values computed before the failure must not leak.
                for failure in scope.release() {
                    warn!("{failure} after failed resolution of {target:?}: {}", failure.source);
                }
                Err(err)
            }
        }
    }

    /// Open a child resolution for `target`.
    ///
    /// Values already visible here are reused as they are; missing ones are
    /// computed into, and owned by, the child.
    ///
    /// # Errors
    /// See [`RouteGraph::open`].
    pub fn open<U: 'static>(&self, target: &TypeKey<U>) -> Result<Resolution<'_, U>, RouteError> {
        Resolution::resolve_in(Scope::child(&self.scope), target)
    }

    /// The resolved payload of the target.
    ///
    /// # Panics
    /// In case of internal invariant violations. Impossible if there are no
    /// bugs in the code.
    #[must_use]
    pub fn current(&self) -> &T {
        self.get(&self.target).expect("Resolution::current: [1]")
    }

    /// A payload visible to this resolution, without resolving anything.
    #[must_use]
    pub fn get<U: 'static>(&self, key: &TypeKey<U>) -> Option<&U> {
        let key = key.erase();
        self.scope
            .lookup(&key)
            .and_then(|slot| slot.downcast(&key).ok())
    }

    /// The target key.
    #[must_use]
    pub fn target(&self) -> &TypeKey<T> {
        &self.target
    }

    /// Slots this resolution computed and owns, in creation order.
    pub fn owned_keys(&self) -> impl Iterator<Item = &AnyKey> {
        self.scope.owned_keys()
    }

    /// Release every owned value, newest first.
    ///
    /// All release actions run even if some of them fail.
    ///
    /// # Errors
    /// [`RouteError::ReleaseFailed`] listing every failed release.
    pub fn close(mut self) -> Result<(), RouteError> {
        debug!("closing resolution of {:?}", self.target);
        self.scope.release().into_result()
    }
}
