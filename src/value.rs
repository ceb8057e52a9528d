use crate::{
    error::{Failure, RouteError},
    types::AnyKey,
};
use core::any::{Any, type_name};
use derive_more::Debug;

/// Release action of a [`Value`]. Consumes the payload, so it runs at most
/// once.
pub type Release<T> = Box<dyn FnOnce(T) -> Result<(), Failure>>;

/// A computed result for one slot: the payload and an optional release
/// action.
///
/// A value without a release action is inert. A value with one owns an
/// external resource (a directory, a connection) and is torn down by the
/// scope that computed it.
#[must_use]
#[derive(Debug)]
pub struct Value<T> {
    payload: T,
    #[debug("{}", if release.is_some() { "Some(..)" } else { "None" })]
    release: Option<Release<T>>,
}

impl<T: 'static> Value<T> {
    /// Inert value.
    pub fn of(payload: T) -> Self {
        Self {
            payload,
            release: None,
        }
    }

    /// Value whose payload must be released when its scope closes.
    pub fn with_release(
        payload: T,
        release: impl FnOnce(T) -> Result<(), Failure> + 'static,
    ) -> Self {
        Self {
            payload,
            release: Some(Box::new(release)),
        }
    }

    /// The payload.
    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// `true` if a release action is attached.
    #[must_use]
    pub fn has_release(&self) -> bool {
        self.release.is_some()
    }

    /// Take the payload, dropping the release action without running it.
    pub fn into_payload(self) -> T {
        self.payload
    }

    pub(crate) fn erase(self) -> Slot {
        let Self { payload, release } = self;
        Slot {
            payload: Box::new(payload),
            release: release.map(|release| -> ErasedRelease {
                Box::new(move |payload: Box<dyn Any>| match payload.downcast::<T>() {
                    Ok(payload) => release(*payload),
                    Err(_) => Err(Failure::new(format!(
                        "release payload is not a `{}`",
                        type_name::<T>()
                    ))),
                })
            }),
        }
    }
}

type ErasedRelease = Box<dyn FnOnce(Box<dyn Any>) -> Result<(), Failure>>;

/// Type-erased [`Value`] as stored in a scope's cache.
#[derive(Debug)]
pub(crate) struct Slot {
    #[debug(skip)]
    payload: Box<dyn Any>,
    #[debug(skip)]
    release: Option<ErasedRelease>,
}

impl Slot {
    /// Recover the payload as `T`, failing on a type that does not match the
    /// key it was stored under.
    pub(crate) fn downcast<T: 'static>(&self, key: &AnyKey) -> Result<&T, RouteError> {
        self.payload
            .downcast_ref()
            .ok_or_else(|| RouteError::TypeMismatch {
                key: key.clone(),
                expected: type_name::<T>(),
            })
    }

    pub(crate) fn payload(&self) -> &(dyn Any + 'static) {
        &*self.payload
    }

    /// Run the release action, if any.
    pub(crate) fn release(self) -> Result<(), Failure> {
        let Self { payload, release } = self;
        match release {
            Some(release) => release(payload),
            None => Ok(()),
        }
    }
}
