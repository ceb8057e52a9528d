use crate::{
    error::{Failure, RouteError},
    types::{AnyKey, TypeKey},
    value::{Slot, Value},
};
use core::any::{Any, type_name};
use derive_more::Debug;
use std::borrow::Cow;

type Produce = Box<dyn Fn(&Inputs<'_>) -> Result<Slot, RouteError>>;

/// A named production step of the route graph.
///
/// A rule declares an ordered list of source slots and exactly one
/// destination slot. When the destination is requested, the resolver first
/// resolves every source in declaration order, then invokes the rule's
/// closure with their payloads. A rule without sources is a root rule.
///
/// All rules share this one shape; [`Rule::start`], [`Rule::bridge`] and
/// [`Rule::merge`] are typed shorthands for zero, one and two sources, and
/// [`Rule::join`] takes any number.
#[must_use]
#[derive(Debug)]
pub struct Rule {
    label: Cow<'static, str>,
    sources: Vec<AnyKey>,
    destination: AnyKey,
    #[debug(skip)]
    produce: Produce,
}

impl Rule {
    /// Root rule without sources.
    pub fn start<T: 'static>(
        destination: &TypeKey<T>,
        produce: impl Fn() -> Result<Value<T>, Failure> + 'static,
    ) -> Self {
        Self::with_produce(
            format!("start({destination:?})"),
            vec![],
            destination,
            move |_| produce(),
        )
    }

    /// Rule deriving its destination from one source.
    pub fn bridge<A: 'static, T: 'static>(
        source: &TypeKey<A>,
        destination: &TypeKey<T>,
        produce: impl Fn(&A) -> Result<Value<T>, Failure> + 'static,
    ) -> Self {
        let a = source.clone();
        Self::with_produce(
            format!("bridge({source:?} -> {destination:?})"),
            vec![source.erase()],
            destination,
            move |inputs| produce(inputs.get(&a)?),
        )
    }

    /// Rule combining two sources into its destination.
    pub fn merge<A: 'static, B: 'static, T: 'static>(
        left: &TypeKey<A>,
        right: &TypeKey<B>,
        destination: &TypeKey<T>,
        produce: impl Fn(&A, &B) -> Result<Value<T>, Failure> + 'static,
    ) -> Self {
        let (a, b) = (left.clone(), right.clone());
        Self::with_produce(
            format!("merge({left:?}, {right:?} -> {destination:?})"),
            vec![left.erase(), right.erase()],
            destination,
            move |inputs| produce(inputs.get(&a)?, inputs.get(&b)?),
        )
    }

    /// Rule with an arbitrary number of sources, read through [`Inputs`].
    pub fn join<T: 'static>(
        sources: impl IntoIterator<Item = AnyKey>,
        destination: &TypeKey<T>,
        produce: impl Fn(&Inputs<'_>) -> Result<Value<T>, Failure> + 'static,
    ) -> Self {
        let sources: Vec<_> = sources.into_iter().collect();
        let label = format!(
            "join({} -> {destination:?})",
            sources
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self::with_produce(label, sources, destination, produce)
    }

    fn with_produce<T: 'static>(
        label: String,
        sources: Vec<AnyKey>,
        destination: &TypeKey<T>,
        produce: impl Fn(&Inputs<'_>) -> Result<Value<T>, Failure> + 'static,
    ) -> Self {
        let key = destination.erase();
        Self {
            label: label.into(),
            sources,
            destination: key.clone(),
            produce: Box::new(move |inputs: &Inputs<'_>| match produce(inputs) {
                Ok(value) => Ok(value.erase()),
                Err(source) => Err(RouteError::ResolutionFailure {
                    destination: key.clone(),
                    source,
                }),
            }),
        }
    }

    /// Replace the generated label, e.g. with a domain name for the step.
    pub fn labeled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Human-readable name of the rule.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source slots in declaration order.
    #[must_use]
    pub fn sources(&self) -> &[AnyKey] {
        &self.sources
    }

    /// The slot this rule produces.
    #[must_use]
    pub fn destination(&self) -> &AnyKey {
        &self.destination
    }

    /// `true` for root rules.
    #[must_use]
    pub fn is_start(&self) -> bool {
        self.sources.is_empty()
    }

    pub(crate) fn produce(&self, payloads: &[&(dyn Any + 'static)]) -> Result<Slot, RouteError> {
        let inputs = Inputs {
            rule: &self.label,
            keys: &self.sources,
            payloads,
        };
        (self.produce)(&inputs)
    }
}

/// Resolved source payloads handed to a rule's closure.
///
/// Payloads may live in the invoking scope or in any of its ancestors; the
/// references are valid for the duration of the call.
#[derive(Debug)]
pub struct Inputs<'a> {
    rule: &'a str,
    keys: &'a [AnyKey],
    #[debug(skip)]
    payloads: &'a [&'a (dyn Any + 'static)],
}

impl Inputs<'_> {
    /// Payload of a declared source.
    ///
    /// # Errors
    /// [`RouteError::UndeclaredInput`] if `key` is not a source of the rule.
    pub fn get<T: 'static>(&self, key: &TypeKey<T>) -> Result<&T, RouteError> {
        let key = key.erase();
        let Some(idx) = self.keys.iter().position(|source| *source == key) else {
            return Err(RouteError::UndeclaredInput {
                rule: self.rule.to_owned(),
                key,
            });
        };
        self.at(idx)
    }

    /// Payload of the source at position `idx` in declaration order.
    ///
    /// # Errors
    /// - [`RouteError::InputOutOfRange`] if the rule has no source at `idx`.
    /// - [`RouteError::TypeMismatch`] if that source is not a `T`.
    pub fn at<T: 'static>(&self, idx: usize) -> Result<&T, RouteError> {
        let payload = self
            .payloads
            .get(idx)
            .ok_or_else(|| RouteError::InputOutOfRange {
                rule: self.rule.to_owned(),
                index: idx,
                len: self.keys.len(),
            })?;
        payload
            .downcast_ref()
            .ok_or_else(|| RouteError::TypeMismatch {
                key: self.keys[idx].clone(),
                expected: type_name::<T>(),
            })
    }

    /// Number of sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// `true` for root rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
