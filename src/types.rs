use core::{
    any::{TypeId, type_name},
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};
use derive_more::Display;
use indexmap::{IndexMap as _IndexMap, IndexSet as _IndexSet};
use rustc_hash::FxBuildHasher;
use std::borrow::Cow;

/// Typed identifier of a slot in the route graph.
///
/// A key is a human-readable name paired with the payload type `T`. Two keys
/// address the same slot iff both the name and the type match, so
/// `TypeKey::<PathBuf>::named("store")` and `TypeKey::<String>::named("store")`
/// are different slots.
///
/// Keys never carry a payload; they only index one.
pub struct TypeKey<T> {
    name: Cow<'static, str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> TypeKey<T> {
    /// Key with an explicit name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// Key named after its payload type.
    ///
    /// Handy for slots that exist at most once per graph, such as a `Version`.
    #[must_use]
    pub fn of() -> Self {
        Self::named(short_type_name::<T>())
    }

    /// Name of the slot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type-erased form used as the cache and graph index.
    #[must_use]
    pub fn erase(&self) -> AnyKey {
        AnyKey {
            name: self.name.clone(),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }
}

impl<T> Clone for TypeKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for TypeKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for TypeKey<T> {}

impl<T> Hash for TypeKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<T> fmt::Debug for TypeKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, short_type_name::<T>())
    }
}

impl<T: 'static> From<&TypeKey<T>> for AnyKey {
    fn from(key: &TypeKey<T>) -> Self {
        key.erase()
    }
}

/// Type-erased [`TypeKey`].
///
/// Equality and hashing use the name and the payload's `TypeId`; the type name
/// is kept only for messages.
#[derive(Clone, Display)]
#[display("{name}:{}", short(type_name))]
pub struct AnyKey {
    name: Cow<'static, str>,
    type_id: TypeId,
    type_name: &'static str,
}

impl AnyKey {
    /// Name of the slot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full type name of the payload.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `true` if this key addresses payloads of type `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for AnyKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for AnyKey {}

impl Hash for AnyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.type_id.hash(state);
    }
}

impl fmt::Debug for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn short(type_name: &str) -> &str {
    // Keeps generic arguments intact: `Vec<alloc::string::String>` stays whole.
    let head = type_name.split('<').next().unwrap_or(type_name);
    match head.rfind("::") {
        Some(idx) => &type_name[idx + 2..],
        None => type_name,
    }
}

fn short_type_name<T>() -> &'static str {
    short(type_name::<T>())
}

pub(crate) type IndexMap<K, V> = _IndexMap<K, V, FxBuildHasher>;
pub(crate) type IndexSet<T> = _IndexSet<T, FxBuildHasher>;
