//! Typed references to shared sub-entities and the resolution boundary.

use crate::id::Guid;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A reference to an entity of type `A`, named by its [`Guid`].
///
/// The type parameter is phantom: on the wire a reference is just its guid,
/// but in code it only resolves to the entity type it was allocated for.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Ref<A> {
    guid: Guid,
    #[serde(skip)]
    _entity: PhantomData<fn() -> A>,
}

impl<A> Ref<A> {
    /// Create a reference from an allocated guid.
    pub fn new(guid: Guid) -> Self {
        Self {
            guid,
            _entity: PhantomData,
        }
    }

    /// The underlying guid.
    pub fn guid(&self) -> Guid {
        self.guid
    }
}

// Manual impls: the phantom parameter must not constrain `A`.

impl<A> Clone for Ref<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Ref<A> {}

impl<A> fmt::Debug for Ref<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.guid)
    }
}

impl<A> fmt::Display for Ref<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.guid)
    }
}

impl<A> PartialEq for Ref<A> {
    fn eq(&self, other: &Self) -> bool {
        self.guid == other.guid
    }
}

impl<A> Eq for Ref<A> {}

impl<A> PartialOrd for Ref<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Ref<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.guid.cmp(&other.guid)
    }
}

impl<A> Hash for Ref<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.guid.hash(state);
    }
}

/// Resolution of references to their current revision.
///
/// Delta application may consult a reference store through this trait. The
/// store's internals (revision tracking, edge bookkeeping) are not part of
/// the synchronization core; it is an injected collaborator.
pub trait ResolveRef<A> {
    /// Resolve a reference to the current revision of the entity it names,
    /// or `None` if the entity is unknown.
    fn resolve(&self, reference: &Ref<A>) -> Option<A>;
}
