//! Identity contract shared by every Scratch entity.

use std::fmt;
use std::hash::Hash;

/// A remote resource addressable by a stable identity key.
///
/// Two values with equal keys are the same entity, whatever their
/// hydration state: equality, hashing and display look at the key only.
pub trait Entity: Sized {
    /// The identity key (project ID, username, ...).
    type Key: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync;

    /// Human-readable entity kind, used in display and logs.
    const KIND: &'static str;

    /// The identity key. Never changes after construction.
    fn key(&self) -> &Self::Key;

    /// Build an unhydrated reference. Never touches the network.
    fn shallow(key: Self::Key) -> Self;
}

/// Implement key-based `PartialEq`, `Eq`, `Hash` and `Display`.
macro_rules! impl_entity_identity {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::traits::Entity::key(self) == $crate::traits::Entity::key(other)
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash($crate::traits::Entity::key(self), state);
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    "<{} {}>",
                    <$ty as $crate::traits::Entity>::KIND,
                    $crate::traits::Entity::key(self)
                )
            }
        }
    };
}

pub(crate) use impl_entity_identity;
