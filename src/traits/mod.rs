//! Trait definitions for Scratch entities.
//!
//! [`Entity`] fixes identity; [`Hydrate`] adds on-demand population of an
//! entity's detail fields.

mod entity;
mod hydrate;

pub(crate) use entity::impl_entity_identity;
pub use entity::Entity;
pub(crate) use hydrate::{hydrated, hydrated_opt};
pub use hydrate::{Hydrate, Nesting};
