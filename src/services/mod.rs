//! Site-wide endpoints that are not tied to a single entity.
//!
//! Each facade is a plain struct built from a [`ScratchClient`](crate::ScratchClient)
//! and cheap to clone.

mod front_page;
mod meta;
mod translate;

pub use front_page::{CuratedProject, DesignStudioProject, FrontPage, FrontPageRows};
pub use meta::{Availability, CacheHealth, Health, Meta, SqlHealth};
pub use translate::{Language, Translate};
