//! Scratch API client library.
//!
//! A Rust library for the Scratch public REST API. Projects, users,
//! studios, classrooms and comments are entity references: cheap values
//! identified by a key that are populated ("hydrated") only on request.
//! Every "many of X" operation returns a lazy [`PagedListing`].
//!
//! # Quick Start
//!
//! ```no_run
//! use scratchapi::{Entity, Hydrate, ListParams, Project, ScratchClient, User};
//!
//! #[tokio::main]
//! async fn main() -> scratchapi::Result<()> {
//!     let client = ScratchClient::from_env()?;
//!
//!     // Hydrate a project; its author and remix parent come along
//!     let project = Project::fetch(&client, 104).await?;
//!     if let Some(detail) = project.detail() {
//!         println!("{} by {}", detail.title, detail.author);
//!     }
//!
//!     // Walk a user's followers lazily, one page at a time
//!     let user = User::shallow("griffpatch".into());
//!     let followers = user
//!         .followers(&client, ListParams::with_limit(40))
//!         .collect_up_to(100)
//!         .await?;
//!     println!("first {} followers", followers.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized around two traits:
//!
//! - [`Entity`] - Key-based identity, equality and hashing
//! - [`Hydrate`] - Fetch and atomically install an entity's detail fields
//!
//! Site-wide endpoints live on the [`Meta`], [`FrontPage`] and
//! [`Translate`] facades, each built from a [`ScratchClient`].
//!
//! # Configuration
//!
//! [`ScratchClient::from_env`] reads optional host overrides:
//!
//! - `SCRATCH_API_URL` - API host (defaults to `https://api.scratch.mit.edu/`)
//! - `SCRATCH_SITE_URL` - Website (defaults to `https://scratch.mit.edu/`)
//! - `SCRATCH_PROJECTS_URL` - Project JSON host
//! - `SCRATCH_TRANSLATE_URL` - Translation service
//! - `SCRATCH_PREVIEW_URL` - Preview player

mod auth;
mod client;
mod error;
mod models;
mod output;
mod pagination;
mod record;
mod services;
mod traits;

pub mod cli;

// Re-export core types
pub use auth::Session;
pub use client::{Endpoints, Host, ScratchClient};
pub use error::{ErrorKind, Result, ScratchError};
pub use pagination::{ListParams, PagedListing, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use record::GenericRecord;

// Re-export traits
pub use output::PrettyPrint;
pub use traits::{Entity, Hydrate, Nesting};

// Re-export models
pub use models::{
    // Classroom types
    Classroom,
    ClassroomDetail,
    // Comment types
    Comment,
    CommentDetail,
    CommentKey,
    CommentThread,
    // Project types
    Project,
    ProjectDetail,
    ProjectHistory,
    ProjectLinks,
    ProjectStats,
    // Studio types
    Studio,
    StudioDetail,
    StudioHistory,
    StudioStats,
    // User types
    User,
    UserDetail,
    Username,
};

// Re-export facades
pub use services::{
    Availability, CacheHealth, CuratedProject, DesignStudioProject, FrontPage, FrontPageRows,
    Health, Language, Meta, SqlHealth, Translate,
};
