//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the scratchapi binary.

use clap::{Parser, Subcommand, ValueEnum};

use crate::pagination::DEFAULT_PAGE_SIZE;

/// Scratch API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "scratchapi", about = "Scratch API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of text.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log HTTP requests and hydration to stderr.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hydrate a single entity and print it.
    Get {
        /// The type of entity to get.
        entity: EntityKind,

        /// Numeric ID, or the username for users.
        key: String,
    },

    /// Walk a listing of an entity.
    List {
        /// What to list.
        listing: Listing,

        /// Project/studio ID or username the listing belongs to.
        target: String,

        /// Items per page.
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,

        /// Offset of the first item.
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Stop after this many items.
        #[arg(long, default_value_t = 20)]
        max: usize,
    },

    /// Search projects, or studios with `--studios`.
    Search {
        /// Search terms.
        query: String,

        /// Search studios instead of projects.
        #[arg(long)]
        studios: bool,

        /// Number of results.
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
    },

    /// Translate text with the Scratch translation service.
    Translate {
        /// Target language code, e.g. `ja`.
        locale: String,

        /// Text to translate.
        text: String,
    },
}

/// Entity types that can be fetched.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    /// A shared project.
    #[value(alias = "projects")]
    Project,
    /// A user account.
    #[value(alias = "users")]
    User,
    /// A studio.
    #[value(alias = "studios")]
    Studio,
    /// A teacher account classroom.
    #[value(alias = "classrooms")]
    Classroom,
}

/// Listings reachable from the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listing {
    /// Remixes of a project.
    Remixes,
    /// Projects shared by a user.
    Projects,
    /// Projects in a studio.
    StudioProjects,
    /// Followers of a user.
    Followers,
    /// Users a user follows.
    Following,
    /// Projects a user favorited.
    Favorites,
    /// Curators of a studio.
    Curators,
    /// Comments on a studio.
    StudioComments,
}
