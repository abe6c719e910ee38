//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};

use crate::models::{Classroom, Project, Studio, User};
use crate::traits::{Entity, Hydrate};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
/// Unhydrated references print their header only.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn header<E: Entity>(entity: &E) -> Vec<String> {
    let header = format!("{}: {}", E::KIND, entity.key());
    let divider = "─".repeat(header.chars().count().max(30));
    vec![header, divider]
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let mut lines = header(self);

        let Some(detail) = self.detail() else {
            return lines.join("\n");
        };

        lines.push(format!("Title:          {}", detail.title));
        lines.push(format!("Author:         {}", detail.author.username()));
        lines.push(format!(
            "Stats:          {} views, {} loves, {} favorites, {} remixes",
            detail.stats.views, detail.stats.loves, detail.stats.favorites, detail.stats.remixes
        ));

        if let Some(ref parent) = detail.parent {
            let title = parent.detail().map(|p| p.title.as_str()).unwrap_or("?");
            lines.push(format!("Remix of:       {} ({})", parent.id(), title));
        }

        if let Some(ref shared) = detail.history.shared {
            lines.push(format!("Shared:         {}", timestamp(shared)));
        }

        lines.push(format!("URL:            {}", detail.links.url));
        lines.join("\n")
    }
}

impl PrettyPrint for User {
    fn pretty_print(&self) -> String {
        let mut lines = header(self);

        let Some(detail) = self.detail() else {
            return lines.join("\n");
        };

        lines.push(format!("ID:             {}", detail.id));
        if !detail.country.is_empty() {
            lines.push(format!("Country:        {}", detail.country));
        }
        if let Some(ref joined) = detail.joined {
            lines.push(format!("Joined:         {}", timestamp(joined)));
        }
        if detail.scratchteam {
            lines.push("Scratch Team:   yes".to_string());
        }
        lines.push(format!("URL:            {}", detail.url));
        lines.join("\n")
    }
}

impl PrettyPrint for Studio {
    fn pretty_print(&self) -> String {
        let mut lines = header(self);

        let Some(detail) = self.detail() else {
            return lines.join("\n");
        };

        lines.push(format!("Title:          {}", detail.title));
        lines.push(format!(
            "Stats:          {} projects, {} followers, {} managers",
            detail.stats.projects, detail.stats.followers, detail.stats.managers
        ));
        if detail.open_to_all {
            lines.push("Open to all:    yes".to_string());
        }
        lines.push(format!("URL:            {}", detail.url));
        lines.join("\n")
    }
}

impl PrettyPrint for Classroom {
    fn pretty_print(&self) -> String {
        let mut lines = header(self);

        let Some(detail) = self.detail() else {
            return lines.join("\n");
        };

        lines.push(format!("Title:          {}", detail.title));
        lines.push(format!("Educator:       {}", detail.educator.username()));
        if let Some(ref start) = detail.date_start {
            lines.push(format!("Started:        {}", timestamp(start)));
        }
        lines.join("\n")
    }
}
