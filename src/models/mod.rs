//! Scratch entity types.

mod classroom;
mod comment;
mod project;
mod studio;
mod user;

pub use classroom::*;
pub use comment::*;
pub use project::*;
pub use studio::*;
pub use user::*;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// The `id` field every numeric-keyed summary record carries.
#[derive(Debug, Deserialize)]
struct IdSummary {
    id: u64,
}

/// The `username` field carried by user summaries and embedded authors.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserRef {
    pub(crate) username: String,
}

pub(crate) fn summary_id(record: Value) -> Result<u64> {
    let summary: IdSummary = serde_json::from_value(record)?;
    Ok(summary.id)
}
