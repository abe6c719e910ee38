//! Classroom model and hydration.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Host, ScratchClient};
use crate::error::Result;
use crate::models::{User, UserRef, Username};
use crate::traits::{hydrated, impl_entity_identity, Entity, Hydrate, Nesting};

/// A Scratch classroom.
///
/// Hydrating a classroom also hydrates its educator.
#[derive(Debug, Clone, Serialize)]
pub struct Classroom {
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Box<ClassroomDetail>>,
}

impl_entity_identity!(Classroom);

/// Populated classroom fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassroomDetail {
    pub title: String,
    pub description: String,
    /// The "About this class" text.
    pub status: String,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
    pub images: BTreeMap<String, String>,
    pub educator: User,
}

impl ClassroomDetail {
    /// Alias of `status`.
    pub fn about_class(&self) -> &str {
        &self.status
    }

    /// Alias of `description`.
    pub fn what_were_working_on(&self) -> &str {
        &self.description
    }

    /// Alias of `educator`.
    pub fn teacher(&self) -> &User {
        &self.educator
    }
}

#[derive(Debug, Deserialize)]
struct ClassroomResponse {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    date_start: Option<DateTime<Utc>>,
    #[serde(default)]
    date_end: Option<DateTime<Utc>>,
    #[serde(default)]
    images: BTreeMap<String, String>,
    educator: UserRef,
}

impl Classroom {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Entity for Classroom {
    type Key = u64;
    const KIND: &'static str = "Classroom";

    fn key(&self) -> &u64 {
        &self.id
    }

    fn shallow(id: u64) -> Self {
        Self { id, detail: None }
    }
}

#[async_trait]
impl Hydrate for Classroom {
    type Detail = ClassroomDetail;

    #[tracing::instrument(skip(client))]
    async fn fetch_detail(
        client: &ScratchClient,
        id: &u64,
        nesting: Nesting,
    ) -> Result<ClassroomDetail> {
        let raw: ClassroomResponse = client.get_as(Host::Api, &format!("classrooms/{id}")).await?;

        let educator = User::shallow(Username::from(raw.educator.username));
        let educator = match nesting {
            Nesting::Eager => hydrated(client, educator).await?,
            Nesting::Shallow => educator,
        };

        Ok(ClassroomDetail {
            title: raw.title,
            description: raw.description.unwrap_or_default(),
            status: raw.status.unwrap_or_default(),
            date_start: raw.date_start,
            date_end: raw.date_end,
            images: raw.images,
            educator,
        })
    }

    fn detail(&self) -> Option<&ClassroomDetail> {
        self.detail.as_deref()
    }

    fn install(&mut self, detail: ClassroomDetail) {
        self.detail = Some(Box::new(detail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classroom_identity() {
        assert_eq!(Classroom::shallow(9), Classroom::shallow(9));
        assert_eq!(Classroom::shallow(9).to_string(), "<Classroom 9>");
    }

    #[test]
    fn test_classroom_response_deserialize() {
        let json = r#"{
            "id": 9,
            "title": "Intro to Scratch",
            "description": "Learning loops",
            "status": "Week 3",
            "date_start": "2019-09-01T00:00:00.000Z",
            "date_end": null,
            "images": {"250x150": "https://cdn2.scratch.mit.edu/get_image/classroom/9_250x150.png"},
            "educator": {"id": 3, "username": "mr_teacher"}
        }"#;

        let raw: ClassroomResponse =
            serde_json::from_str(json).expect("Failed to deserialize classroom");
        assert_eq!(raw.title, "Intro to Scratch");
        assert_eq!(raw.educator.username, "mr_teacher");
        assert!(raw.date_start.is_some());
        assert!(raw.date_end.is_none());
    }
}
