//! Studio model and hydration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Host, ScratchClient};
use crate::error::Result;
use crate::models::{summary_id, user_from_summary, Comment, CommentThread, Project, User};
use crate::pagination::{ListParams, PagedListing};
use crate::traits::{impl_entity_identity, Entity, Hydrate, Nesting};

/// A Scratch studio.
#[derive(Debug, Clone, Serialize)]
pub struct Studio {
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Box<StudioDetail>>,
}

impl_entity_identity!(Studio);

/// Populated studio fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudioDetail {
    pub title: String,
    /// User ID of the studio host, when the API reports one.
    pub host: Option<u64>,
    pub description: String,
    pub visibility: Option<String>,
    pub public: bool,
    /// Whether anyone may add projects.
    pub open_to_all: bool,
    pub comments_allowed: bool,
    pub image: Option<String>,
    pub history: StudioHistory,
    pub stats: StudioStats,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioHistory {
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioStats {
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub managers: u64,
    #[serde(default)]
    pub projects: u64,
}

#[derive(Debug, Deserialize)]
struct StudioResponse {
    title: String,
    #[serde(default)]
    host: Option<u64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    public: bool,
    #[serde(default)]
    open_to_all: bool,
    #[serde(default)]
    comments_allowed: bool,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    history: StudioHistory,
    #[serde(default)]
    stats: StudioStats,
}

impl Studio {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Projects added to this studio.
    pub fn projects(&self, client: &ScratchClient, params: ListParams) -> PagedListing<Project> {
        PagedListing::new(
            client,
            format!("studios/{}/projects", self.id),
            params,
            |record| Ok(Project::shallow(summary_id(record)?)),
        )
    }

    pub fn curators(&self, client: &ScratchClient, params: ListParams) -> PagedListing<User> {
        PagedListing::new(
            client,
            format!("studios/{}/curators", self.id),
            params,
            user_from_summary,
        )
    }

    pub fn managers(&self, client: &ScratchClient, params: ListParams) -> PagedListing<User> {
        PagedListing::new(
            client,
            format!("studios/{}/managers", self.id),
            params,
            user_from_summary,
        )
    }

    /// Top-level comments on this studio.
    pub fn comments(&self, client: &ScratchClient, params: ListParams) -> PagedListing<Comment> {
        Comment::listing(client, self.comment_thread(), params)
    }

    pub fn comment_thread(&self) -> CommentThread {
        CommentThread::Studio { studio_id: self.id }
    }
}

impl Entity for Studio {
    type Key = u64;
    const KIND: &'static str = "Studio";

    fn key(&self) -> &u64 {
        &self.id
    }

    fn shallow(id: u64) -> Self {
        Self { id, detail: None }
    }
}

#[async_trait]
impl Hydrate for Studio {
    type Detail = StudioDetail;

    #[tracing::instrument(skip(client))]
    async fn fetch_detail(
        client: &ScratchClient,
        id: &u64,
        _nesting: Nesting,
    ) -> Result<StudioDetail> {
        let raw: StudioResponse = client.get_as(Host::Api, &format!("studios/{id}")).await?;

        Ok(StudioDetail {
            title: raw.title,
            host: raw.host,
            description: raw.description.unwrap_or_default(),
            visibility: raw.visibility,
            public: raw.public,
            open_to_all: raw.open_to_all,
            comments_allowed: raw.comments_allowed,
            image: raw.image,
            history: raw.history,
            stats: raw.stats,
            url: format!("{}studios/{id}", client.endpoints().site()),
        })
    }

    fn detail(&self) -> Option<&StudioDetail> {
        self.detail.as_deref()
    }

    fn install(&mut self, detail: StudioDetail) {
        self.detail = Some(Box::new(detail));
    }
}
