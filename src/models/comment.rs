//! Comments on projects and studios.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Host, ScratchClient};
use crate::error::Result;
use crate::models::{User, UserRef, Username};
use crate::pagination::{ListParams, PagedListing};
use crate::traits::{hydrated, impl_entity_identity, Entity, Hydrate, Nesting};

/// The entity a comment thread hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommentThread {
    /// Project comments live under the project author's account.
    Project { author: Username, project_id: u64 },
    Studio { studio_id: u64 },
}

impl CommentThread {
    /// API path of the thread owner.
    pub fn path(&self) -> String {
        match self {
            Self::Project { author, project_id } => {
                format!("users/{}/projects/{project_id}", author.encoded())
            }
            Self::Studio { studio_id } => format!("studios/{studio_id}"),
        }
    }
}

impl fmt::Display for CommentThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project { project_id, .. } => write!(f, "project {project_id}"),
            Self::Studio { studio_id } => write!(f, "studio {studio_id}"),
        }
    }
}

/// Identity of a comment: its thread plus its numeric ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CommentKey {
    pub thread: CommentThread,
    pub id: u64,
}

impl fmt::Display for CommentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.id, self.thread)
    }
}

/// A comment.
///
/// Hydrating a comment also hydrates its author. Replies are only fetched
/// through [`Comment::replies`].
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    key: CommentKey,
    /// Parent comment ID, when known from a listing.
    reply_to: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Box<CommentDetail>>,
}

impl_entity_identity!(Comment);

/// Populated comment fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentDetail {
    pub content: String,
    pub parent_id: Option<u64>,
    /// User ID the comment was addressed to, for replies.
    pub commentee_id: Option<u64>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub visibility: Option<String>,
    pub reply_count: u64,
    pub author: User,
}

#[derive(Debug, Deserialize)]
struct CommentSummary {
    id: u64,
    #[serde(default)]
    parent_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    parent_id: Option<u64>,
    #[serde(default)]
    commentee_id: Option<u64>,
    #[serde(default)]
    datetime_created: Option<DateTime<Utc>>,
    #[serde(default)]
    datetime_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    reply_count: u64,
    author: UserRef,
}

impl Comment {
    pub fn id(&self) -> u64 {
        self.key.id
    }

    pub fn thread(&self) -> &CommentThread {
        &self.key.thread
    }

    fn path(&self) -> String {
        format!("{}/comments/{}", self.key.thread.path(), self.key.id)
    }

    /// Shallow reference to the comment this one replies to, if any.
    pub fn parent(&self) -> Option<Comment> {
        let parent_id = self
            .detail()
            .map_or(self.reply_to, |detail| detail.parent_id)?;
        Some(Comment::shallow(CommentKey {
            thread: self.key.thread.clone(),
            id: parent_id,
        }))
    }

    /// Replies to this comment.
    pub fn replies(&self, client: &ScratchClient, params: ListParams) -> PagedListing<Comment> {
        let thread = self.key.thread.clone();
        PagedListing::new(
            client,
            format!("{}/replies", self.path()),
            params,
            move |record| from_summary(&thread, record),
        )
    }

    /// Top-level comments of `thread`.
    pub(crate) fn listing(
        client: &ScratchClient,
        thread: CommentThread,
        params: ListParams,
    ) -> PagedListing<Comment> {
        PagedListing::new(
            client,
            format!("{}/comments", thread.path()),
            params,
            move |record| from_summary(&thread, record),
        )
    }
}

fn from_summary(thread: &CommentThread, record: Value) -> Result<Comment> {
    let summary: CommentSummary = serde_json::from_value(record)?;
    Ok(Comment {
        key: CommentKey {
            thread: thread.clone(),
            id: summary.id,
        },
        reply_to: summary.parent_id,
        detail: None,
    })
}

impl Entity for Comment {
    type Key = CommentKey;
    const KIND: &'static str = "Comment";

    fn key(&self) -> &CommentKey {
        &self.key
    }

    fn shallow(key: CommentKey) -> Self {
        Self {
            key,
            reply_to: None,
            detail: None,
        }
    }
}

#[async_trait]
impl Hydrate for Comment {
    type Detail = CommentDetail;

    #[tracing::instrument(skip(client))]
    async fn fetch_detail(
        client: &ScratchClient,
        key: &CommentKey,
        nesting: Nesting,
    ) -> Result<CommentDetail> {
        let path = format!("{}/comments/{}", key.thread.path(), key.id);
        let raw: CommentResponse = client.get_as(Host::Api, &path).await?;

        let author = User::shallow(Username::from(raw.author.username));
        let author = match nesting {
            Nesting::Eager => hydrated(client, author).await?,
            Nesting::Shallow => author,
        };

        Ok(CommentDetail {
            content: raw.content,
            parent_id: raw.parent_id,
            commentee_id: raw.commentee_id,
            created: raw.datetime_created,
            modified: raw.datetime_modified,
            visibility: raw.visibility,
            reply_count: raw.reply_count,
            author,
        })
    }

    fn detail(&self) -> Option<&CommentDetail> {
        self.detail.as_deref()
    }

    fn install(&mut self, detail: CommentDetail) {
        self.detail = Some(Box::new(detail));
    }
}
