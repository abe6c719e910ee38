//! Project model and hydration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWrite;

use crate::client::{Endpoints, Host, ScratchClient};
use crate::error::{Result, ScratchError};
use crate::models::{summary_id, Comment, CommentThread, Studio, User, UserRef, Username};
use crate::pagination::{ListParams, PagedListing};
use crate::traits::{hydrated, hydrated_opt, impl_entity_identity, Entity, Hydrate, Nesting};

/// A Scratch project.
///
/// Hydrating a project also hydrates its author and its remix parent
/// (one extra request each). The remix root is kept as a shallow
/// reference: it can be arbitrarily many remix generations away.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Box<ProjectDetail>>,
}

impl_entity_identity!(Project);

/// Populated project fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    pub title: String,
    pub description: String,
    pub instructions: String,
    /// Visibility state, e.g. `"visible"`.
    pub visibility: Option<String>,
    pub public: bool,
    pub comments_allowed: bool,
    /// The project's creator.
    pub author: User,
    /// Thumbnail URL.
    pub image: Option<String>,
    pub history: ProjectHistory,
    pub stats: ProjectStats,
    /// The project this one was remixed from, if any.
    pub parent: Option<Project>,
    /// The first project of the remix chain, if this is a remix. Never hydrated.
    pub root: Option<Project>,
    /// Short-lived token needed to download the project JSON.
    pub project_token: Option<String>,
    pub links: ProjectLinks,
}

impl ProjectDetail {
    /// Alias of `description` ("Notes and Credits" on the site).
    pub fn notes(&self) -> &str {
        &self.description
    }

    /// Alias of `description`.
    pub fn credits(&self) -> &str {
        &self.description
    }

    pub fn remix_count(&self) -> u64 {
        self.stats.remixes
    }

    pub fn is_remix(&self) -> bool {
        self.parent.is_some()
    }
}

/// Project timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectHistory {
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shared: Option<DateTime<Utc>>,
}

/// Project counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub loves: u64,
    #[serde(default)]
    pub favorites: u64,
    #[serde(default)]
    pub remixes: u64,
    #[serde(default)]
    pub comments: u64,
}

/// Website links derived from a project ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectLinks {
    pub url: String,
    pub remixes_url: String,
    pub remixtree_url: String,
    pub studios_url: String,
    pub see_inside_url: String,
    pub fullscreen_url: String,
    pub embed_url: String,
    /// `<iframe>` markup embedding the player.
    pub embed_html: String,
    pub preview_url: String,
}

impl ProjectLinks {
    pub fn new(endpoints: &Endpoints, id: u64) -> Self {
        let url = format!("{}projects/{id}", endpoints.site());
        let embed_url = format!("{}projects/embed/{id}", endpoints.site());
        let embed_html = format!(
            "<iframe\n    allowtransparency=\"true\"\n    width=\"485\"\n    height=\"402\"\n    \
             src=\"{embed_url}?autostart=false\"\n    frameborder=\"0\"\n    allowfullscreen\n></iframe>"
        );

        Self {
            remixes_url: format!("{url}/remixes"),
            remixtree_url: format!("{url}/remixtree"),
            studios_url: format!("{url}/studios"),
            see_inside_url: format!("{url}#editor"),
            fullscreen_url: format!("{url}#fullscreen"),
            preview_url: format!("{}#{id}", endpoints.preview()),
            embed_html,
            embed_url,
            url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    public: bool,
    #[serde(default)]
    comments_allowed: bool,
    author: UserRef,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    history: ProjectHistory,
    #[serde(default)]
    stats: ProjectStats,
    #[serde(default)]
    remix: RemixResponse,
    #[serde(default)]
    project_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RemixResponse {
    #[serde(default)]
    parent: Option<u64>,
    #[serde(default)]
    root: Option<u64>,
}

impl Project {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Links for this project; available without hydration.
    pub fn links(&self, endpoints: &Endpoints) -> ProjectLinks {
        ProjectLinks::new(endpoints, self.id)
    }

    /// Remixes of this project.
    pub fn remixes(&self, client: &ScratchClient, params: ListParams) -> PagedListing<Project> {
        PagedListing::new(
            client,
            format!("projects/{}/remixes", self.id),
            params,
            |record| Ok(Project::shallow(summary_id(record)?)),
        )
    }

    /// Studios this project was added to.
    pub fn studios(&self, client: &ScratchClient, params: ListParams) -> PagedListing<Studio> {
        PagedListing::new(
            client,
            format!("projects/{}/studios", self.id),
            params,
            |record| Ok(Studio::shallow(summary_id(record)?)),
        )
    }

    /// Top-level comments on this project.
    ///
    /// Comment paths live under the author's account, so the project must
    /// be hydrated first.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the project is not hydrated.
    pub fn comments(
        &self,
        client: &ScratchClient,
        params: ListParams,
    ) -> Result<PagedListing<Comment>> {
        let thread = self.comment_thread()?;
        Ok(Comment::listing(client, thread, params))
    }

    /// The comment thread of this project.
    pub fn comment_thread(&self) -> Result<CommentThread> {
        let detail = self.detail().ok_or_else(|| {
            ScratchError::Validation(format!(
                "project {} must be hydrated before its comments can be listed",
                self.id
            ))
        })?;
        Ok(CommentThread::Project {
            author: detail.author.username().clone(),
            project_id: self.id,
        })
    }

    /// Stream the project JSON into `writer`.
    ///
    /// Uses the project token when the project is hydrated. Returns the
    /// number of bytes written.
    pub async fn download_json<W>(&self, client: &ScratchClient, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut url = client.url(Host::Projects, &self.id.to_string())?;
        if let Some(token) = self.detail().and_then(|d| d.project_token.as_deref()) {
            url.query_pairs_mut().append_pair("token", token);
        }
        client.download_to(url, writer).await
    }

    /// Stream the thumbnail image into `writer`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the project is not hydrated or has no
    /// thumbnail.
    pub async fn download_thumbnail<W>(&self, client: &ScratchClient, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let image = self
            .detail()
            .and_then(|d| d.image.as_deref())
            .ok_or_else(|| {
                ScratchError::Validation(format!("project {} has no known thumbnail", self.id))
            })?;
        let url = url::Url::parse(image)?;
        client.download_to(url, writer).await
    }
}

impl Entity for Project {
    type Key = u64;
    const KIND: &'static str = "Project";

    fn key(&self) -> &u64 {
        &self.id
    }

    fn shallow(id: u64) -> Self {
        Self { id, detail: None }
    }
}

#[async_trait]
impl Hydrate for Project {
    type Detail = ProjectDetail;

    #[tracing::instrument(skip(client))]
    async fn fetch_detail(
        client: &ScratchClient,
        id: &u64,
        nesting: Nesting,
    ) -> Result<ProjectDetail> {
        let raw: ProjectResponse = client.get_as(Host::Api, &format!("projects/{id}")).await?;

        let author = User::shallow(Username::from(raw.author.username));
        let parent = raw.remix.parent.map(Project::shallow);
        let root = raw.remix.root.map(Project::shallow);

        let (author, parent) = match nesting {
            Nesting::Shallow => (author, parent),
            Nesting::Eager => {
                tokio::try_join!(hydrated(client, author), hydrated_opt(client, parent))?
            }
        };

        Ok(ProjectDetail {
            title: raw.title,
            description: raw.description.unwrap_or_default(),
            instructions: raw.instructions.unwrap_or_default(),
            visibility: raw.visibility,
            public: raw.public,
            comments_allowed: raw.comments_allowed,
            author,
            image: raw.image,
            history: raw.history,
            stats: raw.stats,
            parent,
            root,
            project_token: raw.project_token,
            links: ProjectLinks::new(client.endpoints(), *id),
        })
    }

    fn detail(&self) -> Option<&ProjectDetail> {
        self.detail.as_deref()
    }

    fn install(&mut self, detail: ProjectDetail) {
        self.detail = Some(Box::new(detail));
    }
}
