//! Rows shown on the site's front page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Host, ScratchClient};
use crate::error::Result;
use crate::models::{Project, User, Username};
use crate::pagination::{ListParams, PagedListing};
use crate::record::GenericRecord;
use crate::traits::Entity;

const FEATURED_PATH: &str = "proxy/featured";

/// The front page of the website.
#[derive(Debug, Clone)]
pub struct FrontPage {
    client: ScratchClient,
}

/// Every front page row, loaded with a single request.
///
/// Projects and users are shallow references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontPageRows {
    pub featured_projects: Vec<Project>,
    pub most_remixed_projects: Vec<Project>,
    pub most_loved_projects: Vec<Project>,
    pub curated_projects: Vec<CuratedProject>,
    pub design_studio_projects: Vec<DesignStudioProject>,
    /// Featured studios, labelled `Studio {studio_id}`.
    pub featured_studios: Vec<GenericRecord>,
}

/// A project picked by the current front page curator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuratedProject {
    pub project: Project,
    pub curator: User,
}

/// A project from the current design studio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignStudioProject {
    pub project: Project,
    pub studio: GenericRecord,
}

#[derive(Debug, Default, Deserialize)]
struct FeaturedResponse {
    #[serde(default)]
    community_featured_projects: Vec<ProjectRow>,
    #[serde(default)]
    community_newest_projects: Vec<ProjectRow>,
    #[serde(default)]
    community_most_remixed_projects: Vec<ProjectRow>,
    #[serde(default)]
    community_most_loved_projects: Vec<ProjectRow>,
    #[serde(default)]
    curator_top_projects: Vec<CuratorRow>,
    #[serde(default)]
    scratch_design_studio: Vec<DesignStudioRow>,
    #[serde(default)]
    community_featured_studios: Vec<StudioRow>,
}

#[derive(Debug, Deserialize)]
struct ProjectRow {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct CuratorRow {
    id: u64,
    curator_name: String,
}

#[derive(Debug, Deserialize)]
struct DesignStudioRow {
    id: u64,
    gallery_id: u64,
    #[serde(default)]
    gallery_title: String,
}

#[derive(Debug, Deserialize)]
struct StudioRow {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

fn projects(rows: Vec<ProjectRow>) -> Vec<Project> {
    rows.into_iter().map(|row| Project::shallow(row.id)).collect()
}

impl From<FeaturedResponse> for FrontPageRows {
    fn from(raw: FeaturedResponse) -> Self {
        Self {
            featured_projects: projects(raw.community_featured_projects),
            most_remixed_projects: projects(raw.community_most_remixed_projects),
            most_loved_projects: projects(raw.community_most_loved_projects),
            curated_projects: raw
                .curator_top_projects
                .into_iter()
                .map(|row| CuratedProject {
                    project: Project::shallow(row.id),
                    curator: User::shallow(Username::from(row.curator_name)),
                })
                .collect(),
            design_studio_projects: raw
                .scratch_design_studio
                .into_iter()
                .map(|row| DesignStudioProject {
                    project: Project::shallow(row.id),
                    studio: GenericRecord::from_pairs(
                        "Studio {studio_id}",
                        [
                            ("studio_id", Value::from(row.gallery_id)),
                            ("title", Value::from(row.gallery_title)),
                        ],
                    ),
                })
                .collect(),
            featured_studios: raw
                .community_featured_studios
                .into_iter()
                .map(|row| {
                    GenericRecord::from_pairs(
                        "Studio {studio_id}",
                        [
                            ("studio_id", Value::from(row.id)),
                            ("title", Value::from(row.title)),
                            ("image", row.thumbnail_url.map_or(Value::Null, Value::from)),
                        ],
                    )
                })
                .collect(),
        }
    }
}

impl FrontPage {
    pub fn new(client: &ScratchClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    /// Load every front page row.
    #[tracing::instrument(skip(self))]
    pub async fn rows(&self) -> Result<FrontPageRows> {
        let raw: FeaturedResponse = self.client.get_as(Host::Api, FEATURED_PATH).await?;
        Ok(raw.into())
    }

    /// The "newest projects" row.
    ///
    /// The site no longer shows this row and the payload may drop it at
    /// any time, in which case this returns an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn new_projects(&self) -> Result<Vec<Project>> {
        tracing::warn!("the newest projects row was removed from the front page and may disappear");
        let raw: FeaturedResponse = self.client.get_as(Host::Api, FEATURED_PATH).await?;
        Ok(projects(raw.community_newest_projects))
    }

    /// Site news, labelled `News {newsid}`.
    pub fn news(&self, params: ListParams) -> PagedListing<GenericRecord> {
        PagedListing::new(&self.client, "news".to_string(), params, news_record)
    }
}

fn news_record(record: Value) -> Result<GenericRecord> {
    #[derive(Deserialize)]
    struct News {
        id: u64,
        #[serde(default)]
        stamp: Value,
        #[serde(default)]
        headline: String,
        #[serde(default)]
        url: Value,
        #[serde(default)]
        image: Value,
        #[serde(default)]
        copy: String,
    }

    let news: News = serde_json::from_value(record)?;
    Ok(GenericRecord::from_pairs(
        "News {newsid}",
        [
            ("newsid", Value::from(news.id)),
            ("timestamp", news.stamp),
            ("title", Value::from(news.headline)),
            ("url", news.url),
            ("image", news.image),
            ("description", Value::from(news.copy)),
        ],
    ))
}
