//! API status, statistics and search.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Host, ScratchClient};
use crate::error::{Result, ScratchError};
use crate::models::{summary_id, Project};
use crate::pagination::{ListParams, PagedListing};
use crate::record::GenericRecord;
use crate::traits::Entity;

/// Message the site returns for a username nobody has taken.
const USERNAME_AVAILABLE: &str = "valid username";

/// Uncategorized site-wide operations.
#[derive(Debug, Clone)]
pub struct Meta {
    client: ScratchClient,
}

/// API health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub version: String,
    /// Seconds since the API server started.
    #[serde(default)]
    pub uptime: f64,
    /// Load averages.
    #[serde(default)]
    pub load: Vec<f64>,
    #[serde(default)]
    pub sql: SqlHealth,
    #[serde(default)]
    pub cache: CacheHealth,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlHealth {
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub min: u32,
    #[serde(default)]
    pub max: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheHealth {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub ready: bool,
}

/// Result of a username availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,
    /// The site's verdict, e.g. `"username exists"`.
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct UsernameCheck {
    msg: String,
}

impl Meta {
    pub fn new(client: &ScratchClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    /// Health of the API servers.
    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<Health> {
        self.client.get_as(Host::Api, "health").await
    }

    /// The API root document.
    #[tracing::instrument(skip(self))]
    pub async fn api_info(&self) -> Result<GenericRecord> {
        match self.client.get_json(Host::Api, "").await? {
            Value::Object(fields) => Ok(GenericRecord::new("API {website}", fields)),
            other => Ok(GenericRecord::from_pairs("API", [("raw", other)])),
        }
    }

    /// Number of shared projects on the site.
    #[tracing::instrument(skip(self))]
    pub async fn project_count(&self) -> Result<u64> {
        let count: CountResponse = self.client.get_as(Host::Api, "projects/count/all").await?;
        Ok(count.count)
    }

    /// Search shared projects. Without a query the site's default ordering
    /// applies.
    pub fn search_projects(&self, query: Option<&str>, params: ListParams) -> PagedListing<Project> {
        PagedListing::new(&self.client, "search/projects".to_string(), params, |record| {
            Ok(Project::shallow(summary_id(record)?))
        })
        .with_query(query.map(str::to_string))
    }

    /// Currently popular projects.
    pub fn popular_projects(&self, params: ListParams) -> PagedListing<Project> {
        self.search_projects(None, params)
    }

    /// Search studios.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty query.
    pub fn search_studios(&self, query: &str, params: ListParams) -> Result<PagedListing<GenericRecord>> {
        if query.trim().is_empty() {
            return Err(ScratchError::Validation(
                "studio search needs a query".to_string(),
            ));
        }

        Ok(
            PagedListing::new(&self.client, "search/studios".to_string(), params, studio_record)
                .with_query(Some(query.to_string())),
        )
    }

    /// Check whether `name` can be registered.
    #[tracing::instrument(skip(self))]
    pub async fn username_available(&self, name: &str) -> Result<Availability> {
        if name.is_empty() {
            return Err(ScratchError::Validation("username must not be empty".to_string()));
        }

        let path = format!("accounts/check_username/{}/", urlencoding::encode(name));
        let checks: Vec<UsernameCheck> = self.client.get_as(Host::Site, &path).await?;
        let message = checks
            .into_iter()
            .next()
            .map(|check| check.msg)
            .ok_or_else(|| {
                ScratchError::UnexpectedResponse("empty username check response".to_string())
            })?;

        Ok(Availability {
            available: message == USERNAME_AVAILABLE,
            message,
        })
    }

    /// Version of the Scratch 2 offline editor.
    ///
    /// # Errors
    ///
    /// Always fails: the site no longer publishes the version feed.
    pub async fn offline_version(&self) -> Result<String> {
        Err(ScratchError::Unsupported("the offline editor version feed was removed"))
    }
}

fn studio_record(record: Value) -> Result<GenericRecord> {
    #[derive(Deserialize)]
    struct Summary {
        id: u64,
        #[serde(default)]
        owner: Value,
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        image: Value,
        #[serde(default)]
        history: Value,
        #[serde(default)]
        stats: Value,
    }

    let s: Summary = serde_json::from_value(record)?;
    Ok(GenericRecord::from_pairs(
        "Studio {studio_id}",
        [
            ("studio_id", Value::from(s.id)),
            ("owner", s.owner),
            ("title", Value::from(s.title)),
            ("description", Value::from(s.description)),
            ("image", s.image),
            ("created_at", s.history["created"].clone()),
            ("last_modified", s.history["modified"].clone()),
            ("followers", s.stats["followers"].clone()),
        ],
    ))
}
