//! Scratch API client.
//!
//! Low-level HTTP client that owns the connection pool, the cookie jar and
//! the host configuration. Entity hydration and listings are built on top
//! of it via the traits in [`crate::traits`].

use std::env;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::cookie::Jar;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::auth::Session;
use crate::error::{Result, ScratchError};

const DEFAULT_API_URL: &str = "https://api.scratch.mit.edu/";
const DEFAULT_SITE_URL: &str = "https://scratch.mit.edu/";
const DEFAULT_PROJECTS_URL: &str = "https://projects.scratch.mit.edu/";
const DEFAULT_TRANSLATE_URL: &str = "https://translate-service.scratch.mit.edu/";
const DEFAULT_PREVIEW_URL: &str = "https://preview.scratch.mit.edu/";
const USER_AGENT: &str = concat!("scratchapi/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The remote hosts the library talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    /// REST API (`api.scratch.mit.edu`).
    Api,
    /// Main website (`scratch.mit.edu`), used for login and account checks.
    Site,
    /// Project asset storage (`projects.scratch.mit.edu`).
    Projects,
    /// Translation service.
    Translate,
}

/// Base URLs for every Scratch host.
///
/// Each base always ends with `/` so relative paths join underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api: String,
    site: String,
    projects: String,
    translate: String,
    preview: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: DEFAULT_API_URL.to_string(),
            site: DEFAULT_SITE_URL.to_string(),
            projects: DEFAULT_PROJECTS_URL.to_string(),
            translate: DEFAULT_TRANSLATE_URL.to_string(),
            preview: DEFAULT_PREVIEW_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Build endpoints from explicit base URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if any base URL is invalid.
    pub fn new(
        api: &str,
        site: &str,
        projects: &str,
        translate: &str,
        preview: &str,
    ) -> Result<Self> {
        Ok(Self {
            api: normalize_base(api)?,
            site: normalize_base(site)?,
            projects: normalize_base(projects)?,
            translate: normalize_base(translate)?,
            preview: normalize_base(preview)?,
        })
    }

    /// Route every host to the same base URL.
    ///
    /// Handy for mock servers and local proxies.
    pub fn all(base: &str) -> Result<Self> {
        Self::new(base, base, base, base, base)
    }

    /// Base URL of a host.
    pub fn base(&self, host: Host) -> &str {
        match host {
            Host::Api => &self.api,
            Host::Site => &self.site,
            Host::Projects => &self.projects,
            Host::Translate => &self.translate,
        }
    }

    /// Base URL of the public website.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Base URL of the standalone project player.
    pub fn preview(&self) -> &str {
        &self.preview
    }
}

fn normalize_base(base: &str) -> Result<String> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    Url::parse(&base)?;
    Ok(base)
}

/// Low-level Scratch API client.
///
/// This struct is cheaply cloneable; clones share the connection pool,
/// the cookie jar and the session.
///
/// # Example
///
/// ```no_run
/// use scratchapi::{Endpoints, ScratchClient};
///
/// # fn example() -> scratchapi::Result<()> {
/// // Public scratch.mit.edu hosts
/// let client = ScratchClient::new()?;
///
/// // Or point everything at a proxy
/// let client = ScratchClient::with_endpoints(Endpoints::all("http://localhost:8080")?)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ScratchClient {
    http: Client,
    jar: Arc<Jar>,
    endpoints: Arc<Endpoints>,
    session: Option<Arc<Session>>,
}

impl std::fmt::Debug for ScratchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchClient")
            .field("api_url", &self.endpoints.api)
            .field("site_url", &self.endpoints.site)
            .field("user", &self.session.as_ref().map(|s| s.username()))
            .finish_non_exhaustive()
    }
}

impl ScratchClient {
    /// Create a client for the public Scratch hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_endpoints(Endpoints::default())
    }

    /// Create a client from environment variables.
    ///
    /// Reads `SCRATCH_API_URL`, `SCRATCH_SITE_URL`, `SCRATCH_PROJECTS_URL`,
    /// `SCRATCH_TRANSLATE_URL` and `SCRATCH_PREVIEW_URL`; any unset variable
    /// falls back to the public host.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is invalid.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str, default: &str| env::var(name).unwrap_or_else(|_| default.to_string());

        let endpoints = Endpoints::new(
            &var("SCRATCH_API_URL", DEFAULT_API_URL),
            &var("SCRATCH_SITE_URL", DEFAULT_SITE_URL),
            &var("SCRATCH_PROJECTS_URL", DEFAULT_PROJECTS_URL),
            &var("SCRATCH_TRANSLATE_URL", DEFAULT_TRANSLATE_URL),
            &var("SCRATCH_PREVIEW_URL", DEFAULT_PREVIEW_URL),
        )?;

        Self::with_endpoints(endpoints)
    }

    /// Create a client with explicit endpoints.
    pub fn with_endpoints(endpoints: Endpoints) -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .cookie_provider(Arc::clone(&jar))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ScratchError::HttpError)?;

        Ok(Self {
            http,
            jar,
            endpoints: Arc::new(endpoints),
            session: None,
        })
    }

    /// The configured endpoints.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The authenticated session, if this client has logged in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_deref()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn jar(&self) -> &Jar {
        &self.jar
    }

    pub(crate) fn with_session(&self, session: Session) -> Self {
        Self {
            session: Some(Arc::new(session)),
            ..self.clone()
        }
    }

    /// Resolve a path relative to a host.
    pub fn url(&self, host: Host, path: &str) -> Result<Url> {
        Ok(Url::parse(self.endpoints.base(host))?.join(path)?)
    }

    /// Make a GET request and decode the JSON body.
    #[tracing::instrument(skip(self))]
    pub async fn get_json(&self, host: Host, path: &str) -> Result<Value> {
        let url = self.url(host, path)?;
        let response = self
            .authorize(host, self.http.get(url))
            .send()
            .await
            .map_err(ScratchError::HttpError)?;

        Self::read_json(response).await
    }

    /// Make a GET request with query parameters and decode the JSON body.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<Q: Serialize + ?Sized>(
        &self,
        host: Host,
        path: &str,
        query: &Q,
    ) -> Result<Value> {
        let url = self.url(host, path)?;
        let response = self
            .authorize(host, self.http.get(url).query(query))
            .send()
            .await
            .map_err(ScratchError::HttpError)?;

        Self::read_json(response).await
    }

    /// GET a JSON document and deserialize it into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, host: Host, path: &str) -> Result<T> {
        let value = self.get_json(host, path).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Stream a response body into `writer` without buffering it whole.
    ///
    /// Returns the number of bytes written.
    #[tracing::instrument(skip(self, writer))]
    pub async fn download_to<W>(&self, url: Url, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScratchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        tracing::debug!(bytes = written, "download complete");
        Ok(written)
    }

    fn authorize(&self, host: Host, request: RequestBuilder) -> RequestBuilder {
        match (&self.session, host) {
            (Some(session), Host::Api) => request.header("X-Token", session.token()),
            _ => request,
        }
    }

    /// Decode a response body, surfacing in-body error codes first.
    pub(crate) async fn read_json(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                if let Some(err) = remote_error(&value) {
                    return Err(err);
                }
                if !status.is_success() {
                    return Err(ScratchError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }
                Ok(value)
            }
            Err(_) if !status.is_success() => Err(ScratchError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(ScratchError::ParseError(e)),
        }
    }
}

/// Detect the `{"code": ..., "message": ...}` error shape.
pub(crate) fn remote_error(value: &Value) -> Option<ScratchError> {
    let object = value.as_object()?;
    let code = match object.get("code")? {
        Value::String(code) => code.clone(),
        other => other.to_string(),
    };
    let message = object
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(ScratchError::Remote { code, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_debug() {
        let client = ScratchClient::new().unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("ScratchClient"));
        assert!(debug.contains("api.scratch.mit.edu"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let a = Endpoints::all("http://localhost:9000").unwrap();
        let b = Endpoints::all("http://localhost:9000/").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.base(Host::Api), "http://localhost:9000/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(Endpoints::all("not a url").is_err());
    }

    #[test]
    fn test_url_join() {
        let client = ScratchClient::new().unwrap();
        let url = client.url(Host::Api, "projects/123").unwrap();
        assert_eq!(url.as_str(), "https://api.scratch.mit.edu/projects/123");

        let url = client.url(Host::Site, "accounts/check_username/abc/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://scratch.mit.edu/accounts/check_username/abc/"
        );
    }

    #[test]
    fn test_remote_error_detection() {
        let err = remote_error(&json!({"code": "NotFound", "message": ""})).unwrap();
        assert!(err.is_not_found());

        let err = remote_error(&json!({"code": 503, "message": "maintenance"})).unwrap();
        match err {
            ScratchError::Remote { code, message } => {
                assert_eq!(code, "503");
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(remote_error(&json!({"id": 1, "title": "x"})).is_none());
        assert!(remote_error(&json!([{"code": "en", "name": "English"}])).is_none());
    }
}
