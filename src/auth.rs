//! Session login against the Scratch website.
//!
//! Login is a two step exchange with the site host: fetching the CSRF
//! cookie, then posting the credentials with that token echoed in a
//! header. A successful login yields an API token that authenticated
//! requests send as `X-Token`.

use cookie::Cookie;
use reqwest::cookie::CookieStore;
use serde::{Deserialize, Serialize};

use crate::client::{Host, ScratchClient};
use crate::error::{Result, ScratchError};

const CSRF_COOKIE: &str = "scratchcsrftoken";

/// Credentials obtained from a successful login.
#[derive(Clone)]
pub struct Session {
    username: String,
    token: String,
    csrf_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// The username the session belongs to, as spelled by the server.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The API token sent as `X-Token`.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The CSRF token issued for this session.
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    use_messages: bool,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    success: u8,
    #[serde(default)]
    msg: String,
}

impl ScratchClient {
    /// Log in and return a client carrying the resulting session.
    ///
    /// The original client is left unauthenticated; both share the same
    /// connection pool and cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`ScratchError::Auth`] if the site rejects the credentials
    /// or never issues a CSRF cookie.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<ScratchClient> {
        let csrf_url = self.url(Host::Site, "csrf_token/")?;
        self.http()
            .get(csrf_url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?
            .error_for_status()?;

        let site = self.url(Host::Site, "")?;
        let csrf_token = self
            .csrf_cookie(&site)
            .ok_or_else(|| ScratchError::Auth("no CSRF cookie issued".to_string()))?;

        let login_url = self.url(Host::Site, "login/")?;
        let response = self
            .http()
            .post(login_url)
            .header("X-CSRFToken", &csrf_token)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Referer", site.as_str())
            .json(&LoginRequest {
                username,
                password,
                use_messages: true,
            })
            .send()
            .await?;

        // Rejected logins come back as 403 with the usual reply body.
        let status = response.status();
        let body = response.text().await?;
        let replies: Vec<LoginResponse> = match serde_json::from_str(&body) {
            Ok(replies) => replies,
            Err(_) if !status.is_success() => {
                return Err(ScratchError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => return Err(e.into()),
        };
        let reply = replies
            .into_iter()
            .next()
            .ok_or_else(|| ScratchError::Auth("empty login response".to_string()))?;

        match reply {
            LoginResponse {
                success: 1,
                token: Some(token),
                username: name,
                ..
            } => {
                tracing::info!(user = username, "logged in");
                // Login may rotate the CSRF cookie.
                let csrf_token = self.csrf_cookie(&site).unwrap_or(csrf_token);
                Ok(self.with_session(Session {
                    username: name.unwrap_or_else(|| username.to_string()),
                    token,
                    csrf_token,
                }))
            }
            LoginResponse { msg, .. } => Err(ScratchError::Auth(if msg.is_empty() {
                "login rejected".to_string()
            } else {
                msg
            })),
        }
    }

    fn csrf_cookie(&self, site: &url::Url) -> Option<String> {
        let header = self.jar().cookies(site)?;
        let header = header.to_str().ok()?;
        Cookie::split_parse(header)
            .filter_map(|c| c.ok())
            .find(|c| c.name() == CSRF_COOKIE)
            .map(|c| c.value().to_string())
    }

    /// Require a session belonging to `username` (case-insensitive).
    pub(crate) fn require_session_for(&self, username: &str) -> Result<&Session> {
        match self.session() {
            Some(session) if session.username().eq_ignore_ascii_case(username) => Ok(session),
            Some(session) => Err(ScratchError::Auth(format!(
                "logged in as {}, not {username}",
                session.username()
            ))),
            None => Err(ScratchError::Auth(format!(
                "an authenticated session for {username} is required"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session {
            username: "griffpatch".to_string(),
            token: "secret-token".to_string(),
            csrf_token: "csrf".to_string(),
        };
        let debug = format!("{session:?}");
        assert!(debug.contains("griffpatch"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_login_request_shape() {
        let body = serde_json::to_value(LoginRequest {
            username: "a",
            password: "b",
            use_messages: true,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"username": "a", "password": "b", "useMessages": true})
        );
    }

    #[test]
    fn test_session_required() {
        let client = ScratchClient::new().unwrap();
        let err = client.require_session_for("someone").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Auth);
    }
}
