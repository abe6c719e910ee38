//! User model and hydration.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Host, ScratchClient};
use crate::error::Result;
use crate::models::{summary_id, Project, Studio, UserRef};
use crate::pagination::{ListParams, PagedListing};
use crate::record::GenericRecord;
use crate::traits::{impl_entity_identity, Entity, Hydrate, Nesting};

/// A Scratch username.
///
/// Comparison and hashing ignore ASCII case, matching how the site
/// resolves usernames; the original spelling is preserved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The username percent-encoded for use as a path segment.
    pub(crate) fn encoded(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl PartialEq for Username {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Username {}

impl Hash for Username {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Username {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A Scratch user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    username: Username,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Box<UserDetail>>,
}

impl_entity_identity!(User);

/// Populated user fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetail {
    /// Numeric account ID.
    pub id: u64,
    /// Username as spelled by the server.
    pub username: String,
    /// Whether the account belongs to the Scratch Team.
    pub scratchteam: bool,
    pub joined: Option<DateTime<Utc>>,
    /// Avatar URLs keyed by size, e.g. `"90x90"`.
    pub images: BTreeMap<String, String>,
    pub status: String,
    pub bio: String,
    pub country: String,
    /// Profile page on the website.
    pub url: String,
}

impl UserDetail {
    /// Alias of `joined`.
    pub fn joined_at(&self) -> Option<DateTime<Utc>> {
        self.joined
    }

    /// Alias of `status`.
    pub fn about_me(&self) -> &str {
        &self.status
    }

    /// Alias of `bio`.
    pub fn what_im_working_on(&self) -> &str {
        &self.bio
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: u64,
    username: String,
    #[serde(default)]
    scratchteam: bool,
    #[serde(default)]
    history: UserHistory,
    #[serde(default)]
    profile: UserProfile,
}

#[derive(Debug, Default, Deserialize)]
struct UserHistory {
    #[serde(default)]
    joined: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct UserProfile {
    #[serde(default)]
    images: BTreeMap<String, String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

impl User {
    pub fn username(&self) -> &Username {
        &self.username
    }

    fn path(&self) -> String {
        format!("users/{}", self.username.encoded())
    }

    /// Projects shared by this user.
    pub fn projects(&self, client: &ScratchClient, params: ListParams) -> PagedListing<Project> {
        PagedListing::new(client, format!("{}/projects", self.path()), params, |record| {
            Ok(Project::shallow(summary_id(record)?))
        })
    }

    /// Projects this user favorited.
    pub fn favorites(&self, client: &ScratchClient, params: ListParams) -> PagedListing<Project> {
        PagedListing::new(client, format!("{}/favorites", self.path()), params, |record| {
            Ok(Project::shallow(summary_id(record)?))
        })
    }

    /// Users following this user.
    pub fn followers(&self, client: &ScratchClient, params: ListParams) -> PagedListing<User> {
        PagedListing::new(
            client,
            format!("{}/followers", self.path()),
            params,
            user_from_summary,
        )
    }

    /// Users this user follows.
    pub fn following(&self, client: &ScratchClient, params: ListParams) -> PagedListing<User> {
        PagedListing::new(
            client,
            format!("{}/following", self.path()),
            params,
            user_from_summary,
        )
    }

    /// Studios this user curates.
    pub fn curated_studios(&self, client: &ScratchClient, params: ListParams) -> PagedListing<Studio> {
        PagedListing::new(
            client,
            format!("{}/studios/curate", self.path()),
            params,
            |record| Ok(Studio::shallow(summary_id(record)?)),
        )
    }

    /// Number of unread messages in this user's inbox.
    #[tracing::instrument(skip(self, client), fields(user = %self.username))]
    pub async fn unread_message_count(&self, client: &ScratchClient) -> Result<u64> {
        let path = format!("{}/messages/count", self.path());
        let count: CountResponse = client.get_as(Host::Api, &path).await?;
        Ok(count.count)
    }

    /// This user's inbox. Needs a client logged in as this user.
    ///
    /// # Errors
    ///
    /// Returns an auth error if `client` has no session for this user.
    pub fn messages(
        &self,
        client: &ScratchClient,
        params: ListParams,
    ) -> Result<PagedListing<GenericRecord>> {
        client.require_session_for(self.username.as_str())?;
        Ok(PagedListing::new(
            client,
            format!("{}/messages", self.path()),
            params,
            |record| match record {
                Value::Object(fields) => Ok(GenericRecord::new("Message {id} {type}", fields)),
                other => Ok(GenericRecord::from_pairs("Message {id}", [("raw", other)])),
            },
        ))
    }
}

pub(crate) fn user_from_summary(record: Value) -> Result<User> {
    let summary: UserRef = serde_json::from_value(record)?;
    Ok(User::shallow(Username::from(summary.username)))
}

impl Entity for User {
    type Key = Username;
    const KIND: &'static str = "User";

    fn key(&self) -> &Username {
        &self.username
    }

    fn shallow(username: Username) -> Self {
        Self {
            username,
            detail: None,
        }
    }
}

#[async_trait]
impl Hydrate for User {
    type Detail = UserDetail;

    #[tracing::instrument(skip(client))]
    async fn fetch_detail(
        client: &ScratchClient,
        username: &Username,
        _nesting: Nesting,
    ) -> Result<UserDetail> {
        let path = format!("users/{}", username.encoded());
        let raw: UserResponse = client.get_as(Host::Api, &path).await?;

        Ok(UserDetail {
            url: format!("{}users/{}", client.endpoints().site(), raw.username),
            id: raw.id,
            username: raw.username,
            scratchteam: raw.scratchteam,
            joined: raw.history.joined,
            images: raw.profile.images,
            status: raw.profile.status.unwrap_or_default(),
            bio: raw.profile.bio.unwrap_or_default(),
            country: raw.profile.country.unwrap_or_default(),
        })
    }

    fn detail(&self) -> Option<&UserDetail> {
        self.detail.as_deref()
    }

    fn install(&mut self, detail: UserDetail) {
        self.detail = Some(Box::new(detail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_username_case_insensitive() {
        assert_eq!(Username::from("Griffpatch"), Username::from("griffpatch"));
        assert_ne!(Username::from("griffpatch"), Username::from("griffpatch_"));

        let mut set = HashSet::new();
        set.insert(User::shallow("ScratchCat".into()));
        assert!(set.contains(&User::shallow("scratchcat".into())));
    }

    #[test]
    fn test_username_keeps_spelling() {
        let user = User::shallow("ScratchCat".into());
        assert_eq!(user.username().as_str(), "ScratchCat");
        assert_eq!(user.to_string(), "<User ScratchCat>");
    }

    #[test]
    fn test_username_encoding() {
        assert_eq!(Username::from("a b").encoded(), "a%20b");
        assert_eq!(Username::from("user_1-x").encoded(), "user_1-x");
    }

    #[test]
    fn test_shallow_user_is_unhydrated() {
        let user = User::shallow("abc".into());
        assert!(!user.is_hydrated());
        assert!(user.detail().is_none());
    }

    #[test]
    fn test_user_response_deserialize() {
        let json = r#"{
            "id": 1882674,
            "username": "griffpatch",
            "scratchteam": false,
            "history": {"joined": "2012-10-24T12:59:32.000Z"},
            "profile": {
                "id": null,
                "images": {"90x90": "https://cdn2.scratch.mit.edu/get_image/user/1882674_90x90.png"},
                "status": "Making games",
                "bio": "Hi!",
                "country": "United Kingdom"
            }
        }"#;

        let raw: UserResponse = serde_json::from_str(json).expect("Failed to deserialize user");
        assert_eq!(raw.id, 1882674);
        assert_eq!(raw.username, "griffpatch");
        assert!(raw.history.joined.is_some());
        assert_eq!(raw.profile.images.len(), 1);
        assert_eq!(raw.profile.country.as_deref(), Some("United Kingdom"));
    }
}
