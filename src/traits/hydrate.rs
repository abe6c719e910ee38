//! Hydrate trait for populating entity references on demand.

use std::time::Duration;

use async_trait::async_trait;

use crate::client::ScratchClient;
use crate::error::{Result, ScratchError};
use crate::traits::Entity;

/// How far a hydration reaches into nested entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// Own fields plus the entity's eagerly hydrated nested fields
    /// (project author and remix parent, classroom educator, comment author).
    /// Those nested entities are themselves hydrated with [`Nesting::Shallow`].
    Eager,
    /// Own fields only; nested entities stay shallow references.
    Shallow,
}

/// Fetch and populate an entity's detail fields.
///
/// Hydration is all or nothing: the detail is built completely, including
/// nested fetches, before it replaces the previous snapshot. A failed
/// hydration leaves the entity exactly as it was.
///
/// # Example
///
/// ```no_run
/// use scratchapi::{Entity, Hydrate, Project, ScratchClient};
///
/// # async fn example() -> scratchapi::Result<()> {
/// let client = ScratchClient::new()?;
///
/// let mut project = Project::shallow(104);
/// assert!(!project.is_hydrated());
///
/// project.hydrate(&client).await?;
/// if let Some(detail) = project.detail() {
///     println!("{} by {}", detail.title, detail.author);
/// }
///
/// // Or construct and hydrate in one step
/// let project = Project::fetch(&client, 104).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Hydrate: Entity + Send + Sync {
    /// The populated fields.
    type Detail: Send + Sync;

    /// Fetch a fresh detail snapshot for `key`.
    ///
    /// # Errors
    ///
    /// Returns a remote error if the response carries an error code, or a
    /// transport error if the request or decoding fails.
    async fn fetch_detail(
        client: &ScratchClient,
        key: &Self::Key,
        nesting: Nesting,
    ) -> Result<Self::Detail>;

    /// The current snapshot, or `None` while unhydrated.
    fn detail(&self) -> Option<&Self::Detail>;

    /// Replace the current snapshot.
    fn install(&mut self, detail: Self::Detail);

    /// Whether a snapshot is present.
    fn is_hydrated(&self) -> bool {
        self.detail().is_some()
    }

    /// Fetch this entity and replace its snapshot.
    ///
    /// Never called automatically; callers decide when data is stale.
    async fn hydrate(&mut self, client: &ScratchClient) -> Result<()> {
        let detail = Self::fetch_detail(client, self.key(), Nesting::Eager).await?;
        self.install(detail);
        Ok(())
    }

    /// Like [`hydrate`](Self::hydrate), but give up after `deadline`.
    ///
    /// On timeout every in-flight request, nested ones included, is dropped
    /// and the entity is left untouched.
    async fn hydrate_within(&mut self, client: &ScratchClient, deadline: Duration) -> Result<()> {
        let fetch = Self::fetch_detail(client, self.key(), Nesting::Eager);
        let detail = tokio::time::timeout(deadline, fetch)
            .await
            .map_err(|_| ScratchError::Timeout(deadline))??;
        self.install(detail);
        Ok(())
    }

    /// Construct a reference and hydrate it immediately.
    ///
    /// # Errors
    ///
    /// Any hydration failure is returned as a construction failure.
    async fn fetch(client: &ScratchClient, key: Self::Key) -> Result<Self> {
        let mut entity = Self::shallow(key);
        entity.hydrate(client).await?;
        Ok(entity)
    }
}

/// Hydrate a nested entity with its own fields only.
pub(crate) async fn hydrated<E: Hydrate>(client: &ScratchClient, mut entity: E) -> Result<E> {
    tracing::debug!(kind = E::KIND, key = %entity.key(), "hydrating nested entity");
    let detail = E::fetch_detail(client, entity.key(), Nesting::Shallow).await?;
    entity.install(detail);
    Ok(entity)
}

pub(crate) async fn hydrated_opt<E: Hydrate>(
    client: &ScratchClient,
    entity: Option<E>,
) -> Result<Option<E>> {
    match entity {
        Some(entity) => Ok(Some(hydrated(client, entity).await?)),
        None => Ok(None),
    }
}
