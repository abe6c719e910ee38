//! Lazy offset pagination over Scratch list endpoints.
//!
//! Every list endpoint takes `limit` and `offset` query parameters and
//! answers with a JSON array of summary records. [`PagedListing`] walks
//! such an endpoint one page at a time, turning each summary into a
//! shallow entity reference (or a [`GenericRecord`](crate::GenericRecord)).
//!
//! The only suspension point is immediately before a page fetch: a page
//! is requested when the consumer asks for an item and the buffered page
//! is empty. A listing ends when a page comes back empty; a short page is
//! never taken as the last one.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Host, ScratchClient};
use crate::error::{Result, ScratchError};

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 40;

/// Page size and starting offset for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Number of items per page.
    pub limit: u32,
    /// Offset of the first item.
    pub offset: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ListParams {
    /// Params with an explicit page size.
    #[must_use]
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Set the page size.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the starting offset.
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.limit == 0 || self.limit > MAX_PAGE_SIZE {
            return Err(ScratchError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.limit
            )));
        }
        Ok(())
    }
}

/// Query string sent with every page request.
#[derive(Debug, Serialize)]
struct PageQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<&'a str>,
    limit: u32,
    offset: u32,
}

type Convert<T> = Arc<dyn Fn(Value) -> Result<T> + Send + Sync>;

/// A lazy, forward-only sequence over a paginated endpoint.
///
/// Created by listing methods such as [`Project::remixes`](crate::Project::remixes).
/// Calling the listing method again yields a fresh listing starting from
/// the given offset; a single listing never rewinds.
///
/// # Example
///
/// ```no_run
/// use scratchapi::{Entity, ListParams, Project, ScratchClient};
///
/// # async fn example() -> scratchapi::Result<()> {
/// let client = ScratchClient::new()?;
/// let project = Project::shallow(104);
///
/// let mut remixes = project.remixes(&client, ListParams::with_limit(40));
/// while let Some(remix) = remixes.next().await? {
///     println!("remix: {remix}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct PagedListing<T> {
    client: ScratchClient,
    host: Host,
    path: String,
    query: Option<String>,
    params: ListParams,
    next_offset: u32,
    buffer: VecDeque<T>,
    exhausted: bool,
    pages_fetched: u32,
    convert: Convert<T>,
}

impl<T> std::fmt::Debug for PagedListing<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedListing")
            .field("path", &self.path)
            .field("query", &self.query)
            .field("limit", &self.params.limit)
            .field("next_offset", &self.next_offset)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> PagedListing<T> {
    pub(crate) fn new<F>(client: &ScratchClient, path: String, params: ListParams, convert: F) -> Self
    where
        F: Fn(Value) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            client: client.clone(),
            host: Host::Api,
            path,
            query: None,
            params,
            next_offset: params.offset,
            buffer: VecDeque::new(),
            exhausted: false,
            pages_fetched: 0,
            convert: Arc::new(convert),
        }
    }

    pub(crate) fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    /// Offset the next page request will use.
    pub fn next_offset(&self) -> u32 {
        self.next_offset
    }

    /// Whether an empty page has been seen, or no further offset fits in a `u32`.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// Number of page requests that succeeded so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Yield the next item, fetching a page only if none is buffered.
    ///
    /// Returns `Ok(None)` once the endpoint returns an empty page. A failed
    /// page fetch leaves the offset untouched, so calling `next` again
    /// retries the same page.
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if self.exhausted {
                return Ok(None);
            }
            let page = self.fetch_page().await?;
            self.buffer.extend(page);
        }
    }

    /// Yield the rest of the current page, or the next page if nothing is buffered.
    ///
    /// Returns `Ok(None)` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if !self.buffer.is_empty() {
            return Ok(Some(self.buffer.drain(..).collect()));
        }
        if self.exhausted {
            return Ok(None);
        }
        let page = self.fetch_page().await?;
        if page.is_empty() {
            Ok(None)
        } else {
            Ok(Some(page))
        }
    }

    /// Collect at most `max` items, fetching only the pages needed.
    pub async fn collect_up_to(mut self, max: usize) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while items.len() < max {
            match self.next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Collect every remaining item.
    ///
    /// Large listings can span thousands of items; prefer iterating or
    /// [`collect_up_to`](Self::collect_up_to) when the size is unknown.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Convert into a [`Stream`] that ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        stream::try_unfold(self, |mut listing| async move {
            Ok(listing.next().await?.map(|item| (item, listing)))
        })
    }

    async fn fetch_page(&mut self) -> Result<Vec<T>> {
        self.params.validate()?;

        let query = PageQuery {
            q: self.query.as_deref(),
            limit: self.params.limit,
            offset: self.next_offset,
        };

        tracing::debug!(
            path = %self.path,
            limit = query.limit,
            offset = query.offset,
            "fetching page"
        );

        let value = self
            .client
            .get_json_with_query(self.host, &self.path, &query)
            .await?;

        let records: Vec<Value> = serde_json::from_value(value)?;

        let items = records
            .into_iter()
            .map(|record| (self.convert)(record))
            .collect::<Result<Vec<T>>>()?;

        self.pages_fetched += 1;
        if items.is_empty() {
            self.exhausted = true;
        } else {
            // No page can start past u32::MAX.
            match self.next_offset.checked_add(self.params.limit) {
                Some(offset) => self.next_offset = offset,
                None => self.exhausted = true,
            }
        }

        Ok(items)
    }
}
