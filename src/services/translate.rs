//! Machine translation service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{Host, ScratchClient};
use crate::error::Result;

/// The translation service used by the editor's translate extension.
#[derive(Debug, Clone)]
pub struct Translate {
    client: ScratchClient,
}

/// A language the service can translate into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct Wrapped<T> {
    result: T,
}

impl Translate {
    pub fn new(client: &ScratchClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    /// Whether the service reports itself healthy.
    ///
    /// Never fails: an unreachable service or an unexpected body counts
    /// as unhealthy.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self) -> bool {
        match self.client.get_json(Host::Translate, "").await {
            Ok(value) => value.get("ok").and_then(Value::as_bool).unwrap_or(false),
            Err(e) => {
                tracing::debug!(error = %e, "translate service unavailable");
                false
            }
        }
    }

    /// Supported languages, with names in `locale`.
    #[tracing::instrument(skip(self))]
    pub async fn languages(&self, locale: &str) -> Result<Vec<Language>> {
        let value = self
            .client
            .get_json_with_query(Host::Translate, "supported", &[("language", locale)])
            .await?;
        let wrapped: Wrapped<Vec<Language>> = serde_json::from_value(value)?;
        Ok(wrapped.result)
    }

    /// Translate `text` into `locale`.
    #[tracing::instrument(skip(self, text))]
    pub async fn translate(&self, locale: &str, text: &str) -> Result<String> {
        let value = self
            .client
            .get_json_with_query(
                Host::Translate,
                "translate",
                &[("language", locale), ("text", text)],
            )
            .await?;
        let wrapped: Wrapped<String> = serde_json::from_value(value)?;
        Ok(wrapped.result)
    }
}
