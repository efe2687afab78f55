//! Document store connectivity probe.
//!
//! Opens the store read-only under a timeout and lists its collections.
//! Connection can fail for reasons unrelated to the path's existence
//! (corrupt file, foreign schema, lock contention); the underlying error
//! text is reported verbatim in the result message.

use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

use crate::db::{resolve_store_path, CollectionInfo, StoreClient};
use crate::error::ProbeError;
use crate::models::{ProbeResult, Status};
use crate::probe::Probe;

pub struct DatabaseConnectivityProbe {
    path: PathBuf,
    timeout: Duration,
    default_collection: Option<String>,
}

impl DatabaseConnectivityProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: Duration::from_secs(5),
            default_collection: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Also look up this collection; its absence is reported as a warning.
    pub fn with_default_collection(mut self, name: impl Into<String>) -> Self {
        self.default_collection = Some(name.into());
        self
    }

    async fn inspect(
        &self,
        path: &std::path::Path,
    ) -> anyhow::Result<(Vec<CollectionInfo>, Option<Option<CollectionInfo>>)> {
        let client = StoreClient::open(path, self.timeout).await?;
        let collections = client.list_collections().await?;
        let default = match &self.default_collection {
            Some(name) => Some(client.collection(name).await?),
            None => None,
        };
        client.close().await;
        Ok((collections, default))
    }
}

#[async_trait]
impl Probe for DatabaseConnectivityProbe {
    fn name(&self) -> &str {
        "store"
    }

    async fn check(&self) -> Result<ProbeResult, ProbeError> {
        let path = resolve_store_path(&self.path);
        let shown = path.display().to_string();

        if !path.exists() {
            return Ok(ProbeError::ResourceNotFound(format!(
                "document store not found: {}",
                shown
            ))
            .into_result(self.name())
            .with_detail("missing_path", shown)
            .with_detail("hint", "Run ingestion first to create the store"));
        }

        tracing::debug!(path = %shown, timeout = ?self.timeout, "opening store");
        let (collections, default) = match tokio::time::timeout(self.timeout, self.inspect(&path))
            .await
        {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                return Err(ProbeError::ConnectivityFailure(format!(
                    "connection failed: {:#}",
                    e
                )))
            }
            Err(_) => {
                return Err(ProbeError::ConnectivityFailure(format!(
                    "connection timed out after {}s",
                    self.timeout.as_secs_f64()
                )))
            }
        };

        let total: i64 = collections.iter().map(|c| c.documents).sum();
        let mut result = ProbeResult::ok(
            self.name(),
            format!(
                "connected to {} ({} collection{}, {} document{})",
                shown,
                collections.len(),
                if collections.len() == 1 { "" } else { "s" },
                total,
                if total == 1 { "" } else { "s" },
            ),
        )
        .with_detail("path", shown)
        .with_detail("collection_count", collections.len())
        .with_detail("collections", json!(collections));

        if let (Some(name), Some(found)) = (&self.default_collection, default) {
            match found {
                Some(info) => {
                    result = result.with_detail("default_collection_documents", info.documents);
                }
                None => {
                    result.status = Status::Warning;
                    result.message =
                        format!("{}; default collection '{}' not found", result.message, name);
                }
            }
            result = result.with_detail("default_collection", name.clone());
        }

        Ok(result)
    }
}
