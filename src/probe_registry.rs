//! Registered-capability probe.
//!
//! A live component (typically the MCP tool server) exposes the names of
//! what it has registered through a [`CapabilityRegistry`]. The probe only
//! asks for that list; it never inspects the component any other way.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::ProbeError;
use crate::models::ProbeResult;
use crate::probe::Probe;

/// Number of names previewed in the result message.
const PREVIEW: usize = 5;

/// Enumerates the capabilities a live component has registered.
#[async_trait]
pub trait CapabilityRegistry: Send + Sync {
    /// Where the list comes from, for messages (a URL, a label).
    fn origin(&self) -> String;

    async fn capability_names(&self) -> Result<Vec<String>>;
}

/// A fixed list, for components known at build time and for tests.
pub struct StaticRegistry {
    label: String,
    names: Vec<String>,
}

impl StaticRegistry {
    pub fn new(label: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            label: label.into(),
            names,
        }
    }
}

#[async_trait]
impl CapabilityRegistry for StaticRegistry {
    fn origin(&self) -> String {
        self.label.clone()
    }

    async fn capability_names(&self) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }
}

/// Reads `GET {base_url}/tools/list` from a running tool server.
pub struct HttpToolRegistry {
    base_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ToolListResponse {
    tools: Vec<ToolEntry>,
}

#[derive(Deserialize)]
struct ToolEntry {
    name: String,
}

impl HttpToolRegistry {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn list_url(&self) -> String {
        format!("{}/tools/list", self.base_url)
    }
}

#[async_trait]
impl CapabilityRegistry for HttpToolRegistry {
    fn origin(&self) -> String {
        self.list_url()
    }

    async fn capability_names(&self) -> Result<Vec<String>> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let url = self.list_url();

        let response = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()?;

        let body: ToolListResponse = response
            .json()
            .await
            .with_context(|| format!("unexpected response from {}", url))?;

        Ok(body.tools.into_iter().map(|t| t.name).collect())
    }
}

pub struct CapabilityProbe {
    registry: Box<dyn CapabilityRegistry>,
    required: bool,
}

impl CapabilityProbe {
    pub fn new(registry: impl CapabilityRegistry + 'static) -> Self {
        Self {
            registry: Box::new(registry),
            required: false,
        }
    }

    /// Report an unreachable registry as `FAILED` instead of `WARNING`.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[async_trait]
impl Probe for CapabilityProbe {
    fn name(&self) -> &str {
        "tools"
    }

    async fn check(&self) -> Result<ProbeResult, ProbeError> {
        let mut names = match self.registry.capability_names().await {
            Ok(names) => names,
            Err(e) => {
                let message = format!("could not list tools from {}: {:#}", self.registry.origin(), e);
                return Err(if self.required {
                    ProbeError::ConnectivityFailure(message)
                } else {
                    ProbeError::ConfigurationMissing(message)
                });
            }
        };
        names.sort();

        let mut message = format!(
            "found {} registered tool{}",
            names.len(),
            if names.len() == 1 { "" } else { "s" }
        );
        if !names.is_empty() {
            let preview: Vec<&str> = names.iter().take(PREVIEW).map(String::as_str).collect();
            message.push_str(&format!(": {}", preview.join(", ")));
            if names.len() > PREVIEW {
                message.push_str(", ...");
            }
        }

        Ok(ProbeResult::ok(self.name(), message)
            .with_detail("count", names.len())
            .with_detail("names", names))
    }
}
