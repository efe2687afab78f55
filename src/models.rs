//! Core data models for a verification pass.
//!
//! A [`ProbeResult`] is the outcome of one check; a [`RunReport`] is the
//! ordered collection of results from one run plus the derived verdict.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Outcome class of a single check.
///
/// Variants are ordered by severity so the overall verdict of a run is the
/// maximum status across its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Failed,
}

impl Status {
    /// Icon used by the text reporter.
    pub fn icon(self) -> &'static str {
        match self {
            Status::Ok => "✓",
            Status::Warning => "⚠",
            Status::Failed => "✗",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Warning => "warning",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// The outcome of one probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    /// Identifier of what was checked; matches the probe's name.
    pub name: String,
    pub status: Status,
    /// Human-readable detail. Never empty.
    pub message: String,
    /// Structured payload for richer reporting (counts, missing names, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub detail: BTreeMap<String, Value>,
}

impl ProbeResult {
    pub fn new(name: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = status.placeholder().to_string();
        }
        Self {
            name: name.into(),
            status,
            message,
            detail: BTreeMap::new(),
        }
    }

    pub fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Status::Ok, message)
    }

    pub fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Status::Warning, message)
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Status::Failed, message)
    }

    /// Attach a detail entry, builder style.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.detail.get(key).and_then(Value::as_str)
    }
}

/// Aggregate outcome of one verification pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Suite that produced this report (`check`, `connect`, `verify`, ...).
    pub suite: String,
    pub overall: Status,
    /// Results in probe declaration order.
    pub results: Vec<ProbeResult>,
}

impl RunReport {
    pub fn new(suite: impl Into<String>, results: Vec<ProbeResult>) -> Self {
        let overall = overall_status(&results);
        Self {
            suite: suite.into(),
            overall,
            results,
        }
    }

    /// Results with the given status, in order.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(move |r| r.status == status)
    }
}

/// `FAILED` if any result failed, else `WARNING` if any warned, else `OK`.
pub fn overall_status(results: &[ProbeResult]) -> Status {
    results
        .iter()
        .map(|r| r.status)
        .max()
        .unwrap_or(Status::Ok)
}
