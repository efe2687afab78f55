//! Failure taxonomy for probes.
//!
//! Every probe failure is a [`ProbeError`] value. The provided
//! [`Probe::run`](crate::probe::Probe::run) folds it into a
//! [`ProbeResult`] using [`ProbeError::status`], so nothing escapes a probe.

use thiserror::Error;

use crate::models::{ProbeResult, Status};

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Optional resource is absent ("not yet configured").
    #[error("{0}")]
    ConfigurationMissing(String),

    /// Resource is present but malformed.
    #[error("{0}")]
    ConfigurationInvalid(String),

    /// A required package or executable cannot be found.
    #[error("{0}")]
    DependencyMissing(String),

    /// The resource exists but opening or querying it failed.
    #[error("{0}")]
    ConnectivityFailure(String),

    /// A required path does not exist.
    #[error("{0}")]
    ResourceNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ProbeError {
    /// Status a result carrying this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            ProbeError::ConfigurationMissing(_) => Status::Warning,
            _ => Status::Failed,
        }
    }

    /// Convert into the result reported for probe `name`.
    pub fn into_result(self, name: &str) -> ProbeResult {
        ProbeResult::new(name, self.status(), self.to_string())
    }
}
