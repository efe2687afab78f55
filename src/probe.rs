//! The probe abstraction.
//!
//! A [`Probe`] checks one precondition of the environment and produces
//! exactly one [`ProbeResult`]. Implementors write the fallible
//! [`check`](Probe::check); callers always go through the provided
//! [`run`](Probe::run), which cannot fail.
//!
//! # Lifecycle
//!
//! 1. A suite builds its probes from the [`Config`](crate::config::Config),
//!    capturing every input (path, package name, URL) at construction.
//! 2. The [runner](crate::runner) calls [`run`](Probe::run) exactly once.
//! 3. The result is kept and the probe is dropped.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use rag_preflight::error::ProbeError;
//! use rag_preflight::models::ProbeResult;
//! use rag_preflight::probe::Probe;
//!
//! struct AlwaysGreen;
//!
//! #[async_trait]
//! impl Probe for AlwaysGreen {
//!     fn name(&self) -> &str { "always-green" }
//!
//!     async fn check(&self) -> Result<ProbeResult, ProbeError> {
//!         Ok(ProbeResult::ok(self.name(), "nothing to see"))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::models::ProbeResult;

/// A single, self-contained environment or connectivity check.
///
/// Probes are read-only with respect to the environment and independent of
/// each other.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Identifier reported in the [`ProbeResult::name`] field.
    fn name(&self) -> &str;

    /// Perform the check.
    ///
    /// Returning `Err` is the normal way to report a problem; the error's
    /// [`status`](ProbeError::status) decides between `WARNING` and `FAILED`.
    async fn check(&self) -> Result<ProbeResult, ProbeError>;

    /// Perform the check and fold any error into a result.
    async fn run(&self) -> ProbeResult {
        match self.check().await {
            Ok(result) => result,
            Err(e) => e.into_result(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    struct Erroring;

    #[async_trait]
    impl Probe for Erroring {
        fn name(&self) -> &str {
            "erroring"
        }

        async fn check(&self) -> Result<ProbeResult, ProbeError> {
            Err(anyhow::anyhow!("disk on fire").into())
        }
    }

    #[tokio::test]
    async fn test_run_folds_errors_into_failed_result() {
        let r = Erroring.run().await;
        assert_eq!(r.name, "erroring");
        assert_eq!(r.status, Status::Failed);
        assert!(r.message.contains("disk on fire"));
    }
}
