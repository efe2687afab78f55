//! Sequential probe runner.
//!
//! Runs every probe exactly once, in declaration order, and never stops
//! early: a failed probe does not prevent the next one from running. A probe
//! that panics is recorded as `FAILED` with the panic message.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::models::{ProbeResult, RunReport};
use crate::probe::Probe;

pub async fn run_probes(suite: &str, probes: &[Box<dyn Probe>]) -> RunReport {
    let mut results = Vec::with_capacity(probes.len());

    for probe in probes {
        let result = match AssertUnwindSafe(probe.run()).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => ProbeResult::failed(
                probe.name(),
                format!("probe panicked: {}", panic_message(payload.as_ref())),
            ),
        };
        tracing::debug!(
            probe = %result.name,
            status = %result.status,
            message = %result.message,
            "probe finished"
        );
        results.push(result);
    }

    let report = RunReport::new(suite, results);
    tracing::info!(suite, overall = %report.overall, probes = report.results.len(), "run complete");
    report
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
