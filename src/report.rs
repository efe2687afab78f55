//! Rendering a [`RunReport`] for humans and for scripts.
//!
//! The text rendering prints one iconified line per result followed by a
//! summary. When anything is wrong the summary carries a consolidated
//! remediation list: one install command per installer covering every
//! missing package, one line per missing required path, and any hints
//! attached to non-OK results.
//!
//! The JSON rendering is the serialized report itself.
//!
//! # Exit codes
//!
//! | Overall | Exit code | With `--strict` |
//! |---------|-----------|-----------------|
//! | `OK` | 0 | 0 |
//! | `WARNING` | 0 | 1 |
//! | `FAILED` | 1 | 1 |

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use std::fmt;

use crate::models::{ProbeResult, RunReport, Status};

const RULE_WIDTH: usize = 50;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
}

pub fn exit_code(report: &RunReport, strict: bool) -> i32 {
    match report.overall {
        Status::Ok => 0,
        Status::Warning if !strict => 0,
        _ => 1,
    }
}

pub fn render_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Consolidated remediation steps for a report, in first-seen order.
pub fn remediation(report: &RunReport, install_command: &str) -> Vec<String> {
    // (installer, packages)
    let mut installs: Vec<(String, Vec<String>)> = Vec::new();
    let mut steps: Vec<String> = Vec::new();

    for r in report.with_status(Status::Failed) {
        if let Some(pkg) = r.detail_str("install_name").or(r.detail_str("missing_package")) {
            let installer = r.detail_str("installer").unwrap_or(install_command);
            match installs.iter_mut().find(|(i, _)| i == installer) {
                Some((_, pkgs)) => {
                    if !pkgs.iter().any(|p| p == pkg) {
                        pkgs.push(pkg.to_string());
                    }
                }
                None => installs.push((installer.to_string(), vec![pkg.to_string()])),
            }
        }
        if let Some(path) = r.detail_str("missing_path") {
            steps.push(format!("Create {}", path));
        }
    }

    for r in report.results.iter().filter(|r| r.status != Status::Ok) {
        if let Some(hint) = r.detail_str("hint") {
            if !steps.iter().any(|s| s == hint) {
                steps.push(hint.to_string());
            }
        }
    }

    let mut out: Vec<String> = installs
        .into_iter()
        .map(|(installer, pkgs)| format!("Install with: {} {}", installer, pkgs.join(" ")))
        .collect();
    out.extend(steps);
    out
}

pub struct TextReporter {
    install_command: String,
    color: bool,
}

impl TextReporter {
    pub fn new(install_command: impl Into<String>, color: bool) -> Self {
        Self {
            install_command: install_command.into(),
            color,
        }
    }

    fn paint(&self, text: &str, status: Status) -> String {
        if !self.color {
            return text.to_string();
        }
        match status {
            Status::Ok => text.green().to_string(),
            Status::Warning => text.yellow().to_string(),
            Status::Failed => text.red().to_string(),
        }
    }

    fn result_line(&self, f: &mut fmt::Formatter<'_>, r: &ProbeResult) -> fmt::Result {
        writeln!(
            f,
            "  {} {:<24} {}",
            self.paint(r.status.icon(), r.status),
            r.name,
            r.message
        )?;

        if let Some(value) = r.detail_str("flag_value") {
            writeln!(f, "      {}: {}", r.detail_str("flag").unwrap_or("flag"), value)?;
        }

        if let Some(Value::Array(collections)) = r.detail.get("collections") {
            for c in collections {
                let name = c.get("name").and_then(Value::as_str).unwrap_or("?");
                let docs = c.get("documents").and_then(Value::as_i64).unwrap_or(0);
                writeln!(f, "      - {}: {} documents", name, docs)?;
                if let Some(Value::Array(ids)) = c.get("sample_ids") {
                    if !ids.is_empty() {
                        let ids: Vec<&str> = ids.iter().filter_map(Value::as_str).collect();
                        writeln!(f, "        sample ids: {}", ids.join(", "))?;
                    }
                }
                if let Some(meta) = c.get("sample_metadata") {
                    writeln!(f, "        sample metadata: {}", meta)?;
                }
            }
        }
        Ok(())
    }

    /// A displayable view of `report`.
    pub fn display<'a>(&'a self, report: &'a RunReport) -> Rendered<'a> {
        Rendered {
            reporter: self,
            report,
        }
    }

    pub fn render(&self, report: &RunReport) -> String {
        self.display(report).to_string()
    }
}

/// Text rendering of one report, see [`TextReporter::display`].
pub struct Rendered<'a> {
    reporter: &'a TextReporter,
    report: &'a RunReport,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (reporter, report) = (self.reporter, self.report);
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "Pre-flight: {}", report.suite)?;
        writeln!(f, "{}", rule)?;
        for r in &report.results {
            reporter.result_line(f, r)?;
        }
        writeln!(f, "{}", rule)?;

        if report.overall == Status::Ok {
            return writeln!(
                f,
                "{}",
                reporter.paint("All checks passed. Setup is ready.", Status::Ok)
            );
        }

        let failed = report.with_status(Status::Failed).count();
        let warned = report.with_status(Status::Warning).count();
        writeln!(
            f,
            "{}",
            reporter.paint(
                &format!(
                    "Some issues found: {} failed, {} warning{}.",
                    failed,
                    warned,
                    if warned == 1 { "" } else { "s" }
                ),
                report.overall
            )
        )?;
        for step in remediation(report, &reporter.install_command) {
            writeln!(f, "  - {}", step)?;
        }
        Ok(())
    }
}
