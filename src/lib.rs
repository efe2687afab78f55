//! # rag-preflight
//!
//! Pre-flight environment and connectivity checks for a local-first RAG
//! setup: OCR tooling, data folders, the document store, the client
//! application's server registration, and the running tool server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌───────────┐
//! │  Config  │──▶│  Suite   │──▶│  Runner   │──▶│ Reporter  │──▶ exit code
//! │  (TOML)  │   │ (probes) │   │ (ordered) │   │ text/json │
//! └──────────┘   └──────────┘   └───────────┘   └───────────┘
//! ```
//!
//! Every probe produces exactly one [`models::ProbeResult`]; failures are
//! values, never early returns out of the run.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and defaults |
//! | [`models`] | Status, results, and reports |
//! | [`error`] | Probe failure taxonomy |
//! | [`probe`] | The `Probe` trait |
//! | [`probe_package`] | Executable presence and version |
//! | [`probe_path`] | Path existence |
//! | [`probe_store`] | Document store connectivity |
//! | [`probe_config`] | Client config validity and named entries |
//! | [`probe_registry`] | Registered tools of a live server |
//! | [`db`] | Read-only store client |
//! | [`runner`] | Sequential probe execution |
//! | [`report`] | Text and JSON rendering, exit codes |
//! | [`suites`] | Named probe suites |

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod probe;
pub mod probe_config;
pub mod probe_package;
pub mod probe_path;
pub mod probe_registry;
pub mod probe_store;
pub mod report;
pub mod runner;
pub mod suites;
