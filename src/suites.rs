//! Named probe suites.
//!
//! Each suite turns a [`Config`] into an ordered probe list. Order matters
//! only for presentation; probes are independent.
//!
//! | Suite | Checks |
//! |-------|--------|
//! | `check` | packages, data folder, store, server entry point, client config, server entry, optional files |
//! | `connect` | store connectivity with collection samples |
//! | `verify` | server entry point, data folder, registered tools, store with default collection |

use std::time::Duration;

use crate::config::Config;
use crate::probe::Probe;
use crate::probe_config::{ConfigValidityProbe, NameContains, NamedEntryProbe};
use crate::probe_package::PackagePresenceProbe;
use crate::probe_path::PathExistsProbe;
use crate::probe_registry::{CapabilityProbe, HttpToolRegistry};
use crate::probe_store::DatabaseConnectivityProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    Check,
    Connect,
    Verify,
}

impl Suite {
    pub fn name(self) -> &'static str {
        match self {
            Suite::Check => "check",
            Suite::Connect => "connect",
            Suite::Verify => "verify",
        }
    }
}

pub fn build(suite: Suite, config: &Config) -> Vec<Box<dyn Probe>> {
    match suite {
        Suite::Check => check_probes(config),
        Suite::Connect => connect_probes(config),
        Suite::Verify => verify_probes(config),
    }
}

fn store_probe(config: &Config) -> DatabaseConnectivityProbe {
    DatabaseConnectivityProbe::new(&config.store.path)
        .with_timeout(Duration::from_secs(config.store.timeout_secs))
}

fn entry_point_probe(config: &Config) -> Option<Box<dyn Probe>> {
    config.server.entry_point.as_ref().map(|path| {
        Box::new(PathExistsProbe::new(path, "server entry point")) as Box<dyn Probe>
    })
}

pub fn check_probes(config: &Config) -> Vec<Box<dyn Probe>> {
    let mut probes: Vec<Box<dyn Probe>> = Vec::new();

    for pkg in &config.packages {
        probes.push(Box::new(PackagePresenceProbe::from_config(pkg)));
    }

    probes.push(Box::new(PathExistsProbe::new(
        &config.data.path,
        "data folder",
    )));
    probes.push(Box::new(store_probe(config)));
    probes.extend(entry_point_probe(config));

    let client = &config.client_config;
    probes.push(Box::new(ConfigValidityProbe::new(
        &client.path,
        &client.required_key,
    )));

    let mut entry = NamedEntryProbe::new(
        &client.path,
        &client.required_key,
        NameContains(client.entry_keyword.clone()),
    );
    if let Some(flag) = &client.flag {
        entry = entry.with_flag(flag);
    }
    probes.push(Box::new(entry));

    for file in &config.optional_files {
        probes.push(Box::new(
            PathExistsProbe::new(&file.path, &file.description).optional(),
        ));
    }

    probes
}

pub fn connect_probes(config: &Config) -> Vec<Box<dyn Probe>> {
    vec![Box::new(store_probe(config))]
}

pub fn verify_probes(config: &Config) -> Vec<Box<dyn Probe>> {
    let mut probes: Vec<Box<dyn Probe>> = Vec::new();

    probes.extend(entry_point_probe(config));
    probes.push(Box::new(
        PathExistsProbe::new(&config.data.path, "data folder").with_hint("Run ingestion first"),
    ));

    let registry = HttpToolRegistry::new(
        config.server.url.clone(),
        Duration::from_secs(config.server.timeout_secs),
    );
    probes.push(Box::new(
        CapabilityProbe::new(registry).required(config.server.require_tools),
    ));

    let mut store = store_probe(config);
    if let Some(name) = &config.store.default_collection {
        store = store.with_default_collection(name);
    }
    probes.push(Box::new(store));

    probes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn names(probes: &[Box<dyn Probe>]) -> Vec<String> {
        probes.iter().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn test_check_suite_order() {
        let cfg = parse_config(
            r#"
[[packages]]
name = "tesseract"

[[packages]]
name = "pdftoppm"

[[optional_files]]
description = "editor settings"
path = "/tmp/settings.json"
"#,
        )
        .unwrap();
        assert_eq!(
            names(&build(Suite::Check, &cfg)),
            vec![
                "package:tesseract",
                "package:pdftoppm",
                "path:data folder",
                "store",
                "path:server entry point",
                "client-config",
                "server-entry",
                "path:editor settings",
            ]
        );
    }

    #[test]
    fn test_entry_point_can_be_disabled() {
        let mut cfg = parse_config("").unwrap();
        cfg.server.entry_point = None;
        assert_eq!(
            names(&build(Suite::Verify, &cfg)),
            vec!["path:data folder", "tools", "store"]
        );
    }

    #[test]
    fn test_connect_suite_is_store_only() {
        let cfg = parse_config("").unwrap();
        assert_eq!(names(&build(Suite::Connect, &cfg)), vec!["store"]);
    }
}
