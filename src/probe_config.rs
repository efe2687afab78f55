//! Structured configuration probes.
//!
//! [`ConfigValidityProbe`] checks that a client settings file parses and
//! carries a required key. [`NamedEntryProbe`] looks inside one section of
//! such a file for a registration matching a predicate, e.g. the tool
//! server entry whose name contains `ctx`.
//!
//! Files ending in `.toml` are parsed as TOML; everything else as JSON.
//! A missing file is "not yet configured" and only warns.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::models::ProbeResult;
use crate::probe::Probe;

/// Read and parse a structured config file.
///
/// Absent files map to [`ProbeError::ConfigurationMissing`], parse errors
/// to [`ProbeError::ConfigurationInvalid`].
pub async fn read_structured(path: &Path) -> Result<Value, ProbeError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProbeError::ConfigurationMissing(format!(
                "config file not found: {}",
                path.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    if is_toml {
        toml::from_str::<Value>(&content).map_err(|e| {
            ProbeError::ConfigurationInvalid(format!(
                "invalid TOML in {}: {}",
                path.display(),
                e.message()
            ))
        })
    } else {
        serde_json::from_str::<Value>(&content).map_err(|e| {
            ProbeError::ConfigurationInvalid(format!("invalid JSON in {}: {}", path.display(), e))
        })
    }
}

fn child_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        Value::Null => 0,
        _ => 1,
    }
}

pub struct ConfigValidityProbe {
    path: PathBuf,
    required_key: String,
}

impl ConfigValidityProbe {
    pub fn new(path: impl Into<PathBuf>, required_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required_key: required_key.into(),
        }
    }
}

#[async_trait]
impl Probe for ConfigValidityProbe {
    fn name(&self) -> &str {
        "client-config"
    }

    async fn check(&self) -> Result<ProbeResult, ProbeError> {
        let root = read_structured(&self.path).await?;

        match root.get(&self.required_key) {
            Some(section) => {
                let entries = child_count(section);
                Ok(ProbeResult::ok(
                    self.name(),
                    format!(
                        "{} is valid; '{}' has {} entr{}",
                        self.path.display(),
                        self.required_key,
                        entries,
                        if entries == 1 { "y" } else { "ies" }
                    ),
                )
                .with_detail("path", self.path.display().to_string())
                .with_detail("entries", entries))
            }
            None => Err(ProbeError::ConfigurationMissing(format!(
                "{} is valid but has no '{}' key",
                self.path.display(),
                self.required_key
            ))),
        }
    }
}

/// Decides which named entry a [`NamedEntryProbe`] is looking for.
pub trait EntryPredicate: Send + Sync {
    fn matches(&self, name: &str, entry: &Value) -> bool;

    /// Short description used in messages ("name contains 'ctx'").
    fn describe(&self) -> String;
}

/// Matches entries whose name contains a keyword, ignoring case.
pub struct NameContains(pub String);

impl EntryPredicate for NameContains {
    fn matches(&self, name: &str, _entry: &Value) -> bool {
        name.to_lowercase().contains(&self.0.to_lowercase())
    }

    fn describe(&self) -> String {
        format!("name contains '{}'", self.0)
    }
}

pub struct NamedEntryProbe {
    path: PathBuf,
    section: String,
    predicate: Box<dyn EntryPredicate>,
    flag: Option<String>,
}

impl NamedEntryProbe {
    pub fn new(
        path: impl Into<PathBuf>,
        section: impl Into<String>,
        predicate: impl EntryPredicate + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            section: section.into(),
            predicate: Box::new(predicate),
            flag: None,
        }
    }

    /// Extract the value following `flag` in the matched entry's `args`.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }
}

/// Value following `flag` in an `args` array, if both are present.
pub fn flag_value(entry: &Value, flag: &str) -> Option<String> {
    let args = entry.get("args")?.as_array()?;
    args.iter()
        .position(|a| a.as_str() == Some(flag))
        .and_then(|i| args.get(i + 1))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl Probe for NamedEntryProbe {
    fn name(&self) -> &str {
        "server-entry"
    }

    async fn check(&self) -> Result<ProbeResult, ProbeError> {
        let root = read_structured(&self.path).await?;

        let Some(section) = root.get(&self.section).and_then(Value::as_object) else {
            return Err(ProbeError::ConfigurationMissing(format!(
                "no '{}' entries in {}",
                self.section,
                self.path.display()
            )));
        };

        let Some((name, entry)) = section
            .iter()
            .find(|(name, entry)| self.predicate.matches(name, entry))
        else {
            return Err(ProbeError::ConfigurationMissing(format!(
                "no '{}' entry with {} among {} registered",
                self.section,
                self.predicate.describe(),
                section.len()
            )));
        };

        let mut result = ProbeResult::ok(self.name(), format!("found server entry '{}'", name))
            .with_detail("entry", name.clone())
            .with_detail("registered", section.len());

        if let Some(flag) = &self.flag {
            if let Some(value) = flag_value(entry, flag) {
                result.message = format!("{} ({} {})", result.message, flag, value);
                result = result
                    .with_detail("flag", flag.clone())
                    .with_detail("flag_value", value);
            }
        }

        Ok(result)
    }
}
