//! Executable presence probe.
//!
//! Resolves a named executable on `PATH` and reads its version by running
//! `<exe> --version`. The first non-empty line of output (stdout, falling
//! back to stderr) is reported as the version, or the `unknown` marker when
//! the tool prints nothing usable or does not answer within the timeout.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::config::PackageConfig;
use crate::error::ProbeError;
use crate::models::ProbeResult;
use crate::probe::Probe;

/// Version marker for a present executable whose version cannot be read.
pub const UNKNOWN_VERSION: &str = "unknown";

pub struct PackagePresenceProbe {
    name: String,
    package: String,
    install_name: String,
    installer: Option<String>,
    search_path: Option<std::ffi::OsString>,
    timeout: Duration,
}

impl PackagePresenceProbe {
    pub fn new(package: impl Into<String>) -> Self {
        let package = package.into();
        Self {
            name: format!("package:{}", package),
            install_name: package.clone(),
            package,
            installer: None,
            search_path: None,
            timeout: Duration::from_secs(3),
        }
    }

    pub fn from_config(cfg: &PackageConfig) -> Self {
        let mut probe = Self::new(cfg.name.clone());
        if let Some(install_name) = &cfg.install_name {
            probe.install_name = install_name.clone();
        }
        probe.installer = cfg.installer.clone();
        probe
    }

    /// Search these directories instead of the process `PATH`.
    pub fn with_search_path(mut self, paths: impl Into<std::ffi::OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve(&self) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(&self.package, Some(paths), cwd).ok()
            }
            None => which::which(&self.package).ok(),
        }
    }

    async fn read_version(&self, exe: &Path) -> String {
        let mut cmd = Command::new(exe);
        cmd.arg("--version")
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(out)) => first_line(&out.stdout)
                .or_else(|| first_line(&out.stderr))
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            Ok(Err(e)) => {
                tracing::debug!(package = %self.package, error = %e, "version query failed");
                UNKNOWN_VERSION.to_string()
            }
            Err(_) => {
                tracing::debug!(package = %self.package, "version query timed out");
                UNKNOWN_VERSION.to_string()
            }
        }
    }
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Probe for PackagePresenceProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<ProbeResult, ProbeError> {
        let Some(exe) = self.resolve() else {
            let mut result = ProbeError::DependencyMissing(format!(
                "{}: NOT INSTALLED",
                self.package
            ))
            .into_result(&self.name)
            .with_detail("missing_package", self.package.clone())
            .with_detail("install_name", self.install_name.clone());
            if let Some(installer) = &self.installer {
                result = result.with_detail("installer", installer.clone());
            }
            return Ok(result);
        };

        let version = self.read_version(&exe).await;
        Ok(
            ProbeResult::ok(&self.name, format!("{}: {}", self.package, version))
                .with_detail("version", version)
                .with_detail("path", exe.display().to_string()),
        )
    }
}
