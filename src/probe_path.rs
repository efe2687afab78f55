//! Filesystem existence probe.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::ProbeError;
use crate::models::ProbeResult;
use crate::probe::Probe;

/// Checks that a path exists.
///
/// A missing required path is `FAILED` and echoes the expected location so
/// the user can create it. Built with [`optional`](PathExistsProbe::optional),
/// a missing path is only a `WARNING`.
pub struct PathExistsProbe {
    name: String,
    path: PathBuf,
    description: String,
    optional: bool,
    hint: Option<String>,
}

impl PathExistsProbe {
    pub fn new(path: impl Into<PathBuf>, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            name: format!("path:{}", description),
            path: path.into(),
            description,
            optional: false,
            hint: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Remediation shown in the summary when the path is missing.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[async_trait]
impl Probe for PathExistsProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<ProbeResult, ProbeError> {
        let display = self.path.display().to_string();

        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut result = if self.optional {
                    ProbeError::ConfigurationMissing(format!(
                        "{} not found (optional): {}",
                        self.description, display
                    ))
                    .into_result(&self.name)
                } else {
                    ProbeError::ResourceNotFound(format!(
                        "{} not found: {}",
                        self.description, display
                    ))
                    .into_result(&self.name)
                    .with_detail("missing_path", display.clone())
                };
                if let Some(hint) = &self.hint {
                    result = result.with_detail("hint", hint.clone());
                }
                return Ok(result);
            }
            Err(e) => return Err(e.into()),
        };

        let mut result = ProbeResult::ok(
            &self.name,
            format!("{} exists: {}", self.description, display),
        )
        .with_detail("path", display);

        if metadata.is_dir() {
            let mut entries = tokio::fs::read_dir(&self.path).await?;
            let mut count = 0u64;
            while entries.next_entry().await?.is_some() {
                count += 1;
            }
            result.message = format!("{} ({} item{})", result.message, count, plural(count));
            result = result.with_detail("entries", count);
        }

        Ok(result)
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
