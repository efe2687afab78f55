//! TOML configuration for the pre-flight suites.
//!
//! Every path a probe looks at comes from here. A missing config file is not
//! an error: [`load_or_default`] falls back to [`Config::default`], whose
//! paths are relative to the working directory or derived from the
//! platform's config directory.
//!
//! Paths starting with `~/` are expanded against the user's home directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Command prefix used in the combined install hint.
    #[serde(default = "default_install_command")]
    pub install_command: String,
    #[serde(default = "default_packages")]
    pub packages: Vec<PackageConfig>,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client_config: ClientConfigFile,
    #[serde(default = "default_optional_files")]
    pub optional_files: Vec<OptionalFileConfig>,
}

/// An executable the workflow relies on.
#[derive(Debug, Deserialize, Clone)]
pub struct PackageConfig {
    /// Executable name looked up on `PATH`.
    pub name: String,
    /// Distribution package providing it, if different from `name`.
    #[serde(default)]
    pub install_name: Option<String>,
    /// Installer for this package, overriding the top-level `install_command`.
    #[serde(default)]
    pub installer: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub default_collection: Option<String>,
    #[serde(default = "default_store_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            default_collection: None,
            timeout_secs: default_store_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// File the tool server is started from.
    #[serde(default = "default_entry_point", alias = "script")]
    pub entry_point: Option<PathBuf>,
    /// Base URL of a running tool server.
    #[serde(default = "default_server_url")]
    pub url: String,
    /// Whether an unreachable tool list is a failure rather than a warning.
    #[serde(default)]
    pub require_tools: bool,
    #[serde(default = "default_server_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            entry_point: default_entry_point(),
            url: default_server_url(),
            require_tools: false,
            timeout_secs: default_server_timeout_secs(),
        }
    }
}

/// The client application's JSON settings that register tool servers.
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfigFile {
    #[serde(default = "default_client_config_path")]
    pub path: PathBuf,
    #[serde(default = "default_required_key")]
    pub required_key: String,
    #[serde(default = "default_entry_keyword")]
    pub entry_keyword: String,
    #[serde(default = "default_flag")]
    pub flag: Option<String>,
}

impl Default for ClientConfigFile {
    fn default() -> Self {
        Self {
            path: default_client_config_path(),
            required_key: default_required_key(),
            entry_keyword: default_entry_keyword(),
            flag: default_flag(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OptionalFileConfig {
    pub description: String,
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_command: default_install_command(),
            packages: default_packages(),
            data: DataConfig::default(),
            store: StoreConfig::default(),
            server: ServerConfig::default(),
            client_config: ClientConfigFile::default(),
            optional_files: default_optional_files(),
        }
    }
}

fn default_install_command() -> String {
    "sudo apt-get install".to_string()
}

fn default_packages() -> Vec<PackageConfig> {
    vec![
        PackageConfig {
            name: "tesseract".to_string(),
            install_name: Some("tesseract-ocr".to_string()),
            installer: None,
        },
        PackageConfig {
            name: "pdftoppm".to_string(),
            install_name: Some("poppler-utils".to_string()),
            installer: None,
        },
        PackageConfig {
            name: "ctx".to_string(),
            install_name: Some("context-harness".to_string()),
            installer: Some("cargo install".to_string()),
        },
    ]
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./data/ctx.sqlite")
}
fn default_store_timeout_secs() -> u64 {
    5
}
fn default_entry_point() -> Option<PathBuf> {
    Some(PathBuf::from("./config/ctx.toml"))
}
fn default_server_url() -> String {
    "http://127.0.0.1:7331".to_string()
}
fn default_server_timeout_secs() -> u64 {
    3
}
fn default_required_key() -> String {
    "mcpServers".to_string()
}
fn default_entry_keyword() -> String {
    "ctx".to_string()
}
fn default_flag() -> Option<String> {
    Some("--data-dir".to_string())
}

fn platform_config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_client_config_path() -> PathBuf {
    platform_config_dir()
        .join("Claude")
        .join("claude_desktop_config.json")
}

fn default_optional_files() -> Vec<OptionalFileConfig> {
    vec![OptionalFileConfig {
        description: "VS Code settings".to_string(),
        path: platform_config_dir()
            .join("Code")
            .join("User")
            .join("settings.json"),
    }]
}

/// Expand a leading `~/` against the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    fn expand_paths(&mut self) {
        self.data.path = expand_home(&self.data.path);
        self.store.path = expand_home(&self.store.path);
        self.server.entry_point = self.server.entry_point.as_deref().map(expand_home);
        self.client_config.path = expand_home(&self.client_config.path);
        for f in &mut self.optional_files {
            f.path = expand_home(&f.path);
        }
    }

    fn validate(&self) -> Result<()> {
        for pkg in &self.packages {
            if pkg.name.trim().is_empty() {
                anyhow::bail!("packages[].name must not be empty");
            }
        }

        if self.store.timeout_secs == 0 {
            anyhow::bail!("store.timeout_secs must be > 0");
        }
        if self.server.timeout_secs == 0 {
            anyhow::bail!("server.timeout_secs must be > 0");
        }

        if self.client_config.required_key.trim().is_empty() {
            anyhow::bail!("client_config.required_key must not be empty");
        }

        if !self.server.url.starts_with("http://") && !self.server.url.starts_with("https://") {
            anyhow::bail!(
                "server.url must start with http:// or https://, got '{}'",
                self.server.url
            );
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.expand_paths();
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Load `path` if it exists, otherwise use the built-in defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(
            path = %path.display(),
            "config file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.install_command, "sudo apt-get install");
        assert_eq!(cfg.packages.len(), 3);
        assert_eq!(cfg.store.timeout_secs, 5);
        assert_eq!(cfg.client_config.required_key, "mcpServers");
        assert_eq!(cfg.client_config.flag.as_deref(), Some("--data-dir"));
        assert!(cfg
            .client_config
            .path
            .ends_with("Claude/claude_desktop_config.json"));
    }

    #[test]
    fn test_full_config() {
        let cfg = parse_config(
            r#"
install_command = "brew install"

[[packages]]
name = "tesseract"

[data]
path = "/srv/rag/data"

[store]
path = "/srv/rag/data/ctx.sqlite"
default_collection = "filesystem:docs"
timeout_secs = 2

[server]
url = "http://localhost:9000"
require_tools = true

[client_config]
path = "/etc/client.json"
entry_keyword = "chroma"

[[optional_files]]
description = "editor settings"
path = "/etc/editor.json"
"#,
        )
        .unwrap();

        assert_eq!(cfg.packages.len(), 1);
        assert!(cfg.packages[0].install_name.is_none());
        assert_eq!(cfg.data.path, PathBuf::from("/srv/rag/data"));
        assert_eq!(cfg.store.default_collection.as_deref(), Some("filesystem:docs"));
        assert!(cfg.server.require_tools);
        assert_eq!(cfg.client_config.entry_keyword, "chroma");
        assert_eq!(cfg.client_config.required_key, "mcpServers");
        assert_eq!(cfg.optional_files.len(), 1);
        assert_eq!(cfg.optional_files[0].description, "editor settings");
    }

    #[test]
    fn test_script_is_accepted_for_entry_point() {
        let cfg = parse_config("[server]\nscript = \"/srv/server.py\"\n").unwrap();
        assert_eq!(cfg.server.entry_point, Some(PathBuf::from("/srv/server.py")));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = parse_config("[store]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_rejects_empty_package_name() {
        let err = parse_config("[[packages]]\nname = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("packages"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = parse_config("[server]\nurl = \"ftp://host\"\n").unwrap_err();
        assert!(err.to_string().contains("server.url"));
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/x/y")), home.join("x/y"));
        }
        assert_eq!(expand_home(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(expand_home(Path::new("rel")), PathBuf::from("rel"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let cfg = load_or_default(Path::new("/definitely/not/here/preflight.toml")).unwrap();
        assert_eq!(cfg.data.path, PathBuf::from("./data"));
    }
}
