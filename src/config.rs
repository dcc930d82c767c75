//! Configuration schema for doublefetch.
//!
//! A config file selects which `ApiClient` implementation is wired in
//! and tunes the HTTP client, the cache decorator and the stub.

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::stub::CannedError;

/// Default config file names to search for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["doublefetch.yaml", ".doublefetch.yaml"];

/// Which client implementation to inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// Real HTTP requests via reqwest
    #[default]
    Http,
    /// Canned responses, no network
    Stub,
}

impl std::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientKind::Http => write!(f, "http"),
            ClientKind::Stub => write!(f, "stub"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub client: ClientKind,
    /// Relative URLs are joined onto this
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum number of in-flight requests when fetching several URLs
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
    #[serde(default)]
    pub stub: Option<StubConfig>,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!("doublefetch/{}", env!("CARGO_PKG_VERSION"))
}

fn default_concurrency() -> usize {
    8
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            client: ClientKind::Http,
            base_url: None,
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            concurrency: default_concurrency(),
            cache: None,
            stub: None,
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a config from YAML text.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Parse the file at `path`, or fall back to defaults when there is none.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::parse_file(p)
                .with_context(|| format!("error parsing config {}", p.display())),
            None => Ok(Self::default()),
        }
    }

    /// Returns whether the cache decorator should be applied.
    pub fn cache_enabled(&self) -> bool {
        self.cache.as_ref().map(|c| c.enabled).unwrap_or(false)
    }

    /// Returns the cache TTL in seconds (defaults to 300).
    pub fn cache_ttl_secs(&self) -> u64 {
        self.cache
            .as_ref()
            .map(|c| c.ttl_secs)
            .unwrap_or_else(default_ttl_secs)
    }
}

/// Cache decorator settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Canned behaviour for the stub client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StubConfig {
    /// Body returned when no route matches and no error is set
    #[serde(default)]
    pub body: String,
    /// Error name returned when no route matches (overrides `body`)
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub routes: Vec<StubRoute>,
}

/// A glob-matched URL override for the stub.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StubRoute {
    pub pattern: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Find a config file.
///
/// Looks in the working directory first, then in the user config dir.
pub fn discover() -> Option<PathBuf> {
    let user_dir =
        ProjectDirs::from("", "", "doublefetch").map(|dirs| dirs.config_dir().to_path_buf());
    discover_in(Path::new("."), user_dir.as_deref())
}

/// Search `dir` for `DEFAULT_CONFIG_NAMES` in order, then `user_dir/config.yaml`.
pub fn discover_in(dir: &Path, user_dir: Option<&Path>) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .chain(user_dir.map(|d| d.join("config.yaml")))
        .find(|path| path.is_file())
}

/// Validate a config.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.timeout_ms == 0 {
        anyhow::bail!("timeout_ms must be greater than 0");
    }

    if config.concurrency == 0 {
        anyhow::bail!("concurrency must be greater than 0");
    }

    if let Some(base) = &config.base_url {
        reqwest::Url::parse(base)
            .map_err(|e| anyhow::anyhow!("invalid base_url {:?}: {}", base, e))?;
    }

    if let Some(stub) = &config.stub {
        if let Some(name) = &stub.error {
            CannedError::parse(name)
                .map_err(|e| anyhow::anyhow!("invalid stub error: {}", e))?;
        }
        for route in &stub.routes {
            globset::Glob::new(&route.pattern).map_err(|e| {
                anyhow::anyhow!("invalid stub route pattern {:?}: {}", route.pattern, e)
            })?;
            if let Some(name) = &route.error {
                CannedError::parse(name).map_err(|e| {
                    anyhow::anyhow!("invalid error for route {:?}: {}", route.pattern, e)
                })?;
            }
        }
    }

    Ok(())
}
