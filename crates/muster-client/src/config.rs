//! Client configuration: where the campus API lives and how to
//! authenticate against it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration loaded from a YAML file, with env-var overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the campus API, e.g. `https://campus.example/api`.
    pub base_url: String,

    /// Bearer token for the API. Usually injected via `MUSTER_API_TOKEN`
    /// rather than written to the file.
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds; the client default applies when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Load configuration from a YAML file and apply env overrides.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// `MUSTER_API_URL` and `MUSTER_API_TOKEN` take precedence over the
    /// file's values when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MUSTER_API_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(token) = std::env::var("MUSTER_API_TOKEN") {
            if !token.is_empty() {
                self.token = Some(token);
            }
        }
    }
}
