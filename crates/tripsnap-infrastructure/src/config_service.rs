//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `config.toml` and applies environment
//! overrides. A missing file is not an error: defaults apply.

use crate::paths::TripsnapPaths;
use std::path::{Path, PathBuf};
use tripsnap_core::{ClientConfig, Result, TripsnapError};

pub const ENV_BASE_URL: &str = "TRIPSNAP_BASE_URL";
pub const ENV_CSRF_TOKEN: &str = "TRIPSNAP_CSRF_TOKEN";
pub const ENV_ADMIN_EMAIL: &str = "TRIPSNAP_ADMIN_EMAIL";

/// Loads the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the platform default location.
    pub fn new_default() -> Result<Self> {
        let path = TripsnapPaths::config_file().map_err(|e| TripsnapError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Uses an explicit config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file (if any) and applies process environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_file()?;
        Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    /// Reads only the file; defaults when it does not exist.
    pub fn load_file(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                self.path.display()
            );
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        tracing::debug!("[ConfigService] Loaded {}", self.path.display());
        Ok(config)
    }
}

/// Overrides file values with `TRIPSNAP_*` variables; blank values are ignored.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(base_url) = get(ENV_BASE_URL) {
        config.base_url = base_url;
    }
    if let Some(token) = get(ENV_CSRF_TOKEN) {
        config.csrf_fallback_token = Some(token);
    }
    if let Some(email) = get(ENV_ADMIN_EMAIL) {
        config.admin_email = Some(email);
    }
    config
}
