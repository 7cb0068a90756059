//! Service Configuration Module
//!
//! Provides layered configuration loading for monitor services.
//! Sources are applied lowest precedence first:
//!
//! 1. serde defaults on the target type
//! 2. an optional TOML file
//! 3. prefixed environment variables (`PREFIX__KEY`, `PREFIX__SECTION__KEY`)
//! 4. explicit overrides read from plain environment variables

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Separator between prefix, sections and keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Separator for list values supplied through the environment
const LIST_SEPARATOR: &str = ",";

/// Builder for a layered service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
    list_keys: Vec<String>,
    overrides: Vec<(String, String)>,
}

impl ServiceConfigLoader {
    /// Create a loader reading environment variables under `env_prefix`
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            file: None,
            env_prefix: env_prefix.into(),
            list_keys: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Add an optional TOML file; a missing file is skipped
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Mark a key whose environment value is a comma-separated list
    pub fn with_list_key(mut self, key: impl Into<String>) -> Self {
        self.list_keys.push(key.into());
        self
    }

    /// Override `key` with the value of `var` when that variable is set and non-empty
    pub fn with_env_override(mut self, key: impl Into<String>, var: &str) -> Self {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                debug!("Config key overridden from {}", var);
                self.overrides.push((key.into(), value));
            }
        }
        self
    }

    /// Build and deserialize the configuration
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            if path.exists() {
                info!("Loading config file: {:?}", path);
            } else {
                debug!("Config file not found, using defaults: {:?}", path);
            }
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }

        let mut environment = Environment::with_prefix(&self.env_prefix)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true);
        if !self.list_keys.is_empty() {
            environment = environment.list_separator(LIST_SEPARATOR);
            for key in &self.list_keys {
                environment = environment.with_list_parse_key(key);
            }
        }
        builder = builder.add_source(environment);

        for (key, value) in &self.overrides {
            builder = builder
                .set_override(key.as_str(), value.as_str())
                .with_context(|| format!("Invalid override for {}", key))?;
        }

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Resolve a config file path from `env_var`, falling back to `default`
pub fn resolve_config_path(env_var: &str, default: &str) -> PathBuf {
    std::env::var(env_var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(default).to_path_buf())
}
