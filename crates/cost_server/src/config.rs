//! Layered server configuration
//!
//! Precedence, lowest first: built-in defaults, TOML file, `INSURANCE_*`
//! environment variables, command-line flags.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ServeError;

pub const ENV_HOST: &str = "INSURANCE_HOST";
pub const ENV_PORT: &str = "INSURANCE_PORT";
pub const ENV_ARTIFACTS: &str = "INSURANCE_ARTIFACTS";

/// Where to listen and where to find the artifact pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub artifacts: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            artifacts: PathBuf::from("artifacts"),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ServeError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ServeError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
            .map_err(|e| ServeError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Self, ServeError> {
        toml::from_str(content).map_err(|e| ServeError::Config(format!("invalid config: {e}")))
    }

    /// Apply `INSURANCE_HOST`, `INSURANCE_PORT` and `INSURANCE_ARTIFACTS`
    pub fn apply_env_overrides(&mut self) -> Result<(), ServeError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ServeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST).filter(|v| !v.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ServeError::Config(format!("{ENV_PORT} must be a port number, got {port:?}")))?;
        }
        if let Some(dir) = lookup(ENV_ARTIFACTS).filter(|v| !v.trim().is_empty()) {
            self.artifacts = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
