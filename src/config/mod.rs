//! Configuration management.
//!
//! stepdeck configuration can come from:
//! - Environment variables (STEPDECK_*)
//! - Config file (~/.config/stepdeck/config.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// stepdeck configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Step catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Step catalog configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding registry.json and step sources. Defaults to
    /// the current working directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Primary config file: ~/.config/stepdeck/config.toml
        let primary_path = Self::config_dir().join("config.toml");
        if let Ok(partial) = Self::load_partial_from_path(&primary_path) {
            config.apply_partial(partial);
        }

        config.apply_env_overrides();
        config
    }

    /// Get the config directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("stepdeck"))
            .unwrap_or_else(|| PathBuf::from(".stepdeck"))
    }

    /// Resolved catalog root, defaulting to the working directory.
    pub fn catalog_root(&self) -> PathBuf {
        self.catalog
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("STEPDECK_SERVER_PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                self.server.port = parsed;
            }
        }
        if let Ok(host) = std::env::var("STEPDECK_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(root) = std::env::var("STEPDECK_CATALOG_ROOT") {
            self.catalog.root = Some(PathBuf::from(root));
        }
    }

    fn load_partial_from_path(path: &Path) -> std::result::Result<PartialConfig, ()> {
        let content = std::fs::read_to_string(path).map_err(|_| ())?;
        toml::from_str(&content).map_err(|_| ())
    }

    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(server) = partial.server {
            self.server = server;
        }
        if let Some(catalog) = partial.catalog {
            self.catalog = catalog;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    server: Option<ServerConfig>,
    catalog: Option<CatalogConfig>,
}
