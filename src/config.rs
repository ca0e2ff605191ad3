use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CadenceConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub calendar: CalendarConfig,
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Header the upstream auth proxy uses to pass the principal id.
    pub auth_header: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalendarConfig {
    /// IANA zone name. "Today" for every habit is the current date in this zone.
    pub time_zone: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub rollover_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            log_level: "info".into(),
            auth_header: "x-user-id".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_cadence_dir()
            .join("cadence.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            time_zone: "UTC".into(),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            rollover_enabled: true,
        }
    }
}

/// Returns `~/.cadence/`
pub fn default_cadence_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cadence")
}

/// Returns the default config file path: `~/.cadence/config.toml`
pub fn default_config_path() -> PathBuf {
    default_cadence_dir().join("config.toml")
}

impl CadenceConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides and validate.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CadenceConfig::default()
        };

        config.apply_env_overrides()?;
        config.time_zone()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (CADENCE_DB, CADENCE_LOG_LEVEL, CADENCE_TZ, CADENCE_HOST, CADENCE_PORT).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CADENCE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("CADENCE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("CADENCE_TZ") {
            self.calendar.time_zone = val;
        }
        if let Ok(val) = std::env::var("CADENCE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("CADENCE_PORT") {
            self.server.port = val
                .parse()
                .with_context(|| format!("CADENCE_PORT is not a valid port: {val}"))?;
        }
        Ok(())
    }

    /// Parse the configured calendar zone.
    pub fn time_zone(&self) -> Result<Tz> {
        let name = self.calendar.time_zone.as_str();
        name.parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("unknown time zone {name:?}: {e}"))
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(path),
    }
}
