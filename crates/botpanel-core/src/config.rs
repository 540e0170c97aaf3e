//! Configuration resolution for `BotPanel`.
//!
//! Resolution order (lowest to highest priority):
//! 1. Built-in defaults
//! 2. Settings file (JSON, passed with `--config`)
//! 3. Environment variables
//! 4. CLI arguments (applied by the binary)

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the database file inside the instance directory.
const DATABASE_FILE: &str = "panel.db";

/// Complete `BotPanel` configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Root of the persistent disk. The instance directory and the per-user
    /// data directories live below it.
    #[serde(default = "default_disk_path")]
    pub disk_path: PathBuf,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            disk_path: default_disk_path(),
            server: ServerConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

fn default_disk_path() -> PathBuf {
    PathBuf::from(".")
}

impl PanelConfig {
    /// Directory holding the database file.
    pub fn instance_path(&self) -> PathBuf {
        self.disk_path.join("instance")
    }

    /// Path of the `SQLite` database.
    pub fn database_path(&self) -> PathBuf {
        self.instance_path().join(DATABASE_FILE)
    }

    /// Root under which every user gets a `<user_id>/` namespace directory.
    pub fn user_data_path(&self) -> PathBuf {
        self.disk_path.join("user_data")
    }

    /// Create the instance and user data directories if they are missing.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(self.instance_path())?;
        std::fs::create_dir_all(self.user_data_path())?;
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Request body limit for the dashboard upload form.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_upload_bytes: 16 * 1024 * 1024, // 16 MiB
        }
    }
}

/// Signing secret used when nothing else is configured. Fine for local
/// development only.
pub const DEFAULT_SECRET: &str = "dev-secret-change-me";

/// Login session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens.
    pub secret: String,
    /// Lifetime of a session without "remember me" (seconds).
    pub ttl_secs: i64,
    /// Lifetime of a remembered session (seconds). Default: 365 days.
    pub remember_ttl_secs: i64,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            ttl_secs: 24 * 60 * 60,
            remember_ttl_secs: 365 * 24 * 60 * 60,
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    /// Whether tokens are still signed with the built-in development secret.
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Load configuration: defaults, then the optional settings file, then
/// environment overrides.
pub fn load_config(settings_file: Option<&Path>) -> Result<PanelConfig> {
    let mut config = match settings_file {
        Some(path) => load_config_file(path)?,
        None => PanelConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<PanelConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut PanelConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("PANEL_DISK_PATH") {
        config.disk_path = PathBuf::from(val);
    }
    if let Some(val) = var("PANEL_SECRET_KEY") {
        config.session.secret = val;
    }
    if let Some(val) = var("PANEL_ADDR") {
        if let Ok(addr) = val.parse() {
            config.server.addr = addr;
        }
    }
    if let Some(val) = var("PANEL_MAX_UPLOAD_BYTES") {
        if let Ok(n) = val.parse() {
            config.server.max_upload_bytes = n;
        }
    }
    if let Some(val) = var("PANEL_SECURE_COOKIE") {
        config.session.secure_cookie = matches!(val.as_str(), "1" | "true" | "yes");
    }
}
