mod defaults;


use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::WadashError;
use defaults::*;

/// Top-level wadash configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wadash: WadashConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WadashConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for WadashConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Which asset and view directories to serve from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// `production` (any case) selects production; every other value is development.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    /// Directory the asset and view paths are resolved against.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    /// Origin allowed to open the push channel from a browser.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            root_dir: default_root_dir(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl ServerConfig {
    /// `host:port` to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Static asset directory for the current environment.
    pub fn public_dir(&self) -> PathBuf {
        let root = PathBuf::from(shellexpand(&self.root_dir));
        match self.environment {
            Environment::Production => root.join("dist").join("public"),
            Environment::Development => root.join("src").join("public"),
        }
    }

    /// HTML page directory for the current environment.
    pub fn views_dir(&self) -> PathBuf {
        let root = PathBuf::from(shellexpand(&self.root_dir));
        match self.environment {
            Environment::Production => root.join("views"),
            Environment::Development => root.join("src").join("views"),
        }
    }
}

/// Credential store backend selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Firestore,
    Sqlite,
}

/// Credential store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Firestore collection holding the credential documents.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Path to the Google service-account JSON key.
    #[serde(default = "default_service_account")]
    pub service_account: String,
    /// Firestore project. Empty = use the service account's project.
    #[serde(default)]
    pub project_id: String,
    /// `host:port` of a Firestore emulator. Empty = production Firestore.
    #[serde(default)]
    pub emulator_host: String,
    /// SQLite database for the local backend.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            collection: default_collection(),
            service_account: default_service_account(),
            project_id: String::new(),
            emulator_host: String::new(),
            db_path: default_db_path(),
        }
    }
}

/// WhatsApp automation settings.
///
/// Session data is stored at `{data_dir}/whatsapp_session/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Device name shown in the phone's "Linked devices" list.
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Start a fresh pairing right after an admin-initiated logout.
    #[serde(default = "default_true")]
    pub repair_after_logout: bool,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            device_name: default_device_name(),
            repair_after_logout: true,
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Apply environment overrides on top of file configuration.
///
/// Recognized: `PORT`, `NODE_ENV`, `GOOGLE_APPLICATION_CREDENTIALS`,
/// `FIRESTORE_EMULATOR_HOST`. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), WadashError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|e| WadashError::Config(format!("invalid PORT '{port}': {e}")))?;
    }
    if let Some(env) = var("NODE_ENV") {
        config.server.environment = Environment::from_name(&env);
    }
    if let Some(path) = var("GOOGLE_APPLICATION_CREDENTIALS") {
        config.store.service_account = path;
    }
    if let Some(host) = var("FIRESTORE_EMULATOR_HOST") {
        config.store.emulator_host = host;
    }
    Ok(())
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, WadashError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WadashError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| WadashError::Config(format!("failed to parse config: {}", e)))?
    } else {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}
