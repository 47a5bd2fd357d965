//! Bootstrap configuration and root folder resolution
//!
//! Two kinds of configuration exist:
//! 1. **TOML bootstrap**: listen address, model files, folders, logging and the
//!    initial admin credential. Read once at startup.
//! 2. **Database**: runtime state such as the session signing secret
//!    (`settings` table).
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `WBID_ROOT_FOLDER`
//! 3. `root_folder` key in the TOML file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and compiled
//! defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "WBID_ROOT_FOLDER";

/// Environment variable pointing at an explicit TOML file
pub const CONFIG_FILE_ENV: &str = "WBID_CONFIG";

/// File name of the SQLite database inside the root folder
pub const DATABASE_FILE_NAME: &str = "wbid.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Folder holding `wbid.db` and, unless overridden, `uploads/`
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Bind address for the HTTP server
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Where uploaded photos are stored (default: `<root_folder>/uploads`)
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,

    /// Upper bound on a single classification call
    #[serde(default = "default_classify_timeout_ms")]
    pub classify_timeout_ms: u64,

    /// Largest accepted upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Lifetime of an admin session cookie
    #[serde(default = "default_session_ttl_seconds")]
    pub session_ttl_seconds: u64,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub admin: AdminBootstrap,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Classifier model files
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// ONNX model exported from the training checkpoint
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Class labels, one per line, in model output order
    #[serde(default)]
    pub labels: Option<PathBuf>,

    /// Logit temperature applied before softmax
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Credential used to create the first admin when the table is empty
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminBootstrap {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_classify_timeout_ms() -> u64 {
    10_000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_session_ttl_seconds() -> u64 {
    8 * 60 * 60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_temperature() -> f32 {
    1.3
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            host: default_host(),
            port: default_port(),
            upload_dir: None,
            classify_timeout_ms: default_classify_timeout_ms(),
            max_upload_bytes: default_max_upload_bytes(),
            session_ttl_seconds: default_session_ttl_seconds(),
            logging: LoggingConfig::default(),
            model: ModelConfig::default(),
            admin: AdminBootstrap::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            labels: None,
            temperature: default_temperature(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("port must be non-zero".to_string()));
        }
        if self.classify_timeout_ms == 0 {
            return Err(Error::Config("classify_timeout_ms must be non-zero".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::Config("max_upload_bytes must be non-zero".to_string()));
        }
        if self.session_ttl_seconds == 0 {
            return Err(Error::Config("session_ttl_seconds must be non-zero".to_string()));
        }
        if !(self.model.temperature.is_finite() && self.model.temperature > 0.0) {
            return Err(Error::Config(format!(
                "model.temperature must be positive, got {}",
                self.model.temperature
            )));
        }
        Ok(())
    }
}

/// Load bootstrap configuration
///
/// Lookup order: explicit path → `WBID_CONFIG` → `<config_dir>/wbid/config.toml`.
/// An explicit path that does not exist is an error; a missing default file
/// falls back to compiled defaults with a warning.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        info!("Loading configuration from {}", path.display());
        return TomlConfig::from_file(path);
    }

    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        let path = PathBuf::from(path);
        info!("Loading configuration from {} ({})", path.display(), CONFIG_FILE_ENV);
        return TomlConfig::from_file(&path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            TomlConfig::from_file(&path)
        }
        Some(path) => {
            warn!(
                "No configuration file at {}, using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            warn!("Could not determine config directory, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// `~/.config/wbid/config.toml` or the platform equivalent
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wbid").join("config.toml"))
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("wbid"))
        .unwrap_or_else(|| PathBuf::from("./wbid_data"))
}

/// Root folder resolution following the priority order in the module docs
pub struct RootFolderResolver<'a> {
    cli_arg: Option<PathBuf>,
    toml: &'a TomlConfig,
}

impl<'a> RootFolderResolver<'a> {
    pub fn new(cli_arg: Option<PathBuf>, toml: &'a TomlConfig) -> Self {
        Self { cli_arg, toml }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml.root_folder {
            return path.clone();
        }

        default_root_folder()
    }
}

/// Creates the root folder layout on first run
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// Upload folder: TOML override, else `<root_folder>/uploads`. Created if missing.
    pub fn upload_dir(&self, toml: &TomlConfig) -> Result<PathBuf> {
        let dir = toml
            .upload_dir
            .clone()
            .unwrap_or_else(|| self.root_folder.join("uploads"));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
