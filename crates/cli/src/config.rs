//! Console configuration
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `AUTORES__*` environment variables (e.g. `AUTORES__API__BASE_URL`).

use autores_client::{DEFAULT_BASE_URL, DEFAULT_TOKEN_HEADER};
use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file names tried when no explicit file is given
const CONFIG_FILE_CANDIDATES: [&str; 2] = ["autores.toml", "config/autores.toml"];

const ENV_PREFIX: &str = "AUTORES";

/// Console settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Log filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// API connection settings
    #[serde(default)]
    pub api: ApiSettings,
    /// Session persistence settings
    #[serde(default)]
    pub session: SessionSettings,
}

/// API connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Origin every request path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Header carrying the session token
    #[serde(default = "default_token_header")]
    pub token_header: String,
    /// Request timeout in seconds (0 = wait indefinitely)
    #[serde(default)]
    pub timeout_secs: u64,
}

/// Session persistence settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session file; defaults to the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token_header() -> String {
    DEFAULT_TOKEN_HEADER.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_header: default_token_header(),
            timeout_secs: 0,
        }
    }
}

impl ApiSettings {
    /// The configured timeout, if any
    pub const fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Settings {
    /// Load settings from the given file (or the default locations) and the
    /// process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load settings, reading environment overrides from `env` instead of the
    /// process environment when it is given
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Start with defaults
        builder = builder.add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        } else {
            for candidate in default_config_files() {
                if candidate.exists() {
                    builder = builder
                        .add_source(File::from(candidate).format(FileFormat::Toml).required(false));
                }
            }
        }

        // Environment variables override file settings
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        builder.build()?.try_deserialize()
    }

    /// Where the session token is persisted
    pub fn session_path(&self) -> PathBuf {
        self.session.path.clone().unwrap_or_else(|| {
            project_dirs().map_or_else(
                || PathBuf::from(".autores").join("session.json"),
                |dirs| dirs.data_dir().join("session.json"),
            )
        })
    }

    /// Render these settings as a TOML document
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "Autores", "autores")
}

/// Default location for a generated config file
pub fn default_config_path() -> PathBuf {
    project_dirs().map_or_else(
        || PathBuf::from(CONFIG_FILE_CANDIDATES[0]),
        |dirs| dirs.config_dir().join("autores.toml"),
    )
}

fn default_config_files() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = CONFIG_FILE_CANDIDATES.iter().map(PathBuf::from).collect();
    if let Some(dirs) = project_dirs() {
        files.push(dirs.config_dir().join("autores.toml"));
    }
    files
}
