//! Bootstrap configuration and artifact folder resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error. A TOML file that exists but does not
//! parse aborts startup.
//!
//! Nothing here logs. The tracing subscriber is installed after resolution.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit TOML config file
pub const ENV_CONFIG: &str = "PA_CONFIG";
/// Environment variable overriding the artifact folder
pub const ENV_ARTIFACT_FOLDER: &str = "PA_ARTIFACT_FOLDER";
/// Environment variable overriding the listen port
pub const ENV_PORT: &str = "PA_PORT";

const APP_DIR: &str = "pa-recommender";

/// Compiled defaults used when no other source supplies a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub artifact_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            artifact_folder: default_artifact_folder(),
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            log_level: default_log_level(),
        }
    }
}

/// OS-dependent default artifact folder
fn default_artifact_folder() -> PathBuf {
    // ~/.local/share, ~/Library/Application Support, %LOCALAPPDATA%
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./pa_data"))
}

/// Default user config file: `<config_dir>/pa-recommender/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Bootstrap configuration loaded from TOML file
///
/// All fields are optional; anything absent falls through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Address the HTTP listener binds to
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Folder holding the serialized artifacts
    #[serde(default)]
    pub artifact_folder: Option<PathBuf>,

    /// Artifact file names, relative to the artifact folder
    #[serde(default)]
    pub artifacts: ArtifactFiles,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the file if it exists; `Ok(None)` when it does not
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path)
            .map(Some)
            .map_err(|e| Error::Config(format!("Failed to load {}: {}", path.display(), e)))
    }
}

/// Artifact file names
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactFiles {
    #[serde(default = "default_artists_file")]
    pub artists: PathBuf,
    #[serde(default = "default_venues_file")]
    pub venues: PathBuf,
    #[serde(default = "default_model_file")]
    pub model: PathBuf,
    #[serde(default = "default_matrix_file")]
    pub matrix: PathBuf,
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            artists: default_artists_file(),
            venues: default_venues_file(),
            model: default_model_file(),
            matrix: default_matrix_file(),
        }
    }
}

impl ArtifactFiles {
    /// Join the file names onto `folder`. Absolute file names are kept as-is.
    pub fn resolve_in(&self, folder: &Path) -> ArtifactPaths {
        ArtifactPaths {
            artists: folder.join(&self.artists),
            venues: folder.join(&self.venues),
            model: folder.join(&self.model),
            matrix: folder.join(&self.matrix),
        }
    }
}

fn default_artists_file() -> PathBuf {
    PathBuf::from("artists.json")
}

fn default_venues_file() -> PathBuf {
    PathBuf::from("venues.json")
}

fn default_model_file() -> PathBuf {
    PathBuf::from("model.json")
}

fn default_matrix_file() -> PathBuf {
    PathBuf::from("csr.json")
}

/// Full paths of the four artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub artists: PathBuf,
    pub venues: PathBuf,
    pub model: PathBuf,
    pub matrix: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub artifact_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub artifact_folder: PathBuf,
    pub artifacts: ArtifactPaths,
    pub log_level: String,
    /// TOML file the configuration was read from, if one was found
    pub config_file: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve configuration from CLI, environment, TOML file and defaults
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let mut loaded_from = None;
        let mut toml = TomlConfig::default();
        if let Some(path) = config_file_path(cli.config_file.as_deref()) {
            if let Some(config) = TomlConfig::load_optional(&path)? {
                toml = config;
                loaded_from = Some(path);
            }
        }

        let mut config = Self::resolve_with(cli, toml)?;
        config.config_file = loaded_from;
        Ok(config)
    }

    /// Resolve against an already-loaded TOML config
    pub fn resolve_with(cli: &CliOverrides, toml: TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let artifact_folder = resolve_artifact_folder(
            cli.artifact_folder.as_deref(),
            toml.artifact_folder.as_deref(),
            &defaults,
        );
        let port = resolve_port(cli.port, toml.port, &defaults)?;
        let bind_address = cli
            .bind_address
            .clone()
            .or(toml.bind_address)
            .unwrap_or(defaults.bind_address);

        Ok(Self {
            bind_address,
            port,
            artifacts: toml.artifacts.resolve_in(&artifact_folder),
            artifact_folder,
            log_level: toml.logging.level,
            config_file: None,
        })
    }

    /// `host:port` listen address
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Config file location: explicit path, then `PA_CONFIG`, then the user default
fn config_file_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        return Some(PathBuf::from(path));
    }
    default_config_path()
}

fn resolve_artifact_folder(
    cli_arg: Option<&Path>,
    toml_value: Option<&Path>,
    defaults: &CompiledDefaults,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ENV_ARTIFACT_FOLDER) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    // Priority 4: Compiled default
    defaults.artifact_folder.clone()
}

fn resolve_port(cli_arg: Option<u16>, toml_value: Option<u16>, defaults: &CompiledDefaults) -> Result<u16> {
    if let Some(port) = cli_arg {
        return Ok(port);
    }

    if let Ok(value) = std::env::var(ENV_PORT) {
        return value
            .parse::<u16>()
            .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", ENV_PORT, value, e)));
    }

    Ok(toml_value.unwrap_or(defaults.port))
}
