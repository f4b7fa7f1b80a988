use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Registry endpoints
// =============================================================================

/// Default base URL of the PyPI JSON API
pub const DEFAULT_PYPI_BASE_URL: &str = "https://pypi.org";

/// Default base URL of the GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default host serving raw repository files
pub const DEFAULT_GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";

/// conda executable looked up on `PATH`
pub const DEFAULT_CONDA_EXECUTABLE: &str = "conda";

// =============================================================================
// Requirements files
// =============================================================================

/// File checked when no requirements file is given
pub const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";

/// Trailing marker excluding a requirement from freshness checks
pub const IGNORE_MARKER: &str = "  # norot";

// =============================================================================
// Fetch-related constants
// =============================================================================

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Maximum number of release sets fetched at the same time
pub const MAX_CONCURRENT_FETCHES: usize = 8;

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = concat!("reqrot/", env!("CARGO_PKG_VERSION"));

/// Configuration file structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub registries: RegistriesConfig,
    pub github: GitHubConfig,
    pub fetch: FetchConfig,
}

/// Registry-specific configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RegistriesConfig {
    pub pypi: PypiConfig,
    pub conda: CondaConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PypiConfig {
    pub base_url: String,
}

impl Default for PypiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PYPI_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CondaConfig {
    /// Executable name or path used when `basepath` is unset
    pub executable: String,
    /// Root of a specific conda installation
    pub basepath: Option<PathBuf>,
}

impl Default for CondaConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_CONDA_EXECUTABLE.to_string(),
            basepath: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub api_url: String,
    pub raw_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            raw_url: DEFAULT_GITHUB_RAW_URL.to_string(),
        }
    }
}

/// Fetch-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    /// Per-request timeout in milliseconds
    pub timeout: u64,
    /// Maximum number of concurrent fetches
    pub max_concurrent: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: FETCH_TIMEOUT_MS,
            max_concurrent: MAX_CONCURRENT_FETCHES,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = config_path();
                if path.is_file() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Returns the path to the config directory for reqrot.
/// Uses $XDG_CONFIG_HOME/reqrot if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/reqrot,
/// or ./reqrot if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("reqrot")
}
