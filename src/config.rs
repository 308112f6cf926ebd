//! Configuration for logbuddy.
//!
//! Configuration sources (highest priority first):
//! 1. `LOGBUDDY_CONFIG` pointing at a config file
//! 2. Config file (.logbuddy/config.yaml) in the current directory or a parent
//! 3. Config file in the home directory (~/.logbuddy/config.yaml)
//! 4. Defaults
//!
//! Every setting is optional; missing values fall back to the defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::HearingRange;
use crate::ingest::DEFAULT_LOG_FILES;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "LOGBUDDY_CONFIG";

const CONFIG_DIR: &str = ".logbuddy";
const CONFIG_NAME: &str = "config.yaml";

const DEFAULT_PREVIEW_LINES: usize = 10;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub hearing: Option<HearingRange>,
    #[serde(default)]
    pub display: Option<DisplayConfig>,
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Lines shown by `head`/`tail` without an explicit count
    pub preview_lines: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Files requested below a logs link
    pub files: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Hearing distance used by audibility filters
    pub hearing: HearingRange,
    pub preview_lines: usize,
    /// Files requested below a logs link
    pub fetch_files: Vec<String>,
    pub fetch_timeout_seconds: u64,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            hearing: HearingRange::default(),
            preview_lines: DEFAULT_PREVIEW_LINES,
            fetch_files: DEFAULT_LOG_FILES.iter().map(|f| f.to_string()).collect(),
            fetch_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            config_file: None,
        }
    }
}

impl ResolvedConfig {
    /// Apply a parsed config file over the defaults
    fn from_file(config: ConfigFile, config_file: PathBuf) -> Self {
        let defaults = Self::default();
        let display = config.display;
        let fetch = config.fetch;

        Self {
            hearing: config.hearing.unwrap_or(defaults.hearing),
            preview_lines: display
                .and_then(|d| d.preview_lines)
                .unwrap_or(defaults.preview_lines),
            fetch_files: fetch
                .as_ref()
                .and_then(|f| f.files.clone())
                .unwrap_or(defaults.fetch_files),
            fetch_timeout_seconds: fetch
                .as_ref()
                .and_then(|f| f.timeout_seconds)
                .unwrap_or(defaults.fetch_timeout_seconds),
            config_file: Some(config_file),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.config_file {
            Some(path) => writeln!(f, "Config file:    {}", path.display())?,
            None => writeln!(f, "Config file:    (defaults)")?,
        }
        writeln!(f, "Hearing range:  {}", self.hearing.range)?;
        writeln!(f, "Walking error:  {}", self.hearing.walking_error)?;
        writeln!(f, "Preview lines:  {}", self.preview_lines)?;
        writeln!(f, "Fetch timeout:  {}s", self.fetch_timeout_seconds)?;
        write!(f, "Fetch files:    {}", self.fetch_files.join(", "))
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Locate the config file: env override, then project, then home
fn find_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }

    std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_file_from(&cwd))
        .or_else(|| {
            dirs::home_dir()
                .map(|home| home.join(CONFIG_DIR).join(CONFIG_NAME))
                .filter(|path| path.exists())
        })
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Ok(ResolvedConfig::from_file(config, path))
        }
        None => Ok(ResolvedConfig::default()),
    }
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
