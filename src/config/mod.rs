//! Configuration for the list shell and its sources
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/searchlist/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod serialization;
mod source;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (maintain public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use observability::{FileLogging, LogFileFormat, LogRotation, LoggingConfig};
pub use source::{DemoConfig, Endpoints, FileDemo, FileEndpoints};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_URL: &str = "https://api.letswift.pl";
const DEFAULT_PAGE_SIZE: u32 = crate::coordinator::DEFAULT_PAGE_SIZE;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the speakers API
    pub api_url: String,

    /// Items requested per page
    pub page_size: u32,

    /// HTTP request timeout (the coordinator has no timer of its own)
    pub request_timeout_secs: u64,

    /// Demo mode: serve an in-memory catalog instead of calling the API
    pub demo_mode: bool,

    /// API paths
    pub endpoints: Endpoints,

    /// In-memory catalog settings for demo mode
    pub demo: DemoConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            demo_mode: false,
            endpoints: Endpoints::default(),
            demo: DemoConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub page_size: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub demo_mode: Option<bool>,

    /// Optional [endpoints] section
    pub endpoints: Option<FileEndpoints>,

    /// Optional [demo] section
    pub demo: Option<FileDemo>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Config file exists but cannot be used
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "Cannot read {}: {}", path.display(), message)
            }
            Self::Parse { path, message } => {
                write!(f, "Failed to parse {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/searchlist/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("searchlist").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A missing file means defaults; a file that exists but is unreadable or
    /// invalid is an error so a broken config never silently falls back.
    fn load_file_config() -> Result<FileConfig, ConfigError> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_file_config(&contents).map_err(|message| {
                ConfigError::Parse {
                    path: path.clone(),
                    message,
                }
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(ConfigError::Read {
                path,
                message: e.to_string(),
            }),
        }
    }

    pub(crate) fn parse_file_config(contents: &str) -> Result<FileConfig, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = Self::load_file_config()?;
        Ok(Self::from_sources(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed file with environment lookups
    pub(crate) fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        // API URL: env > file > default
        let api_url = env("SEARCHLIST_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        // Page size: env > file > default; zero or garbage at one layer
        // falls through to the next
        let positive = |size: &u32| *size > 0;
        let page_size = env("SEARCHLIST_PAGE_SIZE")
            .and_then(|v| v.parse().ok())
            .filter(positive)
            .or(file.page_size.filter(positive))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        // Timeout: file > default
        let request_timeout_secs = file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        // Demo mode: env > file > default
        let demo_mode = env("SEARCHLIST_DEMO")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .or(file.demo_mode)
            .unwrap_or(false);

        let endpoints = Endpoints::from_file(file.endpoints);
        let demo = DemoConfig::from_file(file.demo);

        // Log level: env > file > default (RUST_LOG still wins at subscriber init)
        let mut logging = LoggingConfig::from_file(file.logging);
        if let Some(level) = env("SEARCHLIST_LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            api_url,
            page_size,
            request_timeout_secs,
            demo_mode,
            endpoints,
            demo,
            logging,
        }
    }
}
