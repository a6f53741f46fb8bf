//! `[logging]` section: stderr level plus an optional rolling log file
//!
//! The shell owns stdout, so logs always go to stderr. The file sink is a
//! second, machine-readable copy for inspecting fetch and cancellation
//! traces after a session.

use serde::Deserialize;
use std::path::PathBuf;

/// How often the log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
}

impl LogRotation {
    /// Unknown values roll daily
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("hourly") {
            Self::Hourly
        } else {
            Self::Daily
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }
}

/// Line format of the log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFileFormat {
    /// One JSON object per event, with span fields (request tickets, pages)
    #[default]
    Json,
    /// Same text as stderr, without colors
    Text,
}

impl LogFileFormat {
    /// Unknown values fall back to JSON
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("text") {
            Self::Text
        } else {
            Self::Json
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level for this crate's targets (trace..error)
    pub level: String,
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    pub file_format: LogFileFormat,
    /// File name prefix; the appender adds the date suffix
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::default(),
            file_format: LogFileFormat::default(),
            file_prefix: "searchlist".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_format: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let Some(file) = file else {
            return Self::default();
        };
        let defaults = Self::default();

        Self {
            level: file.level.unwrap_or(defaults.level),
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file.file_dir.map_or(defaults.file_dir, PathBuf::from),
            file_rotation: file
                .file_rotation
                .map_or(defaults.file_rotation, |s| LogRotation::parse(&s)),
            file_format: file
                .file_format
                .map_or(defaults.file_format, |s| LogFileFormat::parse(&s)),
            file_prefix: file.file_prefix.unwrap_or(defaults.file_prefix),
        }
    }
}
