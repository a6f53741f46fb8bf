//! Source configuration: API paths and the demo catalog

use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// Endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Paths appended to the API URL
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    /// Paged, searchable speakers list
    pub speakers_path: String,
    /// Fixed "latest speakers" list
    pub latest_path: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            speakers_path: "/api/speakers".to_string(),
            latest_path: "/api/speakers/latest".to_string(),
        }
    }
}

/// Endpoints as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileEndpoints {
    pub speakers_path: Option<String>,
    pub latest_path: Option<String>,
}

impl Endpoints {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileEndpoints>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            speakers_path: file.speakers_path.unwrap_or(defaults.speakers_path),
            latest_path: file.latest_path.unwrap_or(defaults.latest_path),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Demo Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory catalog used in demo mode
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Simulated round-trip time per fetch
    pub latency_ms: u64,
    /// Number of generated speakers
    pub catalog_size: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            latency_ms: 400,
            catalog_size: 42,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDemo {
    pub latency_ms: Option<u64>,
    pub catalog_size: Option<usize>,
}

impl DemoConfig {
    pub fn from_file(file: Option<FileDemo>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            latency_ms: file.latency_ms.unwrap_or(defaults.latency_ms),
            catalog_size: file.catalog_size.unwrap_or(defaults.catalog_size),
        }
    }
}
