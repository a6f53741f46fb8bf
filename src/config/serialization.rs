//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# searchlist configuration

# Speakers API base URL (SEARCHLIST_API_URL overrides)
api_url = "{api_url}"

# Speakers requested per page (SEARCHLIST_PAGE_SIZE overrides)
page_size = {page_size}

# HTTP request timeout in seconds
request_timeout_secs = {timeout}

# Serve an in-memory catalog instead of calling the API (SEARCHLIST_DEMO=1 overrides)
demo_mode = {demo_mode}

# API paths, appended to api_url
[endpoints]
speakers_path = "{speakers_path}"  # ?page=&per_page=&query=
latest_path = "{latest_path}"

# Demo catalog
[demo]
latency_ms = {demo_latency}
catalog_size = {demo_size}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily
file_format = "{log_file_format}"  # json, text
file_prefix = "{log_file_prefix}"
"#,
            api_url = self.api_url,
            page_size = self.page_size,
            timeout = self.request_timeout_secs,
            demo_mode = self.demo_mode,
            speakers_path = self.endpoints.speakers_path,
            latest_path = self.endpoints.latest_path,
            demo_latency = self.demo.latency_ms,
            demo_size = self.demo.catalog_size,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_format = self.logging.file_format.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
