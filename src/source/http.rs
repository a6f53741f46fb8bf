//! Speakers REST API source
//!
//! Endpoints (relative to the configured API URL):
//! - `GET {speakers_path}?page=N&per_page=P&query=Q` -> `{ "elements": [...], "page": {...} }`
//! - `GET {latest_path}` -> `[...]`
//!
//! Timeouts are enforced by the HTTP client, not by the coordinator.

use super::{FetchError, ListSource};
use crate::config::Config;
use crate::model::{ListItem, Page};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Paged list response envelope
#[derive(Debug, Deserialize)]
struct PageResponse<T> {
    elements: Vec<T>,
    page: PageInfo,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(default)]
    page_number: u32,
    page_count: u32,
}

/// List source backed by the speakers HTTP API
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    list_path: String,
    latest_path: String,
}

impl HttpSource {
    pub fn new(
        base_url: &str,
        list_path: &str,
        latest_path: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized HTTP list source: {}", base_url);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            list_path: list_path.to_string(),
            latest_path: latest_path.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            &config.api_url,
            &config.endpoints.speakers_path,
            &config.endpoints.latest_path,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a GET and decode the JSON body, mapping every failure to a `FetchError`
    async fn get_json<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<R, FetchError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Transport("request timed out".to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[async_trait]
impl<T> ListSource<T> for HttpSource
where
    T: ListItem + DeserializeOwned,
{
    async fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
        query: &str,
    ) -> Result<Page<T>, FetchError> {
        let request = self.client.get(self.url(&self.list_path)).query(&[
            ("page", page.to_string()),
            ("per_page", page_size.to_string()),
            ("query", query.to_string()),
        ]);

        tracing::debug!(page, page_size, query, "GET {}", self.list_path);

        let body: PageResponse<T> = self.get_json(request).await?;
        let page_number = if body.page.page_number == 0 {
            page
        } else {
            body.page.page_number
        };

        Ok(Page::new(body.elements, page_number, body.page.page_count))
    }

    async fn fetch_latest(&self) -> Result<Vec<T>, FetchError> {
        tracing::debug!("GET {}", self.latest_path);
        let request = self.client.get(self.url(&self.latest_path));
        self.get_json(request).await
    }
}
