use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::{
    config::{Config, SearchMode},
    openlib_schema::search::SearchResponse,
    traits::Catalog,
    types::cover::{CoverImage, CoverSize},
};

/// A search as it is sent to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text:  String,
    mode:  SearchMode,
    limit: u32,
}

impl SearchQuery {
    pub fn new(text: &str, mode: SearchMode, limit: u32) -> Self {
        Self {
            text: text.trim().to_string(),
            mode,
            limit,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Query string parameters, in the order they are sent.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self.mode {
            SearchMode::Title => vec![
                ("title", self.text.clone()),
                ("limit", self.limit.to_string()),
            ],
            SearchMode::FreeText => vec![("q", self.text.clone())],
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenLibrary {
    client:    reqwest::Client,
    url:       String,
    cover_url: String,
}

impl OpenLibrary {
    /// `timeout` bounds each request from connecting to the end of the body.
    pub fn new(url: &str, cover_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            cover_url: cover_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.open_library_url,
            &config.open_library_cover_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn search_url(&self) -> String {
        format!("{}/search.json", self.url)
    }

    pub fn cover_url(&self, cover_id: u64, size: CoverSize) -> String {
        format!("{}/b/id/{cover_id}-{size}.jpg", self.cover_url)
    }
}

impl Catalog for OpenLibrary {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let url = self.search_url();
        debug!("Searching {url} for {:?}.", query.text());
        let resp = self
            .client
            .get(&url)
            .query(&query.params())
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()?
            .text()
            .await?;
        let de = &mut serde_json::Deserializer::from_str(&resp);
        let response: SearchResponse =
            serde_path_to_error::deserialize(de).context("Unexpected search response")?;
        debug!("{} results for {:?}.", response.docs.len(), query.text());
        Ok(response)
    }

    async fn cover(&self, cover_id: u64, size: CoverSize) -> Result<CoverImage> {
        let url = self.cover_url(cover_id, size);
        // Without `default=false` missing covers come back as a blank placeholder.
        let resp = self
            .client
            .get(&url)
            .query(&[("default", "false")])
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|x| x.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        Ok(CoverImage {
            bytes,
            content_type,
        })
    }
}
