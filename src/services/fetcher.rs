// src/services/fetcher.rs

//! Page fetching seam.
//!
//! Every enumerator and the room fetcher go through [`PageFetcher`], so the
//! HTTP layer can be swapped for canned pages in tests.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;

/// Retrieves the body of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body. Non-success statuses are errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
