//! Web page fetcher.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::fetch::Fetch;

/// Fetches the body of a URL over HTTP.
///
/// The response status is not checked: whatever body the server returns is
/// the page.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Backend(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn get_page(&self, url: &str) -> reqwest::Result<String> {
        let response = self.client.get(url).send()?;
        debug!(url, status = %response.status(), "Fetched page");
        response.text()
    }
}

impl Fetch for PageFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        self.get_page(url).map_err(|e| CacheError::fetch(url, e))
    }
}
