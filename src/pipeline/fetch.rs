// src/pipeline/fetch.rs
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::pipeline::types::BodyFetcher;

/// reqwest-backed fetcher shared by the regional sources and the artwork
/// lookup. One GET per call, full body accumulated as text. No retries here;
/// the next poll cycle is the retry mechanism.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BodyFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("upstream http get()")?;
        let resp = resp.error_for_status().context("upstream http status")?;
        resp.text().await.context("upstream http .text()")
    }
}
