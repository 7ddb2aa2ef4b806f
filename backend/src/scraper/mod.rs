//! Sources of fresh book records.
//!
//! A [`Scraper`] produces a complete set of records and can persist them to
//! the dataset file. The shipped implementation downloads a CSV catalog
//! export; any other source only has to implement `scrape`.

use crate::database::codec;
use crate::database::models::Book;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Unified interface for book record sources.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Fetches the full set of records.
    async fn scrape(&self) -> Result<Vec<Book>>;

    /// Writes `records` to `path`, replacing the file atomically.
    async fn persist(&self, records: Vec<Book>, path: &Path) -> Result<()> {
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || codec::write_books(&records, &target))
            .await
            .context("Persist task failed")?
    }
}

/// Downloads a CSV export in the dataset's own column layout.
pub struct RemoteCsvScraper {
    client: reqwest::Client,
    source_url: String,
}

impl RemoteCsvScraper {
    pub fn new(source_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            source_url: source_url.into(),
        })
    }
}

#[async_trait]
impl Scraper for RemoteCsvScraper {
    async fn scrape(&self) -> Result<Vec<Book>> {
        if self.source_url.trim().is_empty() {
            bail!("No scraping source configured (set SCRAPING_URL)");
        }

        tracing::info!("Downloading catalog from {}", self.source_url);
        let body = self
            .client
            .get(&self.source_url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.source_url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", self.source_url))?
            .text()
            .await
            .context("Failed to read catalog body")?;

        codec::parse_books(body.as_bytes(), &self.source_url)
    }
}
