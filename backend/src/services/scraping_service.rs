//! Background dataset refresh.
//!
//! A trigger starts one task that scrapes, persists the records next to the
//! dataset file and reloads the dataset. Only one run exists at a time; a
//! trigger while a run is in flight is reported as already running. A failed
//! run leaves the current file and snapshot in place.

use crate::database::BooksDatabase;
use crate::errors::ServiceResult;
use crate::middleware::RequestContext;
use crate::scraper::Scraper;
use anyhow::bail;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

pub enum TriggerOutcome {
    Started(JoinHandle<()>),
    AlreadyRunning,
}

pub struct ScrapingService {
    database: Arc<BooksDatabase>,
    scraper: Arc<dyn Scraper>,
    running: Arc<AtomicBool>,
}

/// Clears the running flag when the task ends, including on panic.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ScrapingService {
    pub fn new(database: Arc<BooksDatabase>, scraper: Arc<dyn Scraper>) -> Self {
        Self {
            database,
            scraper,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts a scrape in the background unless one is already in progress.
    pub fn trigger(&self, context: &RequestContext) -> TriggerOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!(request_id = %context.request_id, "Scraping already in progress");
            return TriggerOutcome::AlreadyRunning;
        }

        let guard = RunGuard(Arc::clone(&self.running));
        let database = Arc::clone(&self.database);
        let scraper = Arc::clone(&self.scraper);
        let request_id = context.request_id;
        tracing::info!(request_id = %request_id, "Scraping triggered by {}", context.user());

        let handle = tokio::spawn(async move {
            let _guard = guard;
            match run(scraper.as_ref(), &database).await {
                Ok(total) => tracing::info!(
                    request_id = %request_id,
                    "Scraping finished, {} books loaded",
                    total
                ),
                Err(e) => tracing::error!(request_id = %request_id, "Scraping failed: {:#}", e),
            }
        });

        TriggerOutcome::Started(handle)
    }

    /// Reloads the dataset from its file without scraping.
    pub async fn reload(&self, context: &RequestContext) -> ServiceResult<usize> {
        let total = self.database.reload().await?;
        tracing::info!(request_id = %context.request_id, "Reloaded {} books", total);
        Ok(total)
    }
}

async fn run(scraper: &dyn Scraper, database: &BooksDatabase) -> anyhow::Result<usize> {
    let started = std::time::Instant::now();
    let records = scraper.scrape().await?;
    if records.is_empty() {
        bail!("Scraper returned no records");
    }

    scraper.persist(records, database.data_path()).await?;
    let total = database.reload().await?;

    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Scraping run complete");
    Ok(total)
}
