//! Handler functions for scraping endpoints.

use crate::api::common::{ApiError, ApiResponse};
use crate::middleware::RequestContext;
use crate::services::scraping_service::{ScrapingService, TriggerOutcome};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    Started,
    AlreadyRunning,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: ScrapeStatus,
    pub triggered_by: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub total_books: usize,
}

/// Starts a background scrape; the response does not wait for it.
#[axum::debug_handler]
pub async fn trigger_scraping(
    Extension(scraping): Extension<Arc<ScrapingService>>,
    Extension(context): Extension<RequestContext>,
) -> (StatusCode, ResponseJson<ApiResponse<TriggerResponse>>) {
    let triggered_by = context.user().to_string();

    match scraping.trigger(&context) {
        // Detached: the run outlives the request
        TriggerOutcome::Started(_handle) => (
            StatusCode::ACCEPTED,
            ResponseJson(ApiResponse::success(
                TriggerResponse {
                    status: ScrapeStatus::Started,
                    triggered_by,
                },
                "Scraping task started in background",
            )),
        ),
        TriggerOutcome::AlreadyRunning => (
            StatusCode::OK,
            ResponseJson(ApiResponse::success(
                TriggerResponse {
                    status: ScrapeStatus::AlreadyRunning,
                    triggered_by,
                },
                "Scraping task already running",
            )),
        ),
    }
}

/// Reloads the dataset from its file without scraping.
#[axum::debug_handler]
pub async fn reload_data(
    Extension(scraping): Extension<Arc<ScrapingService>>,
    Extension(context): Extension<RequestContext>,
) -> Result<ResponseJson<ApiResponse<ReloadResponse>>, ApiError> {
    let total_books = scraping.reload(&context).await?;
    Ok(ResponseJson(ApiResponse::success(
        ReloadResponse { total_books },
        "Data reloaded successfully",
    )))
}
