//! Handler for the health check endpoint.
//!
//! Reports `healthy` when the dataset is loaded and `degraded` otherwise. The
//! endpoint itself never fails.

use crate::config::Config;
use crate::database::BooksDatabase;
use crate::errors::DATA_UNAVAILABLE_MESSAGE;
use axum::{extract::Extension, response::Json as ResponseJson};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: String,
    pub data_available: bool,
    pub total_books: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[axum::debug_handler]
pub async fn health_check(
    Extension(database): Extension<Arc<BooksDatabase>>,
    Extension(config): Extension<Arc<Config>>,
) -> ResponseJson<HealthCheck> {
    let snapshot = database.snapshot();
    let data_available = snapshot.is_available();

    ResponseJson(HealthCheck {
        status: if data_available {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        version: config.api_version.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        data_available,
        total_books: snapshot.total_books(),
        message: (!data_available).then(|| DATA_UNAVAILABLE_MESSAGE.to_string()),
    })
}
