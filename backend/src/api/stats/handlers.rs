//! Handler functions for statistics API endpoints.

use crate::api::common::{ApiError, ApiResponse};
use crate::database::BooksDatabase;
use crate::database::models::{CategoryStats, StatsOverview};
use crate::services::stats_service::StatsService;
use axum::{extract::Extension, response::Json as ResponseJson};
use std::sync::Arc;

#[axum::debug_handler]
pub async fn get_overview(
    Extension(database): Extension<Arc<BooksDatabase>>,
) -> Result<ResponseJson<ApiResponse<StatsOverview>>, ApiError> {
    let overview = StatsService::new(&database).overview()?;
    Ok(ResponseJson(ApiResponse::ok(overview)))
}

#[axum::debug_handler]
pub async fn get_category_stats(
    Extension(database): Extension<Arc<BooksDatabase>>,
) -> Result<ResponseJson<ApiResponse<Vec<CategoryStats>>>, ApiError> {
    let stats = StatsService::new(&database).categories()?;
    Ok(ResponseJson(ApiResponse::ok(stats)))
}
