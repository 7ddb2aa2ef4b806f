//! Handler functions for category API endpoints.

use crate::api::common::{ApiError, ApiResponse};
use crate::database::BooksDatabase;
use crate::services::categories_service::{CategoriesService, CategoryList};
use axum::{extract::Extension, response::Json as ResponseJson};
use std::sync::Arc;

#[axum::debug_handler]
pub async fn list_categories(
    Extension(database): Extension<Arc<BooksDatabase>>,
) -> Result<ResponseJson<ApiResponse<CategoryList>>, ApiError> {
    let categories = CategoriesService::new(&database).list()?;
    Ok(ResponseJson(ApiResponse::success(
        categories,
        "Categories retrieved successfully",
    )))
}
