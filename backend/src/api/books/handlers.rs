//! Handler functions for book catalog API endpoints.
//!
//! Query parameters are validated here with `validator`; everything else is
//! delegated to [`BooksService`]. Parameters that fail to parse are rejected
//! in the standard error envelope by [`ApiQuery`] and [`ApiPath`].

use crate::api::common::{
    ApiError, ApiPath, ApiQuery, ApiResponse, DEFAULT_PAGE_SIZE, PaginationFilter,
    validate_params,
};
use crate::database::BooksDatabase;
use crate::database::models::{Book, BookFilter};
use crate::services::books_service::{BookList, BooksService};
use axum::{extract::Extension, response::Json as ResponseJson};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

const DEFAULT_TOP_RATED: u32 = 10;

/// Search query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    pub title: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0.0, message = "min_price must not be negative"))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0, message = "max_price must not be negative"))]
    pub max_price: Option<f64>,
    #[validate(range(max = 5, message = "min_rating must be between 0 and 5"))]
    pub min_rating: Option<u8>,
    pub in_stock: Option<bool>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TopRatedParams {
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

/// Price range query parameters; both bounds are required.
#[derive(Debug, Deserialize, Validate)]
pub struct PriceRangeParams {
    #[validate(range(min = 0.0, message = "min must not be negative"))]
    pub min: f64,
    #[validate(range(min = 0.0, message = "max must not be negative"))]
    pub max: f64,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<u32>,
}

#[axum::debug_handler]
pub async fn list_books(
    Extension(database): Extension<Arc<BooksDatabase>>,
    ApiQuery(pagination): ApiQuery<PaginationFilter>,
) -> Result<ResponseJson<ApiResponse<BookList>>, ApiError> {
    validate_params(&pagination)?;

    let books =
        BooksService::new(&database).list(pagination.page(), pagination.page_size())?;
    Ok(ResponseJson(ApiResponse::success(books, "Books retrieved successfully")))
}

#[axum::debug_handler]
pub async fn get_book(
    Extension(database): Extension<Arc<BooksDatabase>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ResponseJson<ApiResponse<Book>>, ApiError> {
    let book = BooksService::new(&database).get(id)?;
    Ok(ResponseJson(ApiResponse::success(book, "Book retrieved successfully")))
}

#[axum::debug_handler]
pub async fn search_books(
    Extension(database): Extension<Arc<BooksDatabase>>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<ResponseJson<ApiResponse<BookList>>, ApiError> {
    validate_params(&params)?;

    let filter = BookFilter {
        title: params.title.filter(|t| !t.is_empty()),
        category: params.category.filter(|c| !c.is_empty()),
        min_price: params.min_price,
        max_price: params.max_price,
        min_rating: params.min_rating,
        in_stock: params.in_stock,
    };
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let books = BooksService::new(&database).search(&filter, page, page_size)?;
    Ok(ResponseJson(ApiResponse::success(books, "Search completed")))
}

#[axum::debug_handler]
pub async fn get_top_rated_books(
    Extension(database): Extension<Arc<BooksDatabase>>,
    ApiQuery(params): ApiQuery<TopRatedParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Book>>>, ApiError> {
    validate_params(&params)?;

    let limit = params.limit.unwrap_or(DEFAULT_TOP_RATED);
    let books = BooksService::new(&database).top_rated(limit)?;
    Ok(ResponseJson(ApiResponse::ok(books)))
}

#[axum::debug_handler]
pub async fn get_books_by_price_range(
    Extension(database): Extension<Arc<BooksDatabase>>,
    ApiQuery(params): ApiQuery<PriceRangeParams>,
) -> Result<ResponseJson<ApiResponse<BookList>>, ApiError> {
    validate_params(&params)?;

    let books = BooksService::new(&database).by_price_range(
        params.min,
        params.max,
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;
    Ok(ResponseJson(ApiResponse::ok(books)))
}
