//! Defines the HTTP routes for the book catalog.

use super::handlers::{
    get_book, get_books_by_price_range, get_top_rated_books, list_books, search_books,
};
use axum::{Router, routing::get};

pub fn books_router() -> Router {
    Router::new()
        .route("/", get(list_books))
        .route("/search", get(search_books))
        .route("/top-rated", get(get_top_rated_books))
        .route("/price-range", get(get_books_by_price_range))
        .route("/{id}", get(get_book))
}
