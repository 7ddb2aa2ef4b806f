//! Defines the HTTP routes for categories.

use super::handlers::list_categories;
use axum::{Router, routing::get};

pub fn categories_router() -> Router {
    Router::new().route("/", get(list_categories))
}
