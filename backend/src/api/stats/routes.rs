//! Defines the HTTP routes for statistics.

use super::handlers::{get_category_stats, get_overview};
use axum::{Router, routing::get};

pub fn stats_router() -> Router {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/categories", get(get_category_stats))
}
