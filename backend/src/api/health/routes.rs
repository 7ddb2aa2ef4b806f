//! Defines the health check route.

use super::handlers::health_check;
use axum::{Router, routing::get};

pub fn health_router() -> Router {
    Router::new().route("/health", get(health_check))
}
