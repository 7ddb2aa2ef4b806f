//! Defines the HTTP routes for scraping and reloading the dataset.
//!
//! Every route here requires a valid access token.

use super::handlers::{reload_data, trigger_scraping};
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::post};

pub fn scraping_router() -> Router {
    Router::new()
        .route("/trigger", post(trigger_scraping))
        .route("/reload", post(reload_data))
        .route_layer(middleware::from_fn(jwt_auth))
}
