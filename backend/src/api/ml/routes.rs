//! Defines the HTTP routes for machine-learning consumers.

use super::handlers::{get_features, get_ml_stats, get_training_data, submit_predictions};
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn ml_router() -> Router {
    Router::new()
        .route("/features", get(get_features))
        .route("/training-data", get(get_training_data))
        .route("/stats", get(get_ml_stats))
        .route(
            "/predictions",
            post(submit_predictions).layer(middleware::from_fn(jwt_auth)),
        )
}
