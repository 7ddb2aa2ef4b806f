//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle login, token refreshing and the current-user lookup.
//! They are designed to be nested into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::jwt_auth;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
}
