//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request data, hand it to [`AuthService`] and map
//! service errors onto HTTP responses.

use crate::api::common::{ApiError, ApiForm, ApiJson};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::middleware::RequestContext;
use axum::{extract::Extension, response::Json as ResponseJson};
use std::sync::Arc;

/// Handle user login request (OAuth2 password form)
#[axum::debug_handler]
pub async fn login(
    Extension(auth_service): Extension<Arc<AuthService>>,
    Extension(context): Extension<RequestContext>,
    ApiForm(payload): ApiForm<LoginRequest>,
) -> Result<ResponseJson<TokenResponse>, ApiError> {
    let username = payload.username.clone();

    // bcrypt verification is CPU bound
    let result = tokio::task::spawn_blocking(move || auth_service.login(payload))
        .await
        .map_err(|e| ServiceError::internal_error(format!("Login task failed: {}", e)))?;

    match result {
        Ok(response) => {
            tracing::info!(request_id = %context.request_id, "User '{}' logged in", username);
            Ok(ResponseJson(response))
        }
        Err(error) => {
            tracing::warn!(request_id = %context.request_id, "Failed login for '{}'", username);
            Err(error.into())
        }
    }
}

/// Handle token refresh request
#[axum::debug_handler]
pub async fn refresh_token(
    Extension(auth_service): Extension<Arc<AuthService>>,
    ApiJson(payload): ApiJson<RefreshTokenRequest>,
) -> Result<ResponseJson<TokenResponse>, ApiError> {
    Ok(ResponseJson(auth_service.refresh(payload)?))
}

/// Get current user information
#[axum::debug_handler]
pub async fn me(Extension(user): Extension<User>) -> ResponseJson<UserInfo> {
    ResponseJson(user.info())
}
