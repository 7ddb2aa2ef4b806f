//! Middleware for protecting authenticated routes.
//!
//! Validates the bearer access token and makes the resolved [`User`] available
//! to handlers as a request extension.

use crate::api::common::ApiError;
use crate::auth::service::AuthService;
use crate::errors::ServiceError;
use crate::middleware::RequestContext;
use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// JWT authentication middleware
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_service = request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| ServiceError::internal_error("Auth service is not configured"))?;

    let token = bearer_token(&request)?.to_string();
    let user = auth_service.authenticate(&token)?;

    if let Some(context) = request.extensions_mut().get_mut::<RequestContext>() {
        context.username = Some(user.username.clone());
        tracing::debug!(request_id = %context.request_id, "Authenticated {}", user.username);
    }
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(request: &Request) -> Result<&str, ServiceError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ServiceError::unauthorized("Missing authorization header"))?;

    match header.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ServiceError::unauthorized("Expected a bearer token")),
    }
}
