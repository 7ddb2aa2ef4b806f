//! General-purpose middleware for the API.
//!
//! Every request gets a [`RequestContext`] carrying a request id (and, once
//! authenticated, the username). Handlers receive it as an extension and pass
//! it to their log calls instead of relying on ambient state.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
pub const PROCESS_TIME_HEADER: HeaderName = HeaderName::from_static("x-process-time");

/// Request-scoped logging fields.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub username: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            username: None,
        }
    }

    /// Username for log lines, `-` when anonymous.
    pub fn user(&self) -> &str {
        self.username.as_deref().unwrap_or("-")
    }
}

/// Attaches a fresh [`RequestContext`] and logs method, path, status and latency.
pub async fn request_context(mut request: Request, next: Next) -> Response {
    let started = Instant::now();
    let context = RequestContext::new();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    request.extensions_mut().insert(context.clone());
    let mut response = next.run(request).await;

    let elapsed = started.elapsed().as_secs_f64();
    tracing::info!(
        request_id = %context.request_id,
        "{} {} - Status: {} - Time: {:.3}s",
        method,
        path,
        response.status().as_u16(),
        elapsed
    );

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&context.request_id.to_string()) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{:.6}", elapsed)) {
        headers.insert(PROCESS_TIME_HEADER, value);
    }

    response
}
