//! Central module for organizing the application's API endpoints.
//!
//! Each domain (books, categories, stats, ml, scraping, health) owns its
//! handlers and routes; [`router`] nests them, together with the auth routes,
//! under the versioned API prefix and attaches shared services as extensions.

pub mod books;
pub mod categories;
pub mod common;
pub mod health;
pub mod ml;
pub mod scraping;
pub mod stats;

use crate::api::common::ApiResponse;
use crate::auth::routes::auth_router;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::database::BooksDatabase;
use crate::middleware::request_context;
use crate::services::scraping_service::ScrapingService;
use axum::{Extension, Router, middleware, response::Json, routing::get};
use std::sync::Arc;

/// Builds the full application router.
pub fn router(
    config: Arc<Config>,
    auth_service: Arc<AuthService>,
    database: Arc<BooksDatabase>,
    scraping_service: Arc<ScrapingService>,
) -> Router {
    let api = Router::new()
        .merge(health::routes::health_router())
        .nest("/auth", auth_router())
        .nest("/books", books::routes::books_router())
        .nest("/categories", categories::routes::categories_router())
        .nest("/stats", stats::routes::stats_router())
        .nest("/ml", ml::routes::ml_router())
        .nest("/scraping", scraping::routes::scraping_router());

    Router::new()
        .route("/", get(root_handler))
        .nest(&config.api_prefix(), api)
        .layer(Extension(auth_service))
        .layer(Extension(database))
        .layer(Extension(scraping_service))
        .layer(Extension(config))
        .layer(middleware::from_fn(request_context))
}

async fn root_handler(
    Extension(config): Extension<Arc<Config>>,
) -> Json<ApiResponse<serde_json::Value>> {
    let prefix = config.api_prefix();
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Books API",
            "version": config.api_version,
            "health": format!("{}/health", prefix),
            "books": format!("{}/books", prefix),
            "login": format!("{}/auth/login", prefix),
        }),
        "Welcome to the Books API",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::tests::test_auth_service;
    use crate::database::tests::sample_database;
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::scraper::RemoteCsvScraper;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app(database: BooksDatabase, auth_service: AuthService) -> Router {
        let database = Arc::new(database);
        let scraper = Arc::new(RemoteCsvScraper::new("").unwrap());
        let scraping = Arc::new(ScrapingService::new(Arc::clone(&database), scraper));
        router(
            Arc::new(Config::default()),
            Arc::new(auth_service),
            database,
            scraping,
        )
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", username, password)))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn access_token(app: &Router) -> String {
        let response = app.clone().oneshot(login_request("admin", "secret")).await.unwrap();
        body_json(response).await["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_login_issues_token_pair() {
        let app = test_app(sample_database(), test_auth_service());

        let response = app.oneshot(login_request("admin", "secret")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let body = body_json(response).await;
        assert!(!body["access_token"].as_str().unwrap().is_empty());
        assert!(!body["refresh_token"].as_str().unwrap().is_empty());
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["expires_in"], 30);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let app = test_app(sample_database(), test_auth_service());

        let response = app.oneshot(login_request("admin", "wrong")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        assert_eq!(body_json(response).await["error"]["error_type"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let app = test_app(sample_database(), test_auth_service());
        let response = app.clone().oneshot(login_request("reader", "books")).await.unwrap();
        let body = body_json(response).await;
        let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/refresh")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "refresh_token": refresh_token }).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_ne!(body_json(response).await["refresh_token"].as_str().unwrap(), refresh_token);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = test_app(sample_database(), test_auth_service());

        let response = app.clone().oneshot(get("/api/v1/auth/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/scraping/reload")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.oneshot(get("/api/v1/auth/me", Some("not-a-token"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_returns_current_user() {
        let app = test_app(sample_database(), test_auth_service());
        let token = access_token(&app).await;

        let response = app.oneshot(get("/api/v1/auth/me", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["username"], "admin");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_disabled_user_is_forbidden() {
        let auth_service = test_auth_service();
        let token = auth_service.tokens().issue_access("ghost").unwrap();
        let app = test_app(sample_database(), auth_service);

        let response = app.oneshot(get("/api/v1/auth/me", Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_price_range_rejects_inverted_bounds() {
        let app = test_app(sample_database(), test_auth_service());

        let response = app
            .clone()
            .oneshot(get("/api/v1/books/price-range?min=20&max=10", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get("/api/v1/books/price-range?min=20&max=50", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let books = body["data"]["books"].as_array().unwrap();
        assert_eq!(body["data"]["total"], books.len());
        assert!(books.iter().all(|b| (20.0..=50.0).contains(&b["price"].as_f64().unwrap())));
    }

    #[tokio::test]
    async fn test_reads_before_load_are_unavailable() {
        let app = test_app(BooksDatabase::new("missing.csv"), test_auth_service());

        for uri in [
            "/api/v1/books",
            "/api/v1/categories",
            "/api/v1/stats/overview",
            "/api/v1/ml/features",
        ] {
            let response = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        }

        let response = app.oneshot(get("/api/v1/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["data_available"], false);
    }

    #[tokio::test]
    async fn test_books_listing_and_lookup() {
        let app = test_app(sample_database(), test_auth_service());

        let response = app
            .clone()
            .oneshot(get("/api/v1/books?page=2&page_size=3", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["total"], 10);
        assert_eq!(body["data"]["page"], 2);
        assert_eq!(body["data"]["books"][0]["id"], 4);

        let response = app
            .clone()
            .oneshot(get("/api/v1/books?page_size=500", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.clone().oneshot(get("/api/v1/books/5", None)).await.unwrap();
        assert_eq!(body_json(response).await["data"]["title"], "Sapiens");

        let response = app.oneshot(get("/api/v1/books/9999", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_applies_all_filters() {
        let app = test_app(sample_database(), test_auth_service());

        let response = app
            .oneshot(get("/api/v1/books/search?min_price=20&max_price=40&min_rating=4", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let books = body["data"]["books"].as_array().unwrap();
        assert!(!books.is_empty());
        for book in books {
            let price = book["price"].as_f64().unwrap();
            assert!((20.0..=40.0).contains(&price));
            assert!(book["rating"].as_u64().unwrap() >= 4);
        }
    }

    #[tokio::test]
    async fn test_predictions_require_auth() {
        let app = test_app(sample_database(), test_auth_service());
        let payload = serde_json::json!([{
            "book_id": 1,
            "prediction": 4.5,
            "confidence": 0.85,
            "model_version": "v1.0"
        }]);

        let request = |token: Option<&str>| {
            let mut builder = Request::builder()
                .method("POST")
                .uri("/api/v1/ml/predictions")
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            builder.body(Body::from(payload.to_string())).unwrap()
        };

        let response = app.clone().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let token = access_token(&app).await;
        let response = app.oneshot(request(Some(&token))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"][0]["book_id"], 1);
    }

    #[tokio::test]
    async fn test_price_range_rejects_non_finite_bounds() {
        let app = test_app(sample_database(), test_auth_service());

        for uri in [
            "/api/v1/books/price-range?min=NaN&max=NaN",
            "/api/v1/books/price-range?min=0&max=inf",
            "/api/v1/books/search?min_price=NaN",
        ] {
            let response = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"]["error_type"], "invalid_input");
        }
    }

    #[tokio::test]
    async fn test_unparsable_request_data_uses_error_envelope() {
        let app = test_app(sample_database(), test_auth_service());

        for uri in [
            "/api/v1/books?page=abc",
            "/api/v1/books/price-range?min=10",
            "/api/v1/books/top-rated?limit=-1",
            "/api/v1/books/not-a-number",
        ] {
            let response = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert!(response.headers().contains_key(REQUEST_ID_HEADER));
            let body = body_json(response).await;
            assert_eq!(body["success"], false, "{}", uri);
            assert_eq!(body["error"]["error_type"], "invalid_request", "{}", uri);
        }

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/refresh")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["error_type"], "invalid_request");

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
        assert_eq!(body_json(response).await["error"]["error_type"], "invalid_request");
    }
}
