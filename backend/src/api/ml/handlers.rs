//! Handler functions for machine-learning API endpoints.

use crate::api::common::{ApiError, ApiJson, ApiResponse};
use crate::database::BooksDatabase;
use crate::database::models::MlFeatures;
use crate::middleware::RequestContext;
use crate::services::ml_service::{MlPrediction, MlService, MlStats, TrainingData};
use axum::{extract::Extension, response::Json as ResponseJson};
use std::sync::Arc;

#[axum::debug_handler]
pub async fn get_features(
    Extension(database): Extension<Arc<BooksDatabase>>,
) -> Result<ResponseJson<ApiResponse<Vec<MlFeatures>>>, ApiError> {
    let features = MlService::new(&database).features()?;
    Ok(ResponseJson(ApiResponse::ok(features)))
}

#[axum::debug_handler]
pub async fn get_training_data(
    Extension(database): Extension<Arc<BooksDatabase>>,
) -> Result<ResponseJson<ApiResponse<TrainingData>>, ApiError> {
    let data = MlService::new(&database).training_data()?;
    Ok(ResponseJson(ApiResponse::ok(data)))
}

#[axum::debug_handler]
pub async fn get_ml_stats(
    Extension(database): Extension<Arc<BooksDatabase>>,
) -> Result<ResponseJson<ApiResponse<MlStats>>, ApiError> {
    let stats = MlService::new(&database).ml_stats()?;
    Ok(ResponseJson(ApiResponse::ok(stats)))
}

/// Accepts model predictions (requires authentication)
#[axum::debug_handler]
pub async fn submit_predictions(
    Extension(database): Extension<Arc<BooksDatabase>>,
    Extension(context): Extension<RequestContext>,
    ApiJson(predictions): ApiJson<Vec<MlPrediction>>,
) -> ResponseJson<ApiResponse<Vec<MlPrediction>>> {
    let accepted = MlService::new(&database).submit_predictions(&context, predictions);
    let message = format!("Received {} prediction(s)", accepted.len());
    ResponseJson(ApiResponse::success(accepted, message))
}
