//! Machine-learning oriented views of the dataset.
//!
//! Predictions posted by clients are accepted and logged; nothing is stored.

use crate::database::BooksDatabase;
use crate::database::models::MlFeatures;
use crate::errors::ServiceResult;
use crate::middleware::RequestContext;
use crate::services::available_snapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FEATURE_COLUMNS: [&str; 4] = [
    "price_normalized",
    "rating_normalized",
    "category_encoded",
    "in_stock",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingData {
    pub features: Vec<MlFeatures>,
    pub metadata: TrainingMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub total_samples: usize,
    pub total_categories: usize,
    pub feature_columns: Vec<String>,
    pub description: String,
}

/// A model prediction for one book, as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    pub book_id: i64,
    pub prediction: f64,
    pub confidence: Option<f64>,
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlStats {
    pub dataset_size: usize,
    pub num_categories: usize,
    pub price_distribution: PriceDistribution,
    pub rating_distribution: BTreeMap<u8, usize>,
    pub stock_balance: StockBalance,
    pub category_distribution: Vec<CategoryShare>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceDistribution {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockBalance {
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub in_stock_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub count: usize,
}

pub struct MlService<'a> {
    database: &'a BooksDatabase,
}

impl<'a> MlService<'a> {
    pub fn new(database: &'a BooksDatabase) -> Self {
        Self { database }
    }

    pub fn features(&self) -> ServiceResult<Vec<MlFeatures>> {
        Ok(available_snapshot(self.database)?.ml_features())
    }

    /// Feature rows plus dataset metadata.
    pub fn training_data(&self) -> ServiceResult<TrainingData> {
        let snapshot = available_snapshot(self.database)?;
        let features = snapshot.ml_features();
        let overview = snapshot.stats_overview();

        Ok(TrainingData {
            metadata: TrainingMetadata {
                total_samples: features.len(),
                total_categories: overview.total_categories,
                feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
                description: "Books dataset for training recommendation models".to_string(),
            },
            features,
        })
    }

    /// Accepts predictions and echoes them back.
    pub fn submit_predictions(
        &self,
        context: &RequestContext,
        predictions: Vec<MlPrediction>,
    ) -> Vec<MlPrediction> {
        tracing::info!(
            request_id = %context.request_id,
            "Received {} prediction(s) from {}",
            predictions.len(),
            context.user()
        );
        predictions
    }

    pub fn ml_stats(&self) -> ServiceResult<MlStats> {
        let snapshot = available_snapshot(self.database)?;
        let overview = snapshot.stats_overview();
        let quartiles = snapshot.price_quartiles();
        let categories = snapshot.categories();

        let denominator = overview.total_books.max(1) as f64;
        let percentage = overview.books_in_stock as f64 / denominator * 100.0;

        Ok(MlStats {
            dataset_size: overview.total_books,
            num_categories: categories.len(),
            price_distribution: PriceDistribution {
                min: overview.min_price,
                q1: quartiles.q1,
                median: quartiles.median,
                q3: quartiles.q3,
                max: overview.max_price,
                mean: overview.average_price,
            },
            rating_distribution: overview.rating_distribution,
            stock_balance: StockBalance {
                in_stock: overview.books_in_stock,
                out_of_stock: overview.books_out_of_stock,
                in_stock_percentage: (percentage * 100.0).round() / 100.0,
            },
            category_distribution: categories
                .into_iter()
                .map(|c| CategoryShare {
                    category: c.name,
                    count: c.total_books,
                })
                .collect(),
        })
    }
}
