//! Record and result types for the books dataset.

use serde::{Deserialize, Deserializer, Serialize, de::Error as DeError};
use std::collections::BTreeMap;

/// One book as stored in the flat file. Field order matches the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub price_text: String,
    pub rating: u8,
    #[serde(deserialize_with = "deserialize_flag")]
    pub in_stock: bool,
    pub quantity: u32,
    pub availability_text: String,
    pub image_url: String,
    pub book_url: String,
    pub category: String,
}

/// Column names of the flat file, in order.
pub const BOOK_COLUMNS: [&str; 11] = [
    "id",
    "title",
    "price",
    "price_text",
    "rating",
    "in_stock",
    "quantity",
    "availability_text",
    "image_url",
    "book_url",
    "category",
];

pub const MAX_RATING: u8 = 5;

/// Accepts the spellings different writers use for booleans.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(D::Error::custom(format!("invalid boolean '{}'", other))),
    }
}

/// Conjunctive search filters. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    /// Case-insensitive substring of the category
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<u8>,
    pub in_stock: Option<bool>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(title) = &self.title {
            if !contains_ignore_case(&book.title, title) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !contains_ignore_case(&book.category, category) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| book.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| book.price > max) {
            return false;
        }
        if self.min_rating.is_some_and(|min| book.rating < min) {
            return false;
        }
        if self.in_stock.is_some_and(|in_stock| book.in_stock != in_stock) {
            return false;
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// One page of matches plus the size of the full match set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub total: usize,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub total_books: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StatsOverview {
    pub total_books: usize,
    pub total_categories: usize,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub average_rating: f64,
    pub books_in_stock: usize,
    pub books_out_of_stock: usize,
    /// Number of books per star rating
    pub rating_distribution: BTreeMap<u8, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total_books: usize,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub average_rating: f64,
    pub books_in_stock: usize,
}

/// A book with the derived columns used for model training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlFeatures {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub rating: u8,
    pub category: String,
    pub in_stock: bool,
    pub price_normalized: f64,
    pub rating_normalized: f64,
    pub category_encoded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PriceQuartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}
