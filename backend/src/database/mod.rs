//! In-memory books dataset.
//!
//! The dataset is loaded in bulk from a flat file and answers paginated,
//! filtered and aggregated queries. Readers take a [`Snapshot`] (an `Arc` of
//! the current book list) and never hold a lock while they compute; a reload
//! builds the replacement off the async runtime and swaps it in whole.
//!
//! A request should take one snapshot and run every query against it, so a
//! concurrent reload cannot mix two datasets in one response.
//!
//! Every read on an unavailable (unloaded, empty or failed) snapshot returns an
//! empty or zeroed result. Turning that into `DataUnavailable` is the job of
//! the service layer.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use crate::errors::{ServiceError, ServiceResult};

pub mod codec;
pub mod models;

use models::*;

pub struct BooksDatabase {
    data_path: PathBuf,
    current: RwLock<Arc<Vec<Book>>>,
    /// Serializes loads so two rebuilds never race each other.
    reload_lock: Mutex<()>,
}

impl BooksDatabase {
    /// Creates an unloaded dataset backed by `data_path`.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            current: RwLock::new(Arc::new(Vec::new())),
            reload_lock: Mutex::new(()),
        }
    }

    /// Creates a dataset pre-populated with `books`.
    #[cfg(test)]
    pub fn with_books(data_path: impl Into<PathBuf>, books: Vec<Book>) -> Self {
        let database = Self::new(data_path);
        database.replace(books);
        database
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// The dataset as of now. Later reloads do not affect the returned value.
    pub fn snapshot(&self) -> Snapshot {
        let books = match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        };
        Snapshot { books }
    }

    fn replace(&self, books: Vec<Book>) {
        let next = Arc::new(books);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Parses `path` and replaces the current snapshot.
    ///
    /// On failure the dataset becomes unavailable and `DataUnavailable` is
    /// returned. Returns the number of books loaded.
    pub async fn load(&self, path: impl AsRef<Path>) -> ServiceResult<usize> {
        let _guard = self.reload_lock.lock().await;

        let path = path.as_ref().to_path_buf();
        let source = path.clone();
        let parsed = tokio::task::spawn_blocking(move || codec::read_books(&source))
            .await
            .map_err(|e| {
                ServiceError::internal_error(format!("Dataset load task failed: {}", e))
            })?;

        match parsed {
            Ok(books) => {
                let total = books.len();
                self.replace(books);
                if total == 0 {
                    tracing::warn!("Dataset {} contains no books", path.display());
                } else {
                    tracing::info!("Loaded {} books from {}", total, path.display());
                }
                Ok(total)
            }
            Err(e) => {
                tracing::error!("Failed to load dataset: {:#}", e);
                self.replace(Vec::new());
                Err(ServiceError::DataUnavailable {
                    message: format!("Failed to load dataset: {}", e),
                })
            }
        }
    }

    /// Reloads from the configured data path.
    pub async fn reload(&self) -> ServiceResult<usize> {
        self.load(&self.data_path).await
    }
}

/// An immutable view of the dataset, cheap to clone.
#[derive(Debug, Clone)]
pub struct Snapshot {
    books: Arc<Vec<Book>>,
}

impl Snapshot {
    pub fn is_available(&self) -> bool {
        !self.books.is_empty()
    }

    pub fn total_books(&self) -> usize {
        self.books.len()
    }

    /// Offset/limit slice in file order.
    pub fn get_page(&self, skip: usize, limit: usize) -> Vec<Book> {
        self.books.iter().skip(skip).take(limit).cloned().collect()
    }

    pub fn get_by_id(&self, id: i64) -> Option<Book> {
        self.books.iter().find(|book| book.id == id).cloned()
    }

    /// Applies `filter` and returns the requested page along with the total
    /// number of matches, in one pass.
    pub fn search(&self, filter: &BookFilter, skip: usize, limit: usize) -> Page {
        let mut total = 0;
        let mut books = Vec::new();

        for book in self.books.iter().filter(|book| filter.matches(book)) {
            if total >= skip && books.len() < limit {
                books.push(book.clone());
            }
            total += 1;
        }

        Page { total, books }
    }

    /// Books ordered by rating (highest first), ties broken by title.
    pub fn top_rated(&self, limit: usize) -> Vec<Book> {
        let mut ranked: Vec<&Book> = self.books.iter().collect();
        ranked.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.title.cmp(&b.title)));
        ranked.into_iter().take(limit).cloned().collect()
    }

    /// Inclusive price range. The caller guarantees `min <= max`.
    pub fn by_price_range(&self, min: f64, max: f64, skip: usize, limit: usize) -> Page {
        let filter = BookFilter {
            min_price: Some(min),
            max_price: Some(max),
            ..BookFilter::default()
        };
        self.search(&filter, skip, limit)
    }

    /// Book count per category, sorted by category name.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for book in self.books.iter() {
            *counts.entry(book.category.as_str()).or_default() += 1;
        }

        counts
            .into_iter()
            .map(|(name, total_books)| CategoryCount {
                name: name.to_string(),
                total_books,
            })
            .collect()
    }

    /// Collection-wide statistics.
    pub fn stats_overview(&self) -> StatsOverview {
        if self.books.is_empty() {
            return StatsOverview::default();
        }

        let total = self.books.len();
        let prices = PriceSummary::of(self.books.iter());
        let categories: HashSet<&str> = self.books.iter().map(|b| b.category.as_str()).collect();
        let in_stock = self.books.iter().filter(|b| b.in_stock).count();

        let mut rating_distribution = BTreeMap::new();
        for book in self.books.iter() {
            *rating_distribution.entry(book.rating).or_default() += 1;
        }

        StatsOverview {
            total_books: total,
            total_categories: categories.len(),
            average_price: prices.mean,
            min_price: prices.min,
            max_price: prices.max,
            average_rating: mean_rating(self.books.iter()),
            books_in_stock: in_stock,
            books_out_of_stock: total - in_stock,
            rating_distribution,
        }
    }

    /// Per-category statistics, largest category first.
    pub fn category_stats(&self) -> Vec<CategoryStats> {

        let mut stats: Vec<CategoryStats> = group_by_category(&self.books)
            .into_iter()
            .map(|(category, books)| {
                let prices = PriceSummary::of(books.iter().copied());
                CategoryStats {
                    category: category.to_string(),
                    total_books: books.len(),
                    average_price: prices.mean,
                    min_price: prices.min,
                    max_price: prices.max,
                    average_rating: mean_rating(books.iter().copied()),
                    books_in_stock: books.iter().filter(|b| b.in_stock).count(),
                }
            })
            .collect();

        // Stable: equal counts keep first-seen order
        stats.sort_by(|a, b| b.total_books.cmp(&a.total_books));
        stats
    }

    /// Books with normalized price/rating and an integer category code.
    ///
    /// Category codes follow first-seen order in this snapshot and are not
    /// stable across reloads.
    pub fn ml_features(&self) -> Vec<MlFeatures> {
        if self.books.is_empty() {
            return Vec::new();
        }

        let prices = PriceSummary::of(self.books.iter());
        let range = prices.max - prices.min;

        let mut codes: HashMap<&str, usize> = HashMap::new();
        self.books
            .iter()
            .map(|book| {
                let next = codes.len();
                let category_encoded = *codes.entry(book.category.as_str()).or_insert(next);
                let price_normalized = if range > 0.0 {
                    (book.price - prices.min) / range
                } else {
                    0.0
                };

                MlFeatures {
                    id: book.id,
                    title: book.title.clone(),
                    price: book.price,
                    rating: book.rating,
                    category: book.category.clone(),
                    in_stock: book.in_stock,
                    price_normalized,
                    rating_normalized: f64::from(book.rating) / f64::from(MAX_RATING),
                    category_encoded,
                }
            })
            .collect()
    }

    /// 25th/50th/75th price percentiles with linear interpolation.
    pub fn price_quartiles(&self) -> PriceQuartiles {
        let mut prices: Vec<f64> = self.books.iter().map(|b| b.price).collect();
        if prices.is_empty() {
            return PriceQuartiles::default();
        }
        prices.sort_by(f64::total_cmp);

        PriceQuartiles {
            q1: quantile(&prices, 0.25),
            median: quantile(&prices, 0.5),
            q3: quantile(&prices, 0.75),
        }
    }
}

struct PriceSummary {
    min: f64,
    max: f64,
    mean: f64,
}

impl PriceSummary {
    fn of<'a>(books: impl Iterator<Item = &'a Book>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for book in books {
            count += 1;
            sum += book.price;
            min = min.min(book.price);
            max = max.max(book.price);
        }

        if count == 0 {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        }
        Self {
            min,
            max,
            mean: sum / count as f64,
        }
    }
}

fn mean_rating<'a>(books: impl Iterator<Item = &'a Book>) -> f64 {
    let (count, sum) = books.fold((0usize, 0u64), |(count, sum), book| {
        (count + 1, sum + u64::from(book.rating))
    });
    if count == 0 { 0.0 } else { sum as f64 / count as f64 }
}

/// Groups books by category, keeping categories in first-seen order.
fn group_by_category(books: &[Book]) -> Vec<(&str, Vec<&Book>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Book>)> = Vec::new();
    for book in books {
        let slot = *index.entry(book.category.as_str()).or_insert_with(|| {
            groups.push((book.category.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(book);
    }
    groups
}

/// Quantile of already-sorted, non-empty values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
pub(crate) mod tests {
    use super::codec::tests::csv_file;
    use super::*;

    pub(crate) fn book(
        id: i64,
        title: &str,
        price: f64,
        rating: u8,
        in_stock: bool,
        category: &str,
    ) -> Book {
        Book {
            id,
            title: title.to_string(),
            price,
            price_text: format!("£{:.2}", price),
            rating,
            in_stock,
            quantity: if in_stock { 5 } else { 0 },
            availability_text: if in_stock { "In stock" } else { "Out of stock" }.to_string(),
            image_url: format!("http://img/{}.jpg", id),
            book_url: format!("http://book/{}", id),
            category: category.to_string(),
        }
    }

    pub(crate) fn sample_books() -> Vec<Book> {
        vec![
            book(1, "A Light in the Attic", 51.77, 3, true, "Poetry"),
            book(2, "Tipping the Velvet", 53.74, 1, true, "Historical Fiction"),
            book(3, "Soumission", 50.10, 1, false, "Fiction"),
            book(4, "Sharp Objects", 47.82, 4, true, "Mystery"),
            book(5, "Sapiens", 54.23, 5, true, "History"),
            book(6, "The Requiem Red", 22.65, 1, false, "Young Adult"),
            book(7, "The Dirty Little Secrets", 33.34, 4, true, "Business"),
            book(8, "The Coming Woman", 17.93, 3, true, "Fiction"),
            book(9, "The Boys in the Boat", 22.60, 4, false, "Fiction"),
            book(10, "Olio", 23.88, 1, true, "Poetry"),
        ]
    }

    pub(crate) fn sample_database() -> BooksDatabase {
        BooksDatabase::with_books("unused.csv", sample_books())
    }

    fn ids(books: &[Book]) -> Vec<i64> {
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_unloaded_dataset_is_unavailable() {
        let snapshot = BooksDatabase::new("missing.csv").snapshot();
        assert!(!snapshot.is_available());
        assert!(snapshot.get_page(0, 10).is_empty());
        assert!(snapshot.get_by_id(1).is_none());
        assert_eq!(snapshot.search(&BookFilter::default(), 0, 10).total, 0);
        assert!(snapshot.top_rated(5).is_empty());
        assert!(snapshot.categories().is_empty());
        assert_eq!(snapshot.stats_overview(), StatsOverview::default());
        assert!(snapshot.category_stats().is_empty());
        assert!(snapshot.ml_features().is_empty());
        assert_eq!(snapshot.price_quartiles(), PriceQuartiles::default());
    }

    #[tokio::test]
    async fn test_reload_round_trip_in_file_order() {
        let file = csv_file(&[
            "3,Third,3.0,£3.00,3,True,1,In stock,i,b,Art",
            "1,First,1.0,£1.00,1,False,0,Out of stock,i,b,Art",
            "2,Second,2.0,£2.00,2,True,2,In stock,i,b,Food",
        ]);
        let database = BooksDatabase::new(file.path());

        assert_eq!(database.reload().await.unwrap(), 3);
        let books = database.snapshot().get_page(0, 100);
        assert_eq!(ids(&books), vec![3, 1, 2]);
        assert_eq!(books, codec::read_books(file.path()).unwrap());
    }

    #[tokio::test]
    async fn test_failed_load_makes_dataset_unavailable() {
        let database = sample_database();
        assert!(database.snapshot().is_available());

        let result = database.load("/no/such/books.csv").await;
        assert!(matches!(result, Err(ServiceError::DataUnavailable { .. })));
        assert!(!database.snapshot().is_available());
    }

    #[tokio::test]
    async fn test_snapshot_is_unaffected_by_later_reloads() {
        let database = sample_database();
        let before = database.snapshot();

        assert!(database.load("/no/such/books.csv").await.is_err());
        assert!(!database.snapshot().is_available());

        // Taken before the failed reload, so still the full dataset
        assert!(before.is_available());
        assert_eq!(before.total_books(), 10);
        assert_eq!(before.get_page(0, 100).len(), 10);
        assert_eq!(before.stats_overview().total_books, 10);
    }

    #[tokio::test]
    async fn test_concurrent_reads_see_whole_snapshots() {
        let file = csv_file(&[
            "1,One,1.0,£1.00,1,True,1,In stock,i,b,Art",
            "2,Two,2.0,£2.00,2,True,1,In stock,i,b,Art",
        ]);
        let database = Arc::new(BooksDatabase::with_books(file.path(), sample_books()));

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let database = Arc::clone(&database);
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let snapshot = database.snapshot();
                        let total = snapshot.search(&BookFilter::default(), 0, usize::MAX).total;
                        assert!(total == 10 || total == 2, "torn snapshot with {} books", total);
                        assert_eq!(total, snapshot.total_books());
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        let reloads: Vec<_> = (0..3)
            .map(|_| {
                let database = Arc::clone(&database);
                tokio::spawn(async move { database.reload().await })
            })
            .collect();

        for reader in readers {
            reader.await.unwrap();
        }
        for reload in reloads {
            assert_eq!(reload.await.unwrap().unwrap(), 2);
        }
        assert_eq!(database.snapshot().total_books(), 2);
    }

    #[test]
    fn test_get_page_and_by_id() {
        let snapshot = sample_database().snapshot();
        assert_eq!(ids(&snapshot.get_page(2, 3)), vec![3, 4, 5]);
        assert!(snapshot.get_page(50, 10).is_empty());

        assert_eq!(snapshot.get_by_id(5).unwrap().title, "Sapiens");
        assert!(snapshot.get_by_id(99).is_none());
    }

    #[test]
    fn test_search_is_conjunctive() {
        let snapshot = sample_database().snapshot();
        let filter = BookFilter {
            min_price: Some(20.0),
            max_price: Some(50.0),
            min_rating: Some(4),
            ..BookFilter::default()
        };

        let page = snapshot.search(&filter, 0, 100);
        assert_eq!(ids(&page.books), vec![4, 7, 9]);
        assert_eq!(page.total, 3);
        for book in &page.books {
            assert!(book.price >= 20.0 && book.price <= 50.0 && book.rating >= 4);
        }
    }

    #[test]
    fn test_search_substrings_ignore_case() {
        let snapshot = sample_database().snapshot();
        let filter = BookFilter {
            title: Some("THE".to_string()),
            category: Some("fic".to_string()),
            ..BookFilter::default()
        };

        assert_eq!(ids(&snapshot.search(&filter, 0, 100).books), vec![2, 8, 9]);
    }

    #[test]
    fn test_search_in_stock_and_pagination() {
        let snapshot = sample_database().snapshot();
        let filter = BookFilter {
            in_stock: Some(false),
            ..BookFilter::default()
        };

        let page = snapshot.search(&filter, 1, 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.books.len(), 1);
        assert_eq!(page.books[0].id, 6);
    }

    #[test]
    fn test_empty_search_is_not_an_error() {
        let snapshot = sample_database().snapshot();
        let filter = BookFilter {
            min_price: Some(1000.0),
            ..BookFilter::default()
        };
        let page = snapshot.search(&filter, 0, 10);
        assert_eq!(page.total, 0);
        assert!(page.books.is_empty());
    }

    #[test]
    fn test_top_rated_orders_by_rating_then_title() {
        let snapshot = sample_database().snapshot();
        let titles: Vec<String> = snapshot.top_rated(4).into_iter().map(|b| b.title).collect();
        assert_eq!(
            titles,
            vec!["Sapiens", "Sharp Objects", "The Boys in the Boat", "The Dirty Little Secrets"]
        );
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let snapshot = sample_database().snapshot();
        let page = snapshot.by_price_range(22.60, 23.88, 0, 100);
        assert_eq!(ids(&page.books), vec![6, 9, 10]);
        assert_eq!(page.total, 3);

        let page = snapshot.by_price_range(22.60, 23.88, 2, 5);
        assert_eq!(page.total, 3);
        assert_eq!(page.books.len(), 1);
    }

    #[test]
    fn test_categories() {
        let categories = sample_database().snapshot().categories();
        assert_eq!(categories.len(), 7);
        let fiction = categories.iter().find(|c| c.name == "Fiction").unwrap();
        assert_eq!(fiction.total_books, 3);
        assert_eq!(categories.iter().map(|c| c.total_books).sum::<usize>(), 10);
    }

    #[test]
    fn test_stats_overview() {
        let stats = sample_database().snapshot().stats_overview();

        assert_eq!(stats.total_books, 10);
        assert_eq!(stats.total_categories, 7);
        assert_eq!(stats.min_price, 17.93);
        assert_eq!(stats.max_price, 54.23);
        assert!((stats.average_price - 37.806).abs() < 1e-9);
        assert!((stats.average_rating - 2.7).abs() < 1e-9);
        assert_eq!(stats.books_in_stock, 7);
        assert_eq!(stats.books_out_of_stock, 3);
        assert_eq!(stats.rating_distribution.get(&1), Some(&4));
        assert_eq!(stats.rating_distribution.get(&4), Some(&3));
        assert_eq!(stats.rating_distribution.get(&2), None);
    }

    #[test]
    fn test_category_stats_sorted_by_count() {
        let stats = sample_database().snapshot().category_stats();

        assert_eq!(stats[0].category, "Fiction");
        assert_eq!(stats[0].total_books, 3);
        assert_eq!(stats[0].min_price, 17.93);
        assert_eq!(stats[0].max_price, 50.10);
        assert_eq!(stats[0].books_in_stock, 1);
        assert_eq!(stats[1].category, "Poetry");
        assert_eq!(stats[1].total_books, 2);
        assert!(stats.windows(2).all(|w| w[0].total_books >= w[1].total_books));
    }

    #[test]
    fn test_ml_features() {
        let features = sample_database().snapshot().ml_features();

        assert_eq!(features.len(), 10);
        let cheapest = features.iter().find(|f| f.id == 8).unwrap();
        let priciest = features.iter().find(|f| f.id == 5).unwrap();
        assert_eq!(cheapest.price_normalized, 0.0);
        assert_eq!(priciest.price_normalized, 1.0);
        assert_eq!(priciest.rating_normalized, 1.0);

        // First-seen category order: Poetry, Historical Fiction, Fiction, ...
        assert_eq!(features[0].category_encoded, 0);
        assert_eq!(features[1].category_encoded, 1);
        assert_eq!(features[2].category_encoded, 2);
        assert_eq!(features[9].category_encoded, 0);
    }

    #[test]
    fn test_ml_features_with_identical_prices() {
        let database = BooksDatabase::with_books(
            "unused.csv",
            vec![book(1, "A", 10.0, 2, true, "X"), book(2, "B", 10.0, 4, false, "Y")],
        );
        for feature in database.snapshot().ml_features() {
            assert_eq!(feature.price_normalized, 0.0);
            assert!(!feature.price_normalized.is_nan());
        }
    }

    #[test]
    fn test_price_quartiles() {
        let database = BooksDatabase::with_books(
            "unused.csv",
            vec![
                book(1, "A", 1.0, 1, true, "X"),
                book(2, "B", 2.0, 1, true, "X"),
                book(3, "C", 3.0, 1, true, "X"),
                book(4, "D", 4.0, 1, true, "X"),
            ],
        );
        let quartiles = database.snapshot().price_quartiles();
        assert_eq!(quartiles.q1, 1.75);
        assert_eq!(quartiles.median, 2.5);
        assert_eq!(quartiles.q3, 3.25);
    }
}
