//! Book listing, lookup and search.

use crate::database::BooksDatabase;
use crate::database::models::{Book, BookFilter, MAX_RATING, Page};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::{MAX_PAGE_SIZE, available_snapshot, page_window};
use serde::{Deserialize, Serialize};

/// One page of books plus the size of the full result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookList {
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub books: Vec<Book>,
}

pub struct BooksService<'a> {
    database: &'a BooksDatabase,
}

impl<'a> BooksService<'a> {
    pub fn new(database: &'a BooksDatabase) -> Self {
        Self { database }
    }

    /// Lists books in file order.
    pub fn list(&self, page: u32, page_size: u32) -> ServiceResult<BookList> {
        let snapshot = available_snapshot(self.database)?;
        let (skip, limit) = page_window(page, page_size)?;

        Ok(BookList {
            total: snapshot.total_books(),
            page,
            page_size,
            books: snapshot.get_page(skip, limit),
        })
    }

    pub fn get(&self, id: i64) -> ServiceResult<Book> {
        available_snapshot(self.database)?
            .get_by_id(id)
            .ok_or_else(|| ServiceError::not_found("Book", id))
    }

    /// Conjunctive search over title, category, price, rating and stock.
    pub fn search(
        &self,
        filter: &BookFilter,
        page: u32,
        page_size: u32,
    ) -> ServiceResult<BookList> {
        let snapshot = available_snapshot(self.database)?;
        check_prices([filter.min_price, filter.max_price].into_iter().flatten())?;
        let (skip, limit) = page_window(page, page_size)?;

        if filter.min_rating.is_some_and(|rating| rating > MAX_RATING) {
            return Err(ServiceError::invalid_input(format!(
                "min_rating must be between 0 and {}",
                MAX_RATING
            )));
        }

        let result = snapshot.search(filter, skip, limit);
        Ok(into_list(result, page, page_size))
    }

    /// Highest rated first, ties broken by title.
    pub fn top_rated(&self, limit: u32) -> ServiceResult<Vec<Book>> {
        let snapshot = available_snapshot(self.database)?;
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ServiceError::invalid_input(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(snapshot.top_rated(limit as usize))
    }

    /// Books priced within `[min, max]`, inclusive.
    pub fn by_price_range(
        &self,
        min: f64,
        max: f64,
        page: u32,
        page_size: u32,
    ) -> ServiceResult<BookList> {
        let snapshot = available_snapshot(self.database)?;
        check_prices([min, max])?;
        let (skip, limit) = page_window(page, page_size)?;

        if min > max {
            return Err(ServiceError::invalid_input(
                "Minimum price cannot be greater than maximum price",
            ));
        }

        let result = snapshot.by_price_range(min, max, skip, limit);
        Ok(into_list(result, page, page_size))
    }
}

/// Price bounds must be finite and non-negative. NaN would otherwise slip
/// through every comparison and match the whole catalog.
fn check_prices(prices: impl IntoIterator<Item = f64>) -> ServiceResult<()> {
    for price in prices {
        if !price.is_finite() {
            return Err(ServiceError::invalid_input("Prices must be finite numbers"));
        }
        if price < 0.0 {
            return Err(ServiceError::invalid_input("Prices must not be negative"));
        }
    }
    Ok(())
}

fn into_list(result: Page, page: u32, page_size: u32) -> BookList {
    BookList {
        total: result.total,
        page,
        page_size,
        books: result.books,
    }
}
