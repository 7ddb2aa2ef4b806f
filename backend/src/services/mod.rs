//! Module for core business logic services.
//!
//! Services sit between the routing glue and the [`BooksDatabase`]: they check
//! that data is available, validate and translate pagination, and shape the
//! response payloads. Each operation answers from a single [`Snapshot`]. The
//! scraping service orchestrates background refreshes.

use crate::database::{BooksDatabase, Snapshot};
use crate::errors::{ServiceError, ServiceResult};

pub mod books_service;
pub mod categories_service;
pub mod ml_service;
pub mod scraping_service;
pub mod stats_service;

pub const MAX_PAGE_SIZE: u32 = 100;

/// Takes the current snapshot, failing with `DataUnavailable` unless it holds
/// at least one book.
pub(crate) fn available_snapshot(database: &BooksDatabase) -> ServiceResult<Snapshot> {
    let snapshot = database.snapshot();
    if snapshot.is_available() {
        Ok(snapshot)
    } else {
        Err(ServiceError::data_unavailable())
    }
}

/// Translates a 1-indexed page into `(skip, limit)`.
pub(crate) fn page_window(page: u32, page_size: u32) -> ServiceResult<(usize, usize)> {
    if page < 1 {
        return Err(ServiceError::invalid_input("page must be at least 1"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ServiceError::invalid_input(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    let skip = (page as usize - 1) * page_size as usize;
    Ok((skip, page_size as usize))
}
