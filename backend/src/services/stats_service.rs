//! Collection-wide and per-category statistics.

use crate::database::BooksDatabase;
use crate::database::models::{CategoryStats, StatsOverview};
use crate::errors::ServiceResult;
use crate::services::available_snapshot;

pub struct StatsService<'a> {
    database: &'a BooksDatabase,
}

impl<'a> StatsService<'a> {
    pub fn new(database: &'a BooksDatabase) -> Self {
        Self { database }
    }

    pub fn overview(&self) -> ServiceResult<StatsOverview> {
        Ok(available_snapshot(self.database)?.stats_overview())
    }

    pub fn categories(&self) -> ServiceResult<Vec<CategoryStats>> {
        Ok(available_snapshot(self.database)?.category_stats())
    }
}
