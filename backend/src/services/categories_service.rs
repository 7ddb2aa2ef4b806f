//! Category listing.

use crate::database::BooksDatabase;
use crate::database::models::CategoryCount;
use crate::errors::ServiceResult;
use crate::services::available_snapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub total: usize,
    pub categories: Vec<CategoryCount>,
}

pub struct CategoriesService<'a> {
    database: &'a BooksDatabase,
}

impl<'a> CategoriesService<'a> {
    pub fn new(database: &'a BooksDatabase) -> Self {
        Self { database }
    }

    /// All categories with their book counts, sorted by name.
    pub fn list(&self) -> ServiceResult<CategoryList> {
        let categories = available_snapshot(self.database)?.categories();

        Ok(CategoryList {
            total: categories.len(),
            categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::sample_database;
    use crate::errors::ServiceError;

    #[test]
    fn test_list_categories() {
        let database = sample_database();
        let list = CategoriesService::new(&database).list().unwrap();

        assert_eq!(list.total, list.categories.len());
        assert_eq!(list.categories[0].name, "Business");
        let fiction = list.categories.iter().find(|c| c.name == "Fiction").unwrap();
        assert_eq!(fiction.total_books, 3);
        let sum: usize = list.categories.iter().map(|c| c.total_books).sum();
        assert_eq!(sum, database.snapshot().total_books());
    }

    #[test]
    fn test_list_without_data() {
        let database = BooksDatabase::new("missing.csv");
        assert!(matches!(
            CategoriesService::new(&database).list(),
            Err(ServiceError::DataUnavailable { .. })
        ));
    }
}
