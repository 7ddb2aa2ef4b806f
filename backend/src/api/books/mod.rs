//! Module for book catalog API endpoints.
//!
//! Listing, lookup by id, filtered search, top-rated and price-range queries.

pub mod handlers;
pub mod routes;
