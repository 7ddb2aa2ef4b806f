//! Module for statistics API endpoints.
//!
//! Exposes the collection overview and per-category breakdowns.

pub mod handlers;
pub mod routes;
