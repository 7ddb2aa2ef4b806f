//! Module for category API endpoints.

pub mod handlers;
pub mod routes;
