//! Module for the health check endpoint.

pub mod handlers;
pub mod routes;
