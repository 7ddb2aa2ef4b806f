//! Module for dataset refresh endpoints (authenticated).

pub mod handlers;
pub mod routes;
