//! Module for machine-learning API endpoints.
//!
//! Feature extraction, training data export, dataset statistics and the
//! (authenticated) prediction intake.

pub mod handlers;
pub mod routes;
