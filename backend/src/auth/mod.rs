//! Authentication module: credential store, password hashing, JWT issuance
//! and validation, and the HTTP surface built on top of them.

pub mod credentials;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;
pub mod token;
