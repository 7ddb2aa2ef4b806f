//! Data structures for authentication-related entities.
//!
//! This module defines the stored user record, login/refresh payloads and the
//! token pair returned to clients.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user record held by the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub disabled: bool,
    pub password_hash: String,
}

impl User {
    /// Public view of the user, without the password hash.
    pub fn info(&self) -> UserInfo {
        UserInfo {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            disabled: self.disabled,
        }
    }
}

/// User information returned to authenticated callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub disabled: bool,
}

/// Login request payload (OAuth2 password form fields)
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Access/refresh token pair issued by login and refresh
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in minutes
    pub expires_in: i64,
    /// Refresh token lifetime in minutes
    pub refresh_expires_in: i64,
}
