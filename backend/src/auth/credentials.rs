//! In-memory credential store, seeded once at startup.
//!
//! Seed format: comma-separated `username:password:fullname:email` entries,
//! with an optional fifth field `disabled`. Malformed entries are skipped. If
//! nothing valid remains, two built-in development accounts are installed.
//! A hashing failure aborts seeding instead of skipping the entry.

use std::collections::HashMap;

use crate::auth::models::User;
use crate::auth::password::PasswordService;
use crate::errors::{ServiceError, ServiceResult};

/// bcrypt hash of `secret`, shared by the built-in accounts.
const FALLBACK_PASSWORD_HASH: &str =
    "$2b$12$EixZaYVK1fsbw1ZfbX3OXePaWxn96p36WQoeG6Lruj3vjPGga31lW";

#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: HashMap<String, User>,
}

impl CredentialStore {
    /// Builds a store from an explicit list of users. Later duplicates are ignored.
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut map = HashMap::new();
        for user in users {
            map.entry(user.username.clone()).or_insert(user);
        }
        Self { users: map }
    }

    /// Parses the seed string, hashing each password with `passwords`.
    ///
    /// # Errors
    /// `Internal` when a password cannot be hashed, e.g. an invalid bcrypt cost.
    pub fn from_seed(seed: &str, passwords: &PasswordService) -> ServiceResult<Self> {
        let mut users: HashMap<String, User> = HashMap::new();

        for (index, entry) in seed.split(',').enumerate() {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let parts: Vec<&str> = entry.split(':').collect();
            if parts.len() < 4 {
                tracing::warn!("Skipping malformed user entry #{}: expected 4 fields", index + 1);
                continue;
            }

            let username = parts[0].trim();
            let password = parts[1];
            if username.is_empty() || password.is_empty() {
                tracing::warn!("Skipping user entry #{}: empty username or password", index + 1);
                continue;
            }
            if users.contains_key(username) {
                tracing::warn!("Skipping duplicate user entry for '{}'", username);
                continue;
            }

            let password_hash = passwords.hash(password).map_err(|e| {
                ServiceError::internal_error(format!(
                    "Failed to hash password for '{}': {}",
                    username, e
                ))
            })?;

            let disabled = parts.get(4).is_some_and(|flag| {
                matches!(
                    flag.trim().to_ascii_lowercase().as_str(),
                    "disabled" | "true" | "1"
                )
            });

            users.insert(
                username.to_string(),
                User {
                    username: username.to_string(),
                    full_name: non_empty(parts[2]),
                    email: non_empty(parts[3]),
                    disabled,
                    password_hash,
                },
            );
            tracing::info!("Loaded user '{}' from configuration", username);
        }

        if users.is_empty() {
            tracing::warn!("No valid users configured, falling back to built-in accounts");
            return Ok(Self::fallback());
        }

        Ok(Self { users })
    }

    /// Built-in `admin` and `testuser` accounts, both with password `secret`.
    pub fn fallback() -> Self {
        tracing::warn!("Using built-in default users - NOT RECOMMENDED IN PRODUCTION!");
        Self::from_users([
            User {
                username: "admin".to_string(),
                full_name: Some("Admin User".to_string()),
                email: Some("admin@booksapi.com".to_string()),
                disabled: false,
                password_hash: FALLBACK_PASSWORD_HASH.to_string(),
            },
            User {
                username: "testuser".to_string(),
                full_name: Some("Test User".to_string()),
                email: Some("test@booksapi.com".to_string()),
                disabled: false,
                password_hash: FALLBACK_PASSWORD_HASH.to_string(),
            },
        ])
    }

    pub fn lookup(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}

fn non_empty(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_string())
}
