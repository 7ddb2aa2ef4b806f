//! Central module for application-wide configuration settings.
//!
//! This module handles loading the signing secret and token lifetimes, the
//! credential seed string, the dataset location and the server bind address.

use crate::auth::password::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use anyhow::{Context, Result, bail};
use std::env;
use std::str::FromStr;

pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-here-change-in-production";

pub const DEFAULT_AUTH_USERS: &str =
    "admin:secret:Admin User:admin@booksapi.com,testuser:secret:Test User:test@booksapi.com";

/// Longest accepted access token lifetime: one year.
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 365 * 24 * 60;
/// Longest accepted refresh token lifetime: ten years.
pub const MAX_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub auth_users: String,
    pub bcrypt_cost: u32,
    pub data_path: String,
    pub scraping_url: String,
    pub api_version: String,
    pub environment: String,
    pub server_host: String,
    pub server_port: u16,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
            auth_users: DEFAULT_AUTH_USERS.to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            data_path: "data/books.csv".to_string(),
            scraping_url: String::new(),
            api_version: "v1".to_string(),
            environment: "development".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to the
    /// development defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let config = Config {
            secret_key: env::var("SECRET_KEY").unwrap_or(defaults.secret_key),
            algorithm: env::var("ALGORITHM").unwrap_or(defaults.algorithm),
            access_token_expire_minutes: parse_var(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                defaults.access_token_expire_minutes,
            )?,
            refresh_token_expire_days: parse_var(
                "REFRESH_TOKEN_EXPIRE_DAYS",
                defaults.refresh_token_expire_days,
            )?,
            auth_users: env::var("AUTH_USERS").unwrap_or(defaults.auth_users),
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            data_path: env::var("DATA_PATH").unwrap_or(defaults.data_path),
            scraping_url: env::var("SCRAPING_URL").unwrap_or(defaults.scraping_url),
            api_version: env::var("API_VERSION").unwrap_or(defaults.api_version),
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would break hashing or token issuance later on.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}, got {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
                self.bcrypt_cost
            );
        }
        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&self.access_token_expire_minutes) {
            bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {}, got {}",
                MAX_ACCESS_TOKEN_EXPIRE_MINUTES,
                self.access_token_expire_minutes
            );
        }
        if !(1..=MAX_REFRESH_TOKEN_EXPIRE_DAYS).contains(&self.refresh_token_expire_days) {
            bail!(
                "REFRESH_TOKEN_EXPIRE_DAYS must be between 1 and {}, got {}",
                MAX_REFRESH_TOKEN_EXPIRE_DAYS,
                self.refresh_token_expire_days
            );
        }
        Ok(())
    }

    /// True when no signing secret was configured.
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Refresh token lifetime expressed in minutes, as reported to clients.
    /// `None` on overflow.
    pub fn refresh_token_expire_minutes(&self) -> Option<i64> {
        self.refresh_token_expire_days.checked_mul(24 * 60)
    }

    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}
