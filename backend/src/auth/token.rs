//! JWT token utilities for authentication.
//!
//! Issues and validates signed, time-bound access and refresh tokens. Tokens
//! carry no server-side state: validity is a function of signature, expiry
//! and the `type` claim. There is no revocation list, so a leaked token stays
//! valid until it expires.

use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult, TokenError};

/// Value of the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenKind>,
    /// Expiration, seconds since the epoch (UTC)
    pub exp: i64,
    /// Issued at, seconds since the epoch (UTC)
    pub iat: i64,
    /// Unique token identifier
    #[serde(default)]
    pub jti: String,
}

/// Signs and verifies tokens with a server-held symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a new TokenService. Only HMAC algorithms and positive lifetimes
    /// are accepted.
    pub fn new(
        secret: &str,
        algorithm: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> ServiceResult<Self> {
        let algorithm = Algorithm::from_str(algorithm).map_err(|_| {
            ServiceError::internal_error(format!("Unknown JWT algorithm: {}", algorithm))
        })?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ServiceError::internal_error(format!(
                "Unsupported JWT algorithm {:?}: a symmetric HS* algorithm is required",
                algorithm
            )));
        }

        if access_ttl <= Duration::zero() || refresh_ttl <= Duration::zero() {
            return Err(ServiceError::internal_error("Token lifetimes must be positive"));
        }

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(TokenService {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn from_config(config: &Config) -> ServiceResult<Self> {
        let access_ttl = Duration::try_minutes(config.access_token_expire_minutes);
        let refresh_ttl = config
            .refresh_token_expire_minutes()
            .and_then(Duration::try_minutes);

        match (access_ttl, refresh_ttl) {
            (Some(access_ttl), Some(refresh_ttl)) => {
                Self::new(&config.secret_key, &config.algorithm, access_ttl, refresh_ttl)
            }
            _ => Err(ServiceError::internal_error("Token lifetime is out of range")),
        }
    }

    pub fn access_ttl_minutes(&self) -> i64 {
        self.access_ttl.num_minutes()
    }

    pub fn refresh_ttl_minutes(&self) -> i64 {
        self.refresh_ttl.num_minutes()
    }

    pub fn issue_access(&self, username: &str) -> Result<String, TokenError> {
        self.issue(username, TokenKind::Access, self.access_ttl)
    }

    pub fn issue_refresh(&self, username: &str) -> Result<String, TokenError> {
        self.issue(username, TokenKind::Refresh, self.refresh_ttl)
    }

    fn issue(&self, username: &str, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            TokenError::Encoding(format!("{} token lifetime overflows", kind.as_str()))
        })?;
        let claims = Claims {
            sub: Some(username.to_string()),
            token_type: Some(kind),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verifies signature, structure and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        // Valid only while now < exp
        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Resolves an access token to its username.
    pub fn validate_access(&self, token: &str) -> ServiceResult<String> {
        self.validate(token, TokenKind::Access)
    }

    /// Resolves a refresh token to its username.
    pub fn validate_refresh(&self, token: &str) -> ServiceResult<String> {
        self.validate(token, TokenKind::Refresh)
    }

    fn validate(&self, token: &str, expected: TokenKind) -> ServiceResult<String> {
        let claims = self.decode(token)?;

        if claims.token_type != Some(expected) {
            return Err(ServiceError::unauthorized(format!(
                "Invalid token type: expected {}",
                expected.as_str()
            )));
        }

        claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| ServiceError::unauthorized("Token subject missing"))
    }
}
