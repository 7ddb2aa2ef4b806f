//! Core business logic for the authentication system.

use crate::auth::credentials::CredentialStore;
use crate::auth::models::*;
use crate::auth::password::PasswordService;
use crate::auth::token::TokenService;
use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};
use validator::Validate;

/// Plaintext hashed at startup so unknown usernames still cost one bcrypt verify.
const DUMMY_PASSWORD: &str = "unknown-user-placeholder";

/// Authentication service for handling login, token refresh and identity resolution
pub struct AuthService {
    credentials: CredentialStore,
    passwords: PasswordService,
    tokens: TokenService,
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        credentials: CredentialStore,
        passwords: PasswordService,
        tokens: TokenService,
    ) -> ServiceResult<Self> {
        let dummy_hash = passwords.hash(DUMMY_PASSWORD)?;
        Ok(AuthService {
            credentials,
            passwords,
            tokens,
            dummy_hash,
        })
    }

    /// Builds the credential store and token service from configuration.
    pub fn from_config(config: &Config) -> ServiceResult<Self> {
        let passwords = PasswordService::new(config.bcrypt_cost);
        let credentials = CredentialStore::from_seed(&config.auth_users, &passwords)?;
        let tokens = TokenService::from_config(config)?;

        tracing::info!("Credential store ready with {} user(s)", credentials.len());
        Self::new(credentials, passwords, tokens)
    }

    #[cfg(test)]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Authenticate user and issue an access/refresh token pair.
    ///
    /// Unknown user, wrong password and disabled account all produce the same
    /// `InvalidCredentials` error.
    pub fn login(&self, login_request: LoginRequest) -> ServiceResult<TokenResponse> {
        if let Err(validation_errors) = login_request.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::invalid_input(error_messages.join(", ")));
        }

        let Some(user) = self.credentials.lookup(&login_request.username) else {
            // Same bcrypt work as a real account, so timing does not reveal the miss
            self.passwords.verify(&login_request.password, &self.dummy_hash);
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.passwords.verify(&login_request.password, &user.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        if user.disabled {
            tracing::warn!("Login attempt for disabled user '{}'", user.username);
            return Err(ServiceError::InvalidCredentials);
        }

        self.issue_pair(&user.username)
    }

    /// Exchange a refresh token for a new access/refresh pair (rotation).
    pub fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<TokenResponse> {
        let username = self
            .tokens
            .validate_refresh(&request.refresh_token)
            .map_err(|e| {
                tracing::debug!("Refresh token rejected: {}", e);
                ServiceError::InvalidCredentials
            })?;

        // The user may have been removed or disabled since the token was issued
        let user = self
            .credentials
            .lookup(&username)
            .filter(|user| !user.disabled)
            .ok_or(ServiceError::InvalidCredentials)?;

        self.issue_pair(&user.username)
    }

    /// Resolve a bearer access token to the user it was issued for.
    ///
    /// # Errors
    /// `Unauthorized` for an invalid, expired or wrong-type token or an unknown
    /// user; `Forbidden` when the account is disabled.
    pub fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let username = self.tokens.validate_access(token)?;

        let user = self
            .credentials
            .lookup(&username)
            .ok_or_else(|| ServiceError::unauthorized("Could not validate credentials"))?;

        if user.disabled {
            return Err(ServiceError::forbidden("Inactive user"));
        }

        Ok(user.clone())
    }

    fn issue_pair(&self, username: &str) -> ServiceResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: self.tokens.issue_access(username)?,
            refresh_token: self.tokens.issue_refresh(username)?,
            token_type: "bearer".to_string(),
            expires_in: self.tokens.access_ttl_minutes(),
            refresh_expires_in: self.tokens.refresh_ttl_minutes(),
        })
    }
}
