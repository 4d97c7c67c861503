//! Registration, login, session issuance and access-token verification.
//! Holds a narrow `Store` handle plus the process-wide `TokenManager` as
//! `Arc`s rather than owning concrete types.
use chrono::Utc;
use database::Store;
use model::user::{Credentials, TokenPair};
use model::User;
use shared::token::{generate_refresh_token, TokenError, TokenManager};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 72;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("login must not be empty")]
    InvalidLogin,
    #[error("password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters")]
    InvalidPassword,
    #[error("login already taken")]
    DuplicateLogin,
    #[error("invalid login or password")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token")]
    InvalidToken,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<database::StoreError> for IdentityError {
    fn from(err: database::StoreError) -> Self {
        match err {
            database::StoreError::DuplicateLogin => IdentityError::DuplicateLogin,
            database::StoreError::Other(err) => IdentityError::Internal(err.into()),
        }
    }
}

pub struct IdentityService {
    store: Arc<dyn Store>,
    tokens: TokenManager,
    password_salt: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl IdentityService {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: TokenManager,
        password_salt: String,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            store,
            tokens,
            password_salt,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Validates `login`/`password` shape, hashes the password, and inserts
    /// the User and its zeroed Balance row in one transaction. Returns the
    /// created user together with a freshly issued token pair.
    pub async fn register(&self, credentials: &Credentials) -> Result<(User, TokenPair), IdentityError> {
        validate_login(&credentials.login)?;
        validate_password(&credentials.password)?;
        let hash = shared::password::hash(&credentials.password, &self.password_salt)?;
        let user = self
            .store
            .create_user_with_balance(&credentials.login, &hash)
            .await?;
        let tokens = self.issue_session(user.id).await?;
        Ok((user, tokens))
    }

    /// Fetches the user by login and verifies the password. Missing login
    /// and wrong password are deliberately indistinguishable to the caller.
    pub async fn login(&self, credentials: &Credentials) -> Result<(User, TokenPair), IdentityError> {
        let user = self
            .store
            .get_user_by_login(&credentials.login)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;
        let matches = shared::password::verify(&credentials.password, &self.password_salt, &user.password_hash)?;
        if !matches {
            return Err(IdentityError::InvalidCredentials);
        }
        let tokens = self.issue_session(user.id).await?;
        Ok((user, tokens))
    }

    /// Mints a fresh access/refresh pair and persists the refresh token,
    /// superseding any prior session for this user (delete-then-insert, see
    /// `database::users::upsert_session`).
    async fn issue_session(&self, user_id: i64) -> Result<TokenPair, IdentityError> {
        let now = Utc::now();
        let access_token = self.tokens.issue_access_token(user_id, self.access_ttl, now);
        let refresh_token = generate_refresh_token();
        let expires_at = now
            + chrono::Duration::from_std(self.refresh_ttl).unwrap_or_else(|_| chrono::Duration::zero());
        self.store
            .upsert_session(database::NewSession {
                user_id,
                refresh_token: refresh_token.clone(),
                expires_at,
            })
            .await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<i64, IdentityError> {
        self.tokens.verify_access_token(token).map_err(|err| match err {
            TokenError::Expired => IdentityError::TokenExpired,
            TokenError::Invalid => IdentityError::InvalidToken,
        })
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<User, IdentityError> {
        self.store
            .get_user_by_id(id)
            .await?
            .ok_or(IdentityError::NotFound)
    }
}

fn validate_login(login: &str) -> Result<(), IdentityError> {
    if login.trim().is_empty() {
        return Err(IdentityError::InvalidLogin);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), IdentityError> {
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password.len()) {
        return Err(IdentityError::InvalidPassword);
    }
    Ok(())
}

impl From<shared::password::PasswordError> for IdentityError {
    fn from(err: shared::password::PasswordError) -> Self {
        IdentityError::Internal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_login() {
        assert!(matches!(validate_login(""), Err(IdentityError::InvalidLogin)));
        assert!(matches!(validate_login("   "), Err(IdentityError::InvalidLogin)));
    }

    #[test]
    fn rejects_out_of_range_password() {
        assert!(matches!(validate_password("short"), Err(IdentityError::InvalidPassword)));
        assert!(matches!(validate_password(&"a".repeat(73)), Err(IdentityError::InvalidPassword)));
        assert!(validate_password("password1").is_ok());
    }
}
