//! Domain service for credentials and second factors.
//!
//! Handles registration, login (password plus optional TOTP), password changes
//! and enabling or disabling two-factor authentication. The service never
//! tracks who is logged in; callers keep the returned [`AuthenticatedUser`]
//! and pass identities back in explicitly.

use thiserror::Error;

use crate::models::user::{AuthenticatedUser, Role};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email is already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password. The two are deliberately not
    /// distinguished.
    #[error("Invalid email or password")]
    UnknownUser,

    #[error("Invalid or missing two-factor code")]
    InvalidSecondFactor,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateEmail`] if the email is taken, or
    /// [`AuthError::Validation`] for a malformed email or short password.
    async fn register(&self, email: &str, password: &str, role: Role) -> Result<i32, AuthError>;

    /// Checks the password and, when the account has a TOTP secret, the code.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownUser`] for an unknown email or wrong
    /// password, and [`AuthError::InvalidSecondFactor`] when 2FA is enabled
    /// and `totp_code` is missing or does not verify.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> Result<AuthenticatedUser, AuthError>;

    /// Re-checks the old password, then stores a hash of the new one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownUser`] if the old password is wrong.
    async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Enables 2FA with `secret`, or disables it with `None`.
    async fn set_totp_secret(&self, email: &str, secret: Option<&str>) -> Result<(), AuthError>;

    async fn get_user(&self, user_id: i32) -> Result<AuthenticatedUser, AuthError>;

    async fn get_totp_secret(&self, user_id: i32) -> Result<Option<String>, AuthError>;

    /// A fresh secret and its `otpauth://` enrollment URI for `email`.
    fn generate_totp_secret(&self, email: &str) -> (String, String);

    /// Checks a code against `secret` at the current time.
    fn verify_totp(&self, secret: &str, code: &str) -> bool;
}
