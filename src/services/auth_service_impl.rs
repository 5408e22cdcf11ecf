//! `SeaORM` implementation of the `AuthService` trait.

use std::str::FromStr;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::constants::limits::MAX_EMAIL_LENGTH;
use crate::db::Store;
use crate::db::repositories::user::hash_password;
use crate::entities::users;
use crate::models::user::{AuthenticatedUser, Role};
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::totp;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate_email(email: &str) -> Result<(), AuthError> {
        if email.len() > MAX_EMAIL_LENGTH {
            return Err(AuthError::Validation(format!(
                "Email must be at most {MAX_EMAIL_LENGTH} characters"
            )));
        }

        let mut parts = email.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );

        if !valid || email.chars().any(char::is_whitespace) {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }

        Ok(())
    }

    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        let min = self.security.min_password_length;
        if password.chars().count() < min {
            return Err(AuthError::Validation(format!(
                "Password must be at least {min} characters"
            )));
        }
        Ok(())
    }

    async fn check_password(&self, email: &str, password: &str) -> Result<users::Model, AuthError> {
        self.store
            .user_repo()
            .verify_credentials(email, password)
            .await?
            .ok_or(AuthError::UnknownUser)
    }
}

fn to_authenticated(user: users::Model) -> Result<AuthenticatedUser, AuthError> {
    let role = Role::from_str(&user.role)?;
    Ok(AuthenticatedUser {
        id: user.id,
        email: user.email,
        role,
    })
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, email: &str, password: &str, role: Role) -> Result<i32, AuthError> {
        Self::validate_email(email)?;
        self.validate_password(password)?;

        let password_hash = hash_password(password, &self.security).await?;

        let id = self
            .store
            .user_repo()
            .create(email, password_hash, role)
            .await?
            .ok_or(AuthError::DuplicateEmail)?;

        info!(user_id = id, role = %role, "Registered user: {}", email);
        Ok(id)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let user = match self.check_password(email, password).await {
            Ok(user) => user,
            Err(AuthError::UnknownUser) => {
                warn!("Failed login attempt for: {}", email);
                return Err(AuthError::UnknownUser);
            }
            Err(e) => return Err(e),
        };

        if let Some(secret) = user.totp.as_deref() {
            let verified = totp_code
                .is_some_and(|code| totp::verify_now(secret, code, self.security.totp_skew_steps));
            if !verified {
                warn!(user_id = user.id, "Rejected second factor");
                return Err(AuthError::InvalidSecondFactor);
            }
        }

        info!(user_id = user.id, "User logged in");
        to_authenticated(user)
    }

    async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.validate_password(new_password)?;

        let user = self.check_password(email, old_password).await?;

        let password_hash = hash_password(new_password, &self.security).await?;
        self.store
            .user_repo()
            .update_password_hash(&user.email, password_hash)
            .await?;

        info!(user_id = user.id, "Password changed");
        Ok(())
    }

    async fn set_totp_secret(&self, email: &str, secret: Option<&str>) -> Result<(), AuthError> {
        if let Some(secret) = secret
            && totp::code_at(secret, 0).is_none()
        {
            return Err(AuthError::Validation(
                "TOTP secret must be base32".to_string(),
            ));
        }

        let updated = self
            .store
            .user_repo()
            .set_totp(email, secret.map(str::to_string))
            .await?;

        if !updated {
            return Err(AuthError::UnknownUser);
        }

        if secret.is_some() {
            info!("Two-factor authentication enabled for: {}", email);
        } else {
            info!("Two-factor authentication disabled for: {}", email);
        }
        Ok(())
    }

    async fn get_user(&self, user_id: i32) -> Result<AuthenticatedUser, AuthError> {
        let user = self
            .store
            .user_repo()
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        to_authenticated(user)
    }

    async fn get_totp_secret(&self, user_id: i32) -> Result<Option<String>, AuthError> {
        let user = self
            .store
            .user_repo()
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        Ok(user.totp)
    }

    fn generate_totp_secret(&self, email: &str) -> (String, String) {
        let secret = totp::generate_secret();
        let uri = totp::provisioning_uri(&secret, email, &self.security.totp_issuer);
        (secret, uri)
    }

    fn verify_totp(&self, secret: &str, code: &str) -> bool {
        totp::verify_now(secret, code, self.security.totp_skew_steps)
    }
}
