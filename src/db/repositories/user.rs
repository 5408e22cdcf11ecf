use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;
use crate::models::user::Role;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a user. Returns `None` when the email is already taken.
    pub async fn create(&self, email: &str, password_hash: String, role: Role) -> Result<Option<i32>> {
        let active = users::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            totp: Set(None),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match users::Entity::insert(active).exec(&self.conn).await {
            Ok(result) => Ok(Some(result.last_insert_id)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(None),
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }

    /// Look the user up and check the password.
    /// Returns `None` both for an unknown email and for a wrong password.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<users::Model>> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let is_valid = verify_password(&user.password_hash, password).await?;

        Ok(is_valid.then_some(user))
    }

    pub async fn update_password_hash(&self, email: &str, password_hash: String) -> Result<()> {
        let user = self
            .get_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found: {email}"))?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Returns false if no user has this email.
    pub async fn set_totp(&self, email: &str, secret: Option<String>) -> Result<bool> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Totp,
                sea_orm::sea_query::Expr::value(secret),
            )
            .filter(users::Column::Email.eq(email))
            .exec(&self.conn)
            .await
            .context("Failed to update TOTP secret")?;

        Ok(result.rows_affected > 0)
    }
}

/// Hash a password with Argon2id using the configured cost parameters.
/// CPU-heavy; runs on the blocking pool.
pub async fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();

    task::spawn_blocking(move || hash_password_blocking(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash string. The cost parameters are
/// read from the hash itself, so hashes made with older settings still verify.
pub async fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}
