//! Tenant authentication service.
//!
//! Stateless functions over the tenant repository: registration hashes the
//! password with Argon2 and login verifies against the stored hash. Plaintext
//! passwords are consumed here and never stored or logged.

mod error;

pub use error::AuthError;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use tally_core::{Username, UsernameError};

use crate::db::{RepositoryError, TenantRepository};
use crate::models::Tenant;

/// Authentication service over the tenant store.
pub struct AuthService<'a> {
    tenants: TenantRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            tenants: TenantRepository::new(pool),
        }
    }

    /// Register a new tenant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is empty,
    /// `AuthError::UsernameTaken` if the username is already registered, and
    /// `AuthError::InvalidUsername` for a malformed username.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(&self, username: &str, password: &str) -> Result<Tenant, AuthError> {
        let password = password.trim();
        if password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let username = Username::parse(username).map_err(|e| match e {
            UsernameError::Empty => AuthError::MissingFields,
            other => AuthError::InvalidUsername(other),
        })?;

        if self.tenants.get_auth_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_password(password)?;

        let tenant = self
            .tenants
            .create(&username, &password_hash)
            .await
            .map_err(|e| match e {
                // Lost a registration race; same answer as the pre-check.
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        info!(tenant_id = %tenant.id, "tenant registered");
        Ok(tenant)
    }

    /// Authenticate a tenant by username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username or a
    /// wrong password; the two cases are deliberately indistinguishable.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Tenant, AuthError> {
        let password = password.trim();

        let username =
            Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let auth = self
            .tenants
            .get_auth_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&auth.password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(auth.tenant)
    }
}

/// Hash a password with Argon2 and a fresh random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored Argon2 hash.
fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2-but-longer").expect("hash");
        assert!(verify_password(&hash, "hunter2-but-longer").expect("verify"));
        assert!(!verify_password(&hash, "wrong-password").expect("verify"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same-password").expect("hash");
        let second = hash_password("same-password").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        let result = verify_password("not-a-phc-string", "password");
        assert!(matches!(result, Err(AuthError::Hash(_))));
    }
}
