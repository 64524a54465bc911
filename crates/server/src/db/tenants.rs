//! Database operations for tenant accounts.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use tally_core::{TenantId, Username};

use super::RepositoryError;
use crate::models::Tenant;

/// Internal row type for tenant queries.
#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: i64,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self) -> Result<Tenant, RepositoryError> {
        let username = Username::parse(&self.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in tenants: {e}"))
        })?;
        Ok(Tenant {
            id: TenantId::new(self.id),
            username,
            created_at: self.created_at,
        })
    }
}

/// A tenant together with its credential hash, for password verification.
///
/// Only the auth service sees this type; handlers work with [`Tenant`].
#[derive(Debug)]
pub struct TenantAuth {
    pub tenant: Tenant,
    pub password_hash: String,
}

/// Repository for tenant database operations.
pub struct TenantRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TenantRepository<'a> {
    /// Create a new tenant repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new tenant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Tenant, RepositoryError> {
        let row = sqlx::query_as::<_, TenantRow>(
            r"
            INSERT INTO tenants (username, password_hash, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, username, password_hash, created_at
            ",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "username already registered: {username}"
                ));
            }
            RepositoryError::Database(e)
        })?;

        row.into_tenant()
    }

    /// Get a tenant with its credential hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<TenantAuth>, RepositoryError> {
        let row = sqlx::query_as::<_, TenantRow>(
            r"
            SELECT id, username, password_hash, created_at
            FROM tenants
            WHERE username = ?1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            let password_hash = row.password_hash.clone();
            Ok(TenantAuth {
                tenant: row.into_tenant()?,
                password_hash,
            })
        })
        .transpose()
    }

    /// Get a tenant by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        let row = sqlx::query_as::<_, TenantRow>(
            r"
            SELECT id, username, password_hash, created_at
            FROM tenants
            WHERE id = ?1
            ",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TenantRow::into_tenant).transpose()
    }
}
