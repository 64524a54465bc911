//! Database operations for the append-only purchase history.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use tally_core::{PurchaseId, TenantId};

use super::{RepositoryError, parse_decimal};
use crate::models::{NewPurchase, Purchase};

/// Internal row type for purchase queries.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: i64,
    owner_id: i64,
    name: String,
    quantity: i64,
    unit_cost: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = RepositoryError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PurchaseId::new(row.id),
            owner_id: TenantId::new(row.owner_id),
            name: row.name,
            quantity: row.quantity,
            unit_cost: parse_decimal(&row.unit_cost, "purchases.unit_cost")?,
            created_at: row.created_at,
        })
    }
}

/// Repository for purchase database operations.
pub struct PurchaseRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a purchase for a tenant.
    ///
    /// Always inserts a new row, even when an earlier purchase with the same
    /// name exists; the history never merges.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        owner: TenantId,
        input: &NewPurchase,
    ) -> Result<Purchase, RepositoryError> {
        let row = sqlx::query_as::<_, PurchaseRow>(
            r"
            INSERT INTO purchases (owner_id, name, quantity, unit_cost, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, owner_id, name, quantity, unit_cost, created_at
            ",
        )
        .bind(owner.as_i64())
        .bind(&input.name)
        .bind(input.quantity)
        .bind(input.unit_cost.to_string())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get the most recent purchase with the given name for a tenant.
    ///
    /// When several purchases share the name, the latest by creation time
    /// wins (ties broken by id) so the copied cost is deterministic.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_by_name(
        &self,
        owner: TenantId,
        name: &str,
    ) -> Result<Option<Purchase>, RepositoryError> {
        let row = sqlx::query_as::<_, PurchaseRow>(
            r"
            SELECT id, owner_id, name, quantity, unit_cost, created_at
            FROM purchases
            WHERE owner_id = ?1 AND name = ?2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(owner.as_i64())
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all purchases for a tenant in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: TenantId) -> Result<Vec<Purchase>, RepositoryError> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            r"
            SELECT id, owner_id, name, quantity, unit_cost, created_at
            FROM purchases
            WHERE owner_id = ?1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
