//! Database operations for products.
//!
//! The `stock` column is the only mutable running total in the ledger. Plain
//! additions go through [`ProductRepository::increase_stock`]; decrements only
//! ever happen inside the sale transaction in [`crate::db::sales`].

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use tally_core::{ProductId, TenantId};

use super::{RepositoryError, parse_decimal};
use crate::models::{NewProduct, Product};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    owner_id: i64,
    name: String,
    stock: i64,
    unit_price: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            owner_id: TenantId::new(row.owner_id),
            name: row.name,
            stock: row.stock,
            unit_price: parse_decimal(&row.unit_price, "products.unit_price")?,
            created_at: row.created_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new product for a tenant.
    ///
    /// No uniqueness constraint on the name: adding a second batch under the
    /// same name is legitimate and creates a separate row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        owner: TenantId,
        input: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (owner_id, name, stock, unit_price, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, owner_id, name, stock, unit_price, created_at
            ",
        )
        .bind(owner.as_i64())
        .bind(&input.name)
        .bind(input.initial_stock)
        .bind(input.unit_price.to_string())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a product by ID, scoped to its owner.
    ///
    /// A product owned by another tenant is reported as absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        owner: TenantId,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, owner_id, name, stock, unit_price, created_at
            FROM products
            WHERE id = ?1 AND owner_id = ?2
            ",
        )
        .bind(id.as_i64())
        .bind(owner.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all products for a tenant in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: TenantId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, owner_id, name, stock, unit_price, created_at
            FROM products
            WHERE owner_id = ?1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Add units to a product's stock.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product exists for this owner, `false` otherwise.
    /// A zero quantity still matches the row and reports `true`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn increase_stock(
        &self,
        owner: TenantId,
        id: ProductId,
        quantity: i64,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET stock = stock + ?1
            WHERE id = ?2 AND owner_id = ?3
            ",
        )
        .bind(quantity)
        .bind(id.as_i64())
        .bind(owner.as_i64())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
