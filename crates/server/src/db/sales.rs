//! Database operations for the append-only sale history.
//!
//! Recording a sale is the one place the ledger could oversell, so the
//! decrement and the sale insert run in a single transaction, with the
//! conditional `UPDATE ... WHERE stock >= quantity` as the transaction's
//! first statement. Starting with the write means concurrent sales queue
//! on `SQLite`'s write lock instead of failing a read-to-write upgrade;
//! each contender then either decrements or learns there is not enough
//! stock left.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use tally_core::{ProductId, SaleId, TenantId};

use super::{RepositoryError, parse_decimal};
use crate::models::{Sale, SaleWithProduct};

/// Internal row type for sale queries.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    owner_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price_at_sale: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for Sale {
    type Error = RepositoryError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SaleId::new(row.id),
            owner_id: TenantId::new(row.owner_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            unit_price_at_sale: parse_decimal(&row.unit_price_at_sale, "sales.unit_price_at_sale")?,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for sales joined with the product name.
#[derive(Debug, sqlx::FromRow)]
struct SaleWithProductRow {
    id: i64,
    owner_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price_at_sale: String,
    created_at: DateTime<Utc>,
    product_name: String,
}

impl TryFrom<SaleWithProductRow> for SaleWithProduct {
    type Error = RepositoryError;

    fn try_from(row: SaleWithProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            sale: Sale {
                id: SaleId::new(row.id),
                owner_id: TenantId::new(row.owner_id),
                product_id: ProductId::new(row.product_id),
                quantity: row.quantity,
                unit_price_at_sale: parse_decimal(
                    &row.unit_price_at_sale,
                    "sales.unit_price_at_sale",
                )?,
                created_at: row.created_at,
            },
            product_name: row.product_name,
        })
    }
}

/// Outcome of an atomic sale attempt.
#[derive(Debug)]
pub enum SaleOutcome {
    /// Stock was decremented and the sale row inserted.
    Recorded(Sale),
    /// No product with that id exists for this owner.
    ProductNotFound,
    /// The conditional decrement matched no row: not enough stock.
    InsufficientStock {
        /// Stock on hand when the decrement was attempted.
        available: i64,
    },
}

/// Repository for sale database operations.
pub struct SaleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SaleRepository<'a> {
    /// Create a new sale repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Atomically decrement product stock and insert the sale row.
    ///
    /// The sale freezes `unit_price_at_sale` from the product at the instant
    /// of the transaction. On any non-`Recorded` outcome nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement or the commit
    /// fails; the transaction rolls back.
    pub async fn record(
        &self,
        owner: TenantId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<SaleOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // The decrement goes first so this transaction opens as a writer;
        // contenders block on the write lock rather than hitting a busy
        // snapshot error on upgrade.
        let result = sqlx::query(
            r"
            UPDATE products
            SET stock = stock - ?1
            WHERE id = ?2 AND owner_id = ?3 AND stock >= ?1
            ",
        )
        .bind(quantity)
        .bind(product_id.as_i64())
        .bind(owner.as_i64())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Nothing matched: either the product is absent for this owner
            // or the stock is short. Distinguish without leaving the
            // transaction.
            let stock: Option<i64> = sqlx::query_scalar(
                r"
                SELECT stock FROM products
                WHERE id = ?1 AND owner_id = ?2
                ",
            )
            .bind(product_id.as_i64())
            .bind(owner.as_i64())
            .fetch_optional(&mut *tx)
            .await?;

            return Ok(match stock {
                None => SaleOutcome::ProductNotFound,
                Some(available) => SaleOutcome::InsufficientStock { available },
            });
        }

        let unit_price: String = sqlx::query_scalar(
            r"
            SELECT unit_price FROM products
            WHERE id = ?1 AND owner_id = ?2
            ",
        )
        .bind(product_id.as_i64())
        .bind(owner.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, SaleRow>(
            r"
            INSERT INTO sales (owner_id, product_id, quantity, unit_price_at_sale, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, owner_id, product_id, quantity, unit_price_at_sale, created_at
            ",
        )
        .bind(owner.as_i64())
        .bind(product_id.as_i64())
        .bind(quantity)
        .bind(&unit_price)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SaleOutcome::Recorded(row.try_into()?))
    }

    /// List all sales for a tenant in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: TenantId) -> Result<Vec<Sale>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r"
            SELECT id, owner_id, product_id, quantity, unit_price_at_sale, created_at
            FROM sales
            WHERE owner_id = ?1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(owner.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List all sales for a tenant joined with their product names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_product_names(
        &self,
        owner: TenantId,
    ) -> Result<Vec<SaleWithProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleWithProductRow>(
            r"
            SELECT
                s.id, s.owner_id, s.product_id, s.quantity,
                s.unit_price_at_sale, s.created_at,
                p.name AS product_name
            FROM sales s
            INNER JOIN products p ON p.id = s.product_id
            WHERE s.owner_id = ?1
            ORDER BY s.created_at ASC, s.id ASC
            ",
        )
        .bind(owner.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
