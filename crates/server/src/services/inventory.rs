//! Stock mutation engine.
//!
//! Every operation takes the owning tenant explicitly; nothing here reads
//! ambient session state. Validation happens before any write, so a rejected
//! mutation leaves the ledger untouched.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{info, instrument};

use tally_core::{ProductId, TenantId};

use crate::db::{
    ProductRepository, PurchaseRepository, RepositoryError, SaleOutcome, SaleRepository,
};
use crate::models::{NewProduct, NewPurchase, Product, Purchase, Sale};

/// Errors that can occur while mutating the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input; nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Record absent, or owned by a different tenant (indistinguishable).
    #[error("not found")]
    NotFound,

    /// A sale asked for more units than the product has on hand.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Units the sale asked for.
        requested: i64,
        /// Units on hand when the attempt was made.
        available: i64,
    },

    /// Database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Service enforcing the ledger's consistency rules.
pub struct InventoryService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a product for a tenant.
    ///
    /// Duplicate names are allowed: a new batch of an existing item is a
    /// legitimate separate row, never a merge.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for an empty name, a negative price,
    /// or negative initial stock.
    #[instrument(skip(self, input), fields(owner = %owner))]
    pub async fn add_product(
        &self,
        owner: TenantId,
        input: NewProduct,
    ) -> Result<Product, LedgerError> {
        let name = input.name.trim().to_owned();
        if name.is_empty() {
            return Err(LedgerError::Validation("product name is required".into()));
        }
        if input.unit_price < Decimal::ZERO {
            return Err(LedgerError::Validation(
                "unit price cannot be negative".into(),
            ));
        }
        if input.initial_stock < 0 {
            return Err(LedgerError::Validation(
                "initial stock cannot be negative".into(),
            ));
        }

        let product = ProductRepository::new(self.pool)
            .create(owner, &NewProduct { name, ..input })
            .await?;

        info!(product_id = %product.id, "product added");
        Ok(product)
    }

    /// Add units to an existing product's stock.
    ///
    /// A zero quantity is a successful no-op; it still verifies the product
    /// belongs to the tenant.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a negative quantity and
    /// `LedgerError::NotFound` if the product is not owned by this tenant.
    #[instrument(skip(self), fields(owner = %owner, product_id = %product_id))]
    pub async fn increase_stock(
        &self,
        owner: TenantId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), LedgerError> {
        if quantity < 0 {
            return Err(LedgerError::Validation("quantity cannot be negative".into()));
        }

        let matched = ProductRepository::new(self.pool)
            .increase_stock(owner, product_id, quantity)
            .await?;

        if !matched {
            return Err(LedgerError::NotFound);
        }
        Ok(())
    }

    /// Record a stock intake event.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for an empty name, a negative cost,
    /// or a negative quantity.
    #[instrument(skip(self, input), fields(owner = %owner))]
    pub async fn record_purchase(
        &self,
        owner: TenantId,
        input: NewPurchase,
    ) -> Result<Purchase, LedgerError> {
        let name = input.name.trim().to_owned();
        if name.is_empty() {
            return Err(LedgerError::Validation("purchase name is required".into()));
        }
        if input.unit_cost < Decimal::ZERO {
            return Err(LedgerError::Validation(
                "unit cost cannot be negative".into(),
            ));
        }
        if input.quantity < 0 {
            return Err(LedgerError::Validation("quantity cannot be negative".into()));
        }

        Ok(PurchaseRepository::new(self.pool)
            .create(owner, &NewPurchase { name, ..input })
            .await?)
    }

    /// Re-buy a previously purchased item by name.
    ///
    /// Copies the unit cost from the tenant's most recent purchase with that
    /// name and appends a new row with the supplied quantity. The earlier row
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the tenant never purchased an item
    /// with that name and `LedgerError::Validation` for a negative quantity.
    #[instrument(skip(self), fields(owner = %owner, name = %name))]
    pub async fn repeat_purchase(
        &self,
        owner: TenantId,
        name: &str,
        quantity: i64,
    ) -> Result<Purchase, LedgerError> {
        if quantity < 0 {
            return Err(LedgerError::Validation("quantity cannot be negative".into()));
        }

        let repo = PurchaseRepository::new(self.pool);
        let previous = repo
            .latest_by_name(owner, name.trim())
            .await?
            .ok_or(LedgerError::NotFound)?;

        Ok(repo
            .create(
                owner,
                &NewPurchase {
                    name: previous.name,
                    unit_cost: previous.unit_cost,
                    quantity,
                },
            )
            .await?)
    }

    /// Sell units of a product.
    ///
    /// Decrementing stock and inserting the sale row happen in one atomic
    /// transaction; the sale captures the product's unit price at that
    /// instant. Concurrent sales cannot drive stock negative.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a non-positive quantity,
    /// `LedgerError::NotFound` if the product is not owned by this tenant,
    /// and `LedgerError::InsufficientStock` if fewer units are on hand than
    /// requested.
    #[instrument(skip(self), fields(owner = %owner, product_id = %product_id))]
    pub async fn record_sale(
        &self,
        owner: TenantId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Sale, LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::Validation("quantity must be positive".into()));
        }

        match SaleRepository::new(self.pool)
            .record(owner, product_id, quantity)
            .await?
        {
            SaleOutcome::Recorded(sale) => {
                info!(sale_id = %sale.id, quantity, "sale recorded");
                Ok(sale)
            }
            SaleOutcome::ProductNotFound => Err(LedgerError::NotFound),
            SaleOutcome::InsufficientStock { available } => Err(LedgerError::InsufficientStock {
                requested: quantity,
                available,
            }),
        }
    }
}
