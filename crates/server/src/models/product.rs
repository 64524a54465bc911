//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tally_core::{ProductId, TenantId};

/// A catalog item with a current stock level and unit price.
///
/// `stock` is the only mutable running total in the ledger; it is raised by
/// stock intake and atomically decremented by sales.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Owning tenant.
    pub owner_id: TenantId,
    /// Display name. Duplicates are allowed within a tenant.
    pub name: String,
    /// Units currently on hand. Never negative.
    pub stock: i64,
    /// Current selling price per unit.
    pub unit_price: Decimal,
    /// When the product was added.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub unit_price: Decimal,
    pub initial_stock: i64,
}
