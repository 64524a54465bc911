//! Sale domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tally_core::{ProductId, SaleId, TenantId};

/// An immutable record of stock outflow with the unit price frozen at sale
/// time. Later price changes on the product do not affect past sales.
#[derive(Debug, Clone, Serialize)]
pub struct Sale {
    /// Unique sale ID.
    pub id: SaleId,
    /// Owning tenant.
    pub owner_id: TenantId,
    /// Product that was sold.
    pub product_id: ProductId,
    /// Units sold. Always positive.
    pub quantity: i64,
    /// Unit price captured from the product at the instant of sale.
    pub unit_price_at_sale: Decimal,
    /// When the sale was recorded.
    pub created_at: DateTime<Utc>,
}

/// A sale joined with the name of the product it references, for reports and
/// the assistant context block.
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithProduct {
    #[serde(flatten)]
    pub sale: Sale,
    /// Current name of the referenced product.
    pub product_name: String,
}
