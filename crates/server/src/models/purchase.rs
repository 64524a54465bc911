//! Purchase domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tally_core::{PurchaseId, TenantId};

/// An immutable record of stock intake with a historical unit cost.
///
/// Purchases are an append-only audit trail: re-buying the same item creates
/// a new row and never merges with or mutates an earlier one. There is no
/// foreign key to products; repeat purchases match by name.
#[derive(Debug, Clone, Serialize)]
pub struct Purchase {
    /// Unique purchase ID.
    pub id: PurchaseId,
    /// Owning tenant.
    pub owner_id: TenantId,
    /// Name of the purchased item.
    pub name: String,
    /// Units bought in this intake event.
    pub quantity: i64,
    /// Cost per unit at purchase time.
    pub unit_cost: Decimal,
    /// When the purchase was recorded.
    pub created_at: DateTime<Utc>,
}

/// Input for recording a purchase.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub name: String,
    pub unit_cost: Decimal,
    pub quantity: i64,
}
