//! Time-filtered reporting over a tenant's sale and purchase history.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::instrument;

use tally_core::TenantId;

use crate::db::{PurchaseRepository, RepositoryError, SaleRepository};
use crate::models::{Purchase, SaleWithProduct};

/// A sales report: the matching rows and their combined revenue.
#[derive(Debug, Serialize)]
pub struct SalesReport {
    pub sales: Vec<SaleWithProduct>,
    /// `sum(quantity * unit_price_at_sale)` over the matching rows.
    pub total: Decimal,
}

/// A purchases report: the matching rows and their combined cost.
#[derive(Debug, Serialize)]
pub struct PurchasesReport {
    pub purchases: Vec<Purchase>,
    /// `sum(quantity * unit_cost)` over the matching rows.
    pub total: Decimal,
}

/// Service aggregating the ledger history for a tenant.
///
/// Year and month filters are independently optional and combine with AND;
/// with neither set, the full history is reported. An empty match is a
/// report with total zero, not an error.
pub struct ReportsService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReportsService<'a> {
    /// Create a new reports service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Report the tenant's sales, optionally filtered by year and/or month.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn sales_report(
        &self,
        owner: TenantId,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<SalesReport, RepositoryError> {
        let sales: Vec<SaleWithProduct> = SaleRepository::new(self.pool)
            .list_with_product_names(owner)
            .await?
            .into_iter()
            .filter(|s| matches_period(&s.sale.created_at, year, month))
            .collect();

        let total = sales
            .iter()
            .map(|s| Decimal::from(s.sale.quantity) * s.sale.unit_price_at_sale)
            .sum();

        Ok(SalesReport { sales, total })
    }

    /// Report the tenant's purchases, optionally filtered by year and/or month.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn purchases_report(
        &self,
        owner: TenantId,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<PurchasesReport, RepositoryError> {
        let purchases: Vec<Purchase> = PurchaseRepository::new(self.pool)
            .list_for_owner(owner)
            .await?
            .into_iter()
            .filter(|p| matches_period(&p.created_at, year, month))
            .collect();

        let total = purchases
            .iter()
            .map(|p| Decimal::from(p.quantity) * p.unit_cost)
            .sum();

        Ok(PurchasesReport { purchases, total })
    }
}

/// Check a timestamp against optional year and month filters (AND-combined).
fn matches_period(at: &DateTime<Utc>, year: Option<i32>, month: Option<u32>) -> bool {
    year.is_none_or(|y| at.year() == y) && month.is_none_or(|m| at.month() == m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_matches_period_no_filters() {
        assert!(matches_period(&ts(2024, 3, 1), None, None));
    }

    #[test]
    fn test_matches_period_year_only() {
        assert!(matches_period(&ts(2024, 3, 1), Some(2024), None));
        assert!(!matches_period(&ts(2023, 3, 1), Some(2024), None));
    }

    #[test]
    fn test_matches_period_month_only() {
        // Month alone matches that month across all years.
        assert!(matches_period(&ts(2023, 3, 1), None, Some(3)));
        assert!(matches_period(&ts(2024, 3, 1), None, Some(3)));
        assert!(!matches_period(&ts(2024, 4, 1), None, Some(3)));
    }

    #[test]
    fn test_matches_period_both_filters_and_combined() {
        assert!(matches_period(&ts(2024, 3, 1), Some(2024), Some(3)));
        assert!(!matches_period(&ts(2024, 4, 1), Some(2024), Some(3)));
        assert!(!matches_period(&ts(2023, 3, 1), Some(2024), Some(3)));
    }
}
