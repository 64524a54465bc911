//! Sale route handlers.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use tally_core::ProductId;

use crate::error::AppError;
use crate::middleware::RequireTenant;
use crate::routes::purchases::ReportQuery;
use crate::services::{InventoryService, ReportsService, SalesReport};
use crate::state::AppState;

/// Record-sale form data.
#[derive(Debug, Deserialize)]
pub struct SaleForm {
    pub product_id: i64,
    pub quantity: i64,
}

/// Sell units of a product.
///
/// Selling more than is on hand is an explicit 409, never a silent no-op;
/// stock stays unchanged either way.
pub async fn create(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Form(form): Form<SaleForm>,
) -> Result<Redirect, AppError> {
    InventoryService::new(state.pool())
        .record_sale(tenant.id, ProductId::new(form.product_id), form.quantity)
        .await?;
    Ok(Redirect::to("/"))
}

/// Sales report, optionally filtered by year and/or month.
pub async fn report(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SalesReport>, AppError> {
    let report = ReportsService::new(state.pool())
        .sales_report(tenant.id, query.year, query.month)
        .await?;
    Ok(Json(report))
}
