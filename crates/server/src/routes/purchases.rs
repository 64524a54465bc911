//! Purchase route handlers.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::Redirect,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::RequireTenant;
use crate::models::NewPurchase;
use crate::services::{InventoryService, PurchasesReport, ReportsService};
use crate::state::AppState;

/// Record-purchase form data.
#[derive(Debug, Deserialize)]
pub struct PurchaseForm {
    pub name: String,
    pub unit_cost: Decimal,
    pub quantity: i64,
}

/// Repeat-purchase form data.
#[derive(Debug, Deserialize)]
pub struct RepeatPurchaseForm {
    pub name: String,
    pub quantity: i64,
}

/// Optional year/month report filters.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Record a stock intake event.
pub async fn create(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Form(form): Form<PurchaseForm>,
) -> Result<Redirect, AppError> {
    InventoryService::new(state.pool())
        .record_purchase(
            tenant.id,
            NewPurchase {
                name: form.name,
                unit_cost: form.unit_cost,
                quantity: form.quantity,
            },
        )
        .await?;
    Ok(Redirect::to("/"))
}

/// Re-buy a previously purchased item by name.
pub async fn repeat(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Form(form): Form<RepeatPurchaseForm>,
) -> Result<Redirect, AppError> {
    InventoryService::new(state.pool())
        .repeat_purchase(tenant.id, &form.name, form.quantity)
        .await?;
    Ok(Redirect::to("/"))
}

/// Purchases report, optionally filtered by year and/or month.
pub async fn report(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Query(query): Query<ReportQuery>,
) -> Result<Json<PurchasesReport>, AppError> {
    let report = ReportsService::new(state.pool())
        .purchases_report(tenant.id, query.year, query.month)
        .await?;
    Ok(Json(report))
}
