//! Product route handlers.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use tally_core::ProductId;

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::middleware::RequireTenant;
use crate::models::NewProduct;
use crate::services::InventoryService;
use crate::state::AppState;

/// Add-product form data.
#[derive(Debug, Deserialize)]
pub struct AddProductForm {
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub initial_stock: i64,
}

/// Increase-stock form data.
#[derive(Debug, Deserialize)]
pub struct IncreaseStockForm {
    pub product_id: i64,
    pub quantity: i64,
}

/// Dashboard: the current tenant's product list as JSON.
pub async fn index(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
) -> Result<Response, AppError> {
    let products = ProductRepository::new(state.pool())
        .list_for_owner(tenant.id)
        .await?;
    Ok(Json(products).into_response())
}

/// Add a product to the current tenant's catalog.
pub async fn create(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Form(form): Form<AddProductForm>,
) -> Result<Redirect, AppError> {
    InventoryService::new(state.pool())
        .add_product(
            tenant.id,
            NewProduct {
                name: form.name,
                unit_price: form.unit_price,
                initial_stock: form.initial_stock,
            },
        )
        .await?;
    Ok(Redirect::to("/"))
}

/// Add units to an existing product's stock.
pub async fn increase_stock(
    State(state): State<AppState>,
    RequireTenant(tenant): RequireTenant,
    Form(form): Form<IncreaseStockForm>,
) -> Result<Redirect, AppError> {
    InventoryService::new(state.pool())
        .increase_stock(tenant.id, ProductId::new(form.product_id), form.quantity)
        .await?;
    Ok(Redirect::to("/"))
}
