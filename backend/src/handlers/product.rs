//! HTTP handlers for product endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::product::{AdjustStockInput, CreateProductInput};
use crate::services::ProductService;
use crate::AppState;
use shared::{Product, ProductCode, ProductFilter};

fn product_service(state: &AppState) -> ProductService {
    ProductService::new(state.store.clone())
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = product_service(&state).create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List products, optionally filtered by type or low stock
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product_service(&state).list_products(filter).await?;
    Ok(Json(products))
}

/// Get a product by code
pub async fn get_product(
    State(state): State<AppState>,
    Path(code): Path<i32>,
) -> AppResult<Json<Product>> {
    let product = product_service(&state).get_product(ProductCode(code)).await?;
    Ok(Json(product))
}

/// Apply a manual stock adjustment
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(code): Path<i32>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<Product>> {
    let product = product_service(&state)
        .adjust_stock(ProductCode(code), input)
        .await?;
    Ok(Json(product))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    Path(code): Path<i32>,
) -> AppResult<Json<()>> {
    product_service(&state).delete_product(ProductCode(code)).await?;
    Ok(Json(()))
}
