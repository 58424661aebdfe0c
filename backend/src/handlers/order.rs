//! HTTP handlers for order endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::order::CreateOrderInput;
use crate::services::OrderService;
use crate::AppState;
use shared::{Order, OrderId};

fn order_service(state: &AppState) -> OrderService {
    OrderService::new(state.store.clone(), state.store.clone())
}

/// Create an order
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = order_service(&state).create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List all orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service(&state).list_orders().await?;
    Ok(Json(orders))
}

/// Get an order by id
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> AppResult<Json<Order>> {
    let order = order_service(&state).get_order(OrderId(order_id)).await?;
    Ok(Json(order))
}

/// Accept a pending order
pub async fn accept_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> AppResult<Json<Order>> {
    let order = order_service(&state).accept_order(OrderId(order_id)).await?;
    Ok(Json(order))
}

/// Cancel an order
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> AppResult<Json<Order>> {
    let order = order_service(&state).cancel_order(OrderId(order_id)).await?;
    Ok(Json(order))
}
