//! Order lifecycle service
//!
//! Creation is the freeze point for line-item snapshots: unit weight and
//! unit price are copied from the live product records here and never
//! re-read afterwards.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::stores::{OrderStore, ProductStore};
use shared::{
    validate_city, validate_quantity, Order, OrderId, OrderLineItem, OrderState, ProductCode,
};

/// Order management service
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
}

/// A chosen product on an order request
#[derive(Debug, Deserialize)]
pub struct LineItemInput {
    pub product_code: ProductCode,
    pub quantity: i32,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub order_id: OrderId,
    pub line_items: Vec<LineItemInput>,
    pub destination_city: String,
    pub created_by: i32,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(orders: Arc<dyn OrderStore>, products: Arc<dyn ProductStore>) -> Self {
        Self { orders, products }
    }

    /// Create an order in `Pending`, freezing weight/price snapshots from
    /// the product records as they stand right now
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<Order> {
        if input.line_items.is_empty() {
            return Err(AppError::Validation {
                field: "line_items".to_string(),
                message: "Order must have at least one line item".to_string(),
            });
        }
        validate_city(&input.destination_city).map_err(|message| AppError::Validation {
            field: "destination_city".to_string(),
            message: message.to_string(),
        })?;

        let mut line_items = Vec::with_capacity(input.line_items.len());
        for item in &input.line_items {
            validate_quantity(item.quantity).map_err(|message| AppError::Validation {
                field: "quantity".to_string(),
                message: message.to_string(),
            })?;

            let product = self.products.find_by_code(item.product_code).await?;
            line_items.push(OrderLineItem {
                product_code: product.code,
                quantity: item.quantity,
                unit_weight: product.unit_weight,
                unit_price: product.unit_price,
            });
        }

        let order = Order {
            id: uuid::Uuid::nil(),
            order_id: input.order_id,
            line_items,
            destination_city: input.destination_city,
            state: OrderState::Pending,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            created_by: input.created_by,
            version: 0,
        };

        let order = self.orders.insert(order).await?;
        tracing::info!(order_id = %order.order_id, "order created");

        Ok(order)
    }

    /// Get an order by business id
    pub async fn get_order(&self, id: OrderId) -> AppResult<Order> {
        self.orders.find_by_id(id).await
    }

    /// List all orders
    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        self.orders.list().await
    }

    /// Accept a pending order
    pub async fn accept_order(&self, id: OrderId) -> AppResult<Order> {
        let mut order = self.orders.find_by_id(id).await?;
        if !order.advance(OrderState::Pending, OrderState::Accepted) {
            return Err(AppError::InvalidState(format!(
                "order {} is not pending",
                order.order_id
            )));
        }
        self.orders.save(order).await
    }

    /// Cancel an order that has not yet been put on a shipment
    pub async fn cancel_order(&self, id: OrderId) -> AppResult<Order> {
        let mut order = self.orders.find_by_id(id).await?;
        let cancelled = order.advance(OrderState::Pending, OrderState::Cancelled)
            || order.advance(OrderState::Accepted, OrderState::Cancelled);
        if !cancelled {
            return Err(AppError::InvalidState(format!(
                "order {} is already being shipped",
                order.order_id
            )));
        }
        self.orders.save(order).await
    }
}
