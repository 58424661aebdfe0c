//! Customer order models and the order fulfillment state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{OrderId, ProductCode};

/// A product line item chosen on an order
///
/// `unit_weight` and `unit_price` are snapshots frozen at order-creation
/// time from the product record as it stood then. All weight and revenue
/// arithmetic reads these snapshots; the live product record is never
/// consulted after the order is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_code: ProductCode,
    pub quantity: i32,
    pub unit_weight: Decimal,
    pub unit_price: Decimal,
}

impl OrderLineItem {
    /// Total weight contributed by this line item
    pub fn total_weight(&self) -> Decimal {
        self.unit_weight * Decimal::from(self.quantity)
    }

    /// Total price contributed by this line item
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Fulfillment states of an order
///
/// Progression is one-directional: `Pending -> Accepted -> ToShip ->
/// Shipped`. `Cancelled` is a terminal rejection state reachable before the
/// order is put on a shipment; the shipment engine never touches it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Pending,
    Accepted,
    ToShip,
    Shipped,
    Cancelled,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "pending",
            OrderState::Accepted => "accepted",
            OrderState::ToShip => "to_ship",
            OrderState::Shipped => "shipped",
            OrderState::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderState::Pending),
            "accepted" => Some(OrderState::Accepted),
            "to_ship" => Some(OrderState::ToShip),
            "shipped" => Some(OrderState::Shipped),
            "cancelled" => Some(OrderState::Cancelled),
            _ => None,
        }
    }
}

/// A customer order
///
/// `order_id` is the business key used by shipments to reference the order;
/// `id` is storage identity only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_id: OrderId,
    pub line_items: Vec<OrderLineItem>,
    pub destination_city: String,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: i32,
    /// Optimistic-concurrency version, bumped on every save
    pub version: i64,
}

impl Order {
    /// Total weight of the order, from the line-item snapshots
    pub fn total_weight(&self) -> Decimal {
        self.line_items.iter().map(OrderLineItem::total_weight).sum()
    }

    /// Total price of the order, from the line-item snapshots
    pub fn total_price(&self) -> Decimal {
        self.line_items.iter().map(OrderLineItem::total_price).sum()
    }

    /// Advance the order from `from` to `to` if it currently sits in `from`.
    ///
    /// Returns true when the transition was applied. An order in any other
    /// state is left untouched and false is returned; that is not an error.
    pub fn advance(&mut self, from: OrderState, to: OrderState) -> bool {
        if self.state != from {
            return false;
        }
        self.state = to;
        true
    }
}
