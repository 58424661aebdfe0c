//! Shipment lifecycle engine
//!
//! Orchestrates the order, truck and product stores to validate, create and
//! advance shipments, cascading shipment-state transitions into order-state
//! changes and stock decrements, and to compute net benefit over a date
//! range.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::stores::{
    DeliveryBatch, DeliveryUnitOfWork, OrderStore, ProductStore, ShipmentStore, TruckStore,
};
use shared::{
    validate_city, validate_shipment_orders, validate_stop, DateRange, Order, OrderId, OrderState,
    Product, ProductCode, Shipment, ShipmentFilter, ShipmentId, ShipmentState, Stop,
    TransitionOutcome, TruckPlate,
};

/// Shipment engine over the four collaborator stores
#[derive(Clone)]
pub struct ShipmentService {
    shipments: Arc<dyn ShipmentStore>,
    trucks: Arc<dyn TruckStore>,
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    delivery: Arc<dyn DeliveryUnitOfWork>,
}

/// Input for creating a shipment
#[derive(Debug, Deserialize)]
pub struct CreateShipmentInput {
    pub shipment_id: ShipmentId,
    pub order_ids: Vec<OrderId>,
    pub destination_city: String,
    pub truck_plate: TruckPlate,
    pub created_by: i32,
}

impl ShipmentService {
    /// Create a new ShipmentService instance over explicit collaborators
    pub fn new(
        shipments: Arc<dyn ShipmentStore>,
        trucks: Arc<dyn TruckStore>,
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        delivery: Arc<dyn DeliveryUnitOfWork>,
    ) -> Self {
        Self {
            shipments,
            trucks,
            orders,
            products,
            delivery,
        }
    }

    /// Create a ShipmentService from a single store implementing every trait
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ShipmentStore + TruckStore + OrderStore + ProductStore + DeliveryUnitOfWork + 'static,
    {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        )
    }

    /// Create a shipment after checking it fits on the assigned truck.
    ///
    /// Total weight is the sum of the line-item weight snapshots across the
    /// referenced orders; the live product records are not consulted. On
    /// success every referenced order sitting in `Accepted` is advanced to
    /// `ToShip` (orders in any other state are left untouched), then the
    /// shipment is persisted in `ToDispatch`. If an order update fails
    /// mid-loop the error surfaces as is; already-advanced orders are not
    /// rolled back.
    pub async fn create_shipment(&self, input: CreateShipmentInput) -> AppResult<Shipment> {
        validate_shipment_orders(&input.order_ids).map_err(|message| AppError::Validation {
            field: "order_ids".to_string(),
            message: message.to_string(),
        })?;
        validate_city(&input.destination_city).map_err(|message| AppError::Validation {
            field: "destination_city".to_string(),
            message: message.to_string(),
        })?;

        let truck = self.trucks.find_by_plate(&input.truck_plate).await?;

        let mut orders = Vec::with_capacity(input.order_ids.len());
        for order_id in &input.order_ids {
            orders.push(self.orders.find_by_id(*order_id).await?);
        }

        let total_weight: Decimal = orders.iter().map(Order::total_weight).sum();
        if !truck.can_carry(total_weight) {
            return Err(AppError::CapacityExceeded {
                total_weight,
                max_weight: truck.max_weight,
            });
        }

        for mut order in orders {
            if order.advance(OrderState::Accepted, OrderState::ToShip) {
                self.orders.save(order).await?;
            }
        }

        let shipment = Shipment {
            id: uuid::Uuid::nil(),
            shipment_id: input.shipment_id,
            order_ids: input.order_ids,
            destination_city: input.destination_city,
            state: ShipmentState::ToDispatch,
            stops: Vec::new(),
            truck_plate: input.truck_plate,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            created_by: input.created_by,
            version: 0,
        };

        let shipment = self.shipments.insert(shipment).await?;
        tracing::info!(
            shipment_id = %shipment.shipment_id,
            truck_plate = %shipment.truck_plate,
            %total_weight,
            "shipment created"
        );

        Ok(shipment)
    }

    /// List shipments matching a filter
    pub async fn list_shipments(&self, filter: ShipmentFilter) -> AppResult<Vec<Shipment>> {
        self.shipments.find_filtered(filter).await
    }

    /// Get a shipment by business id
    pub async fn get_shipment(&self, id: ShipmentId) -> AppResult<Shipment> {
        self.shipments.find_by_id(id).await
    }

    /// Append a stop to a shipment's route. Valid only while `InTransit`.
    pub async fn add_stop(&self, id: ShipmentId, stop: Stop) -> AppResult<Shipment> {
        validate_stop(&stop).map_err(|message| AppError::Validation {
            field: "stop".to_string(),
            message: message.to_string(),
        })?;

        let mut shipment = self.shipments.find_by_id(id).await?;
        if shipment.state != ShipmentState::InTransit {
            return Err(AppError::InvalidState(
                "shipment is not in transit".to_string(),
            ));
        }

        shipment.stops.push(stop);
        self.shipments.update(shipment).await
    }

    /// Put a shipment on the road.
    ///
    /// Applies only from `ToDispatch`; from any other state the transition
    /// is reported as rejected and the shipment is unchanged.
    pub async fn start_trip(&self, id: ShipmentId) -> AppResult<TransitionOutcome> {
        let mut shipment = self.shipments.find_by_id(id).await?;
        if shipment.state != ShipmentState::ToDispatch {
            return Ok(TransitionOutcome::rejected(
                "shipment is not awaiting dispatch",
            ));
        }

        shipment.state = ShipmentState::InTransit;
        let shipment = self.shipments.update(shipment).await?;
        tracing::info!(shipment_id = %shipment.shipment_id, "trip started");

        Ok(TransitionOutcome::Applied { shipment })
    }

    /// Deliver a shipment.
    ///
    /// Rejected if the shipment is already `Dispatched`. Otherwise the
    /// shipment moves to `Dispatched` and two cascades fire over the full
    /// order list: every referenced order in `ToShip` advances to `Shipped`,
    /// then every line item of every referenced order decrements the
    /// corresponding product's stock by its quantity. All three mutation
    /// sets are committed as one atomic batch; a concurrent modification of
    /// any entity in the batch aborts the whole delivery with `Conflict`.
    /// Stock has no floor check and can go negative.
    pub async fn finish_trip(&self, id: ShipmentId) -> AppResult<TransitionOutcome> {
        let mut shipment = self.shipments.find_by_id(id).await?;
        if shipment.state == ShipmentState::Dispatched {
            return Ok(TransitionOutcome::rejected("shipment is already dispatched"));
        }

        shipment.state = ShipmentState::Dispatched;

        let mut orders = Vec::with_capacity(shipment.order_ids.len());
        for order_id in &shipment.order_ids {
            orders.push(self.orders.find_by_id(*order_id).await?);
        }

        let mut advanced_orders = Vec::new();
        for mut order in orders.iter().cloned() {
            if order.advance(OrderState::ToShip, OrderState::Shipped) {
                advanced_orders.push(order);
            }
        }

        let mut touched_products: HashMap<ProductCode, Product> = HashMap::new();
        for order in &orders {
            for item in &order.line_items {
                let product = match touched_products.entry(item.product_code) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        entry.insert(self.products.find_by_code(item.product_code).await?)
                    }
                };
                product.current_stock -= item.quantity;
            }
        }

        let mut products: Vec<Product> = touched_products.into_values().collect();
        products.sort_by_key(|product| product.code);

        let batch = DeliveryBatch {
            shipment: shipment.clone(),
            orders: advanced_orders,
            products,
        };
        self.delivery.commit_delivery(batch).await?;

        let shipment = self.shipments.find_by_id(id).await?;
        tracing::info!(shipment_id = %shipment.shipment_id, "trip finished");

        Ok(TransitionOutcome::Applied { shipment })
    }

    /// Net benefit over a creation-date range: gross revenue minus delivery
    /// cost across every shipment created in the range.
    ///
    /// The date filter is the only dimension applied. Revenue and cost are
    /// computed in two independent passes over the matched shipments.
    /// Revenue reads the line-item price snapshots of each shipment's
    /// orders; cost multiplies the truck's per-kilometer rate by the billed
    /// kilometers (every stop except the last one recorded).
    pub async fn net_benefit(&self, range: DateRange) -> AppResult<Decimal> {
        let filter = ShipmentFilter::created_between(range.start, range.end);
        let shipments = self.shipments.find_filtered(filter).await?;

        let mut gross_revenue = Decimal::ZERO;
        for shipment in &shipments {
            for order_id in &shipment.order_ids {
                let order = self.orders.find_by_id(*order_id).await?;
                gross_revenue += order.total_price();
            }
        }

        let mut delivery_cost = Decimal::ZERO;
        for shipment in &shipments {
            let truck = self.trucks.find_by_plate(&shipment.truck_plate).await?;
            delivery_cost += shipment.delivery_cost(truck.cost_per_km);
        }

        Ok(gross_revenue - delivery_cost)
    }
}
