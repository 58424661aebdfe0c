//! In-memory store implementation for testing
//!
//! Keeps every entity map behind one `RwLock` umbrella so
//! [`DeliveryUnitOfWork`] can apply a whole batch under a single write-lock
//! scope, matching the atomicity the Postgres implementation gets from a
//! transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::stores::{
    DeliveryBatch, DeliveryUnitOfWork, OrderStore, ProductStore, ShipmentStore, TruckStore,
};
use shared::{
    Order, OrderId, Product, ProductCode, ProductFilter, Shipment, ShipmentFilter, ShipmentId,
    Truck, TruckPlate,
};

#[derive(Default)]
struct Tables {
    orders: HashMap<OrderId, Order>,
    trucks: HashMap<TruckPlate, Truck>,
    products: HashMap<ProductCode, Product>,
    shipments: HashMap<ShipmentId, Shipment>,
}

/// In-memory store implementing every storage trait.
///
/// Provides the same interface and version discipline as the PostgreSQL
/// implementation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all entities.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.orders.clear();
        tables.trucks.clear();
        tables.products.clear();
        tables.shipments.clear();
    }
}

fn save_order_in(tables: &mut Tables, mut order: Order) -> AppResult<Order> {
    let stored = tables
        .orders
        .get(&order.order_id)
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
    if stored.version != order.version {
        return Err(AppError::Conflict {
            resource: "Order".to_string(),
        });
    }
    order.version += 1;
    order.updated_at = Utc::now();
    tables.orders.insert(order.order_id, order.clone());
    Ok(order)
}

fn save_product_in(tables: &mut Tables, mut product: Product) -> AppResult<Product> {
    let stored = tables
        .products
        .get(&product.code)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
    if stored.version != product.version {
        return Err(AppError::Conflict {
            resource: "Product".to_string(),
        });
    }
    product.version += 1;
    product.updated_at = Utc::now();
    tables.products.insert(product.code, product.clone());
    Ok(product)
}

fn update_shipment_in(tables: &mut Tables, mut shipment: Shipment) -> AppResult<Shipment> {
    let stored = tables
        .shipments
        .get(&shipment.shipment_id)
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?;
    if stored.version != shipment.version {
        return Err(AppError::Conflict {
            resource: "Shipment".to_string(),
        });
    }
    shipment.version += 1;
    shipment.updated_at = Utc::now();
    tables
        .shipments
        .insert(shipment.shipment_id, shipment.clone());
    Ok(shipment)
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_by_id(&self, id: OrderId) -> AppResult<Order> {
        self.tables
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    async fn insert(&self, mut order: Order) -> AppResult<Order> {
        let mut tables = self.tables.write().await;
        if tables.orders.contains_key(&order.order_id) {
            return Err(AppError::DuplicateEntry("order id".to_string()));
        }
        order.id = Uuid::new_v4();
        order.created_at = Utc::now();
        order.updated_at = order.created_at;
        order.version = 1;
        tables.orders.insert(order.order_id, order.clone());
        Ok(order)
    }

    async fn save(&self, order: Order) -> AppResult<Order> {
        let mut tables = self.tables.write().await;
        save_order_in(&mut tables, order)
    }

    async fn list(&self) -> AppResult<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables.orders.values().cloned().collect();
        orders.sort_by_key(|order| order.order_id);
        Ok(orders)
    }
}

#[async_trait]
impl TruckStore for MemoryStore {
    async fn find_by_plate(&self, plate: &TruckPlate) -> AppResult<Truck> {
        self.tables
            .read()
            .await
            .trucks
            .get(plate)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Truck".to_string()))
    }

    async fn insert(&self, mut truck: Truck) -> AppResult<Truck> {
        let mut tables = self.tables.write().await;
        if tables.trucks.contains_key(&truck.plate) {
            return Err(AppError::DuplicateEntry("plate".to_string()));
        }
        truck.id = Uuid::new_v4();
        truck.created_at = Utc::now();
        truck.updated_at = truck.created_at;
        tables.trucks.insert(truck.plate.clone(), truck.clone());
        Ok(truck)
    }

    async fn list(&self) -> AppResult<Vec<Truck>> {
        let tables = self.tables.read().await;
        let mut trucks: Vec<Truck> = tables.trucks.values().cloned().collect();
        trucks.sort_by(|a, b| a.plate.as_str().cmp(b.plate.as_str()));
        Ok(trucks)
    }

    async fn delete(&self, plate: &TruckPlate) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .trucks
            .remove(plate)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Truck".to_string()))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_by_code(&self, code: ProductCode) -> AppResult<Product> {
        self.tables
            .read()
            .await
            .products
            .get(&code)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    async fn insert(&self, mut product: Product) -> AppResult<Product> {
        let mut tables = self.tables.write().await;
        if tables.products.contains_key(&product.code) {
            return Err(AppError::DuplicateEntry("product code".to_string()));
        }
        product.id = Uuid::new_v4();
        product.created_at = Utc::now();
        product.updated_at = product.created_at;
        product.version = 1;
        tables.products.insert(product.code, product.clone());
        Ok(product)
    }

    async fn save(&self, product: Product) -> AppResult<Product> {
        let mut tables = self.tables.write().await;
        save_product_in(&mut tables, product)
    }

    async fn list_filtered(&self, filter: ProductFilter) -> AppResult<Vec<Product>> {
        let tables = self.tables.read().await;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter(|product| {
                filter
                    .product_type
                    .map_or(true, |t| product.product_type == t)
                    && (!filter.below_minimum_stock || product.is_below_minimum_stock())
            })
            .cloned()
            .collect();
        products.sort_by_key(|product| product.code);
        Ok(products)
    }

    async fn delete(&self, code: ProductCode) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .products
            .remove(&code)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }
}

#[async_trait]
impl ShipmentStore for MemoryStore {
    async fn insert(&self, mut shipment: Shipment) -> AppResult<Shipment> {
        let mut tables = self.tables.write().await;
        if tables.shipments.contains_key(&shipment.shipment_id) {
            return Err(AppError::DuplicateEntry("shipment id".to_string()));
        }
        shipment.id = Uuid::new_v4();
        shipment.created_at = Utc::now();
        shipment.updated_at = shipment.created_at;
        shipment.version = 1;
        tables
            .shipments
            .insert(shipment.shipment_id, shipment.clone());
        Ok(shipment)
    }

    async fn find_by_id(&self, id: ShipmentId) -> AppResult<Shipment> {
        self.tables
            .read()
            .await
            .shipments
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Shipment".to_string()))
    }

    async fn find_filtered(&self, filter: ShipmentFilter) -> AppResult<Vec<Shipment>> {
        let tables = self.tables.read().await;
        let mut shipments: Vec<Shipment> = tables
            .shipments
            .values()
            .filter(|shipment| filter.matches(shipment))
            .cloned()
            .collect();
        shipments.sort_by_key(|shipment| shipment.shipment_id);
        Ok(shipments)
    }

    async fn update(&self, shipment: Shipment) -> AppResult<Shipment> {
        let mut tables = self.tables.write().await;
        update_shipment_in(&mut tables, shipment)
    }
}

#[async_trait]
impl DeliveryUnitOfWork for MemoryStore {
    async fn commit_delivery(&self, batch: DeliveryBatch) -> AppResult<()> {
        // Stage against a snapshot, swap in only if every write succeeds
        let mut tables = self.tables.write().await;
        let mut staged = Tables {
            orders: tables.orders.clone(),
            trucks: HashMap::new(),
            products: tables.products.clone(),
            shipments: tables.shipments.clone(),
        };

        update_shipment_in(&mut staged, batch.shipment)?;
        for order in batch.orders {
            save_order_in(&mut staged, order)?;
        }
        for product in batch.products {
            save_product_in(&mut staged, product)?;
        }

        tables.orders = staged.orders;
        tables.products = staged.products;
        tables.shipments = staged.shipments;

        Ok(())
    }
}
