//! Storage interfaces for the Shipment Logistics Platform
//!
//! The domain services depend on these traits only; the Postgres
//! implementation lives in [`postgres`] and an in-memory implementation used
//! by the test suite lives in [`memory`]. All implementations must be
//! thread-safe (Send + Sync).
//!
//! Writes are guarded by optimistic concurrency: `save`/`update` compare the
//! entity's `version` against the stored one and fail with
//! [`AppError::Conflict`](crate::error::AppError::Conflict) on mismatch,
//! bumping the version on success.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppResult;
use shared::{
    Order, OrderId, Product, ProductCode, ProductFilter, Shipment, ShipmentFilter, ShipmentId,
    Truck, TruckPlate,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence of customer orders
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_id(&self, id: OrderId) -> AppResult<Order>;
    async fn insert(&self, order: Order) -> AppResult<Order>;
    /// Version-checked write of an existing order
    async fn save(&self, order: Order) -> AppResult<Order>;
    async fn list(&self) -> AppResult<Vec<Order>>;
}

/// Read-only truck registry plus fleet management writes
#[async_trait]
pub trait TruckStore: Send + Sync {
    async fn find_by_plate(&self, plate: &TruckPlate) -> AppResult<Truck>;
    async fn insert(&self, truck: Truck) -> AppResult<Truck>;
    async fn list(&self) -> AppResult<Vec<Truck>>;
    async fn delete(&self, plate: &TruckPlate) -> AppResult<()>;
}

/// Persistence of the product catalog and stock ledger
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_code(&self, code: ProductCode) -> AppResult<Product>;
    async fn insert(&self, product: Product) -> AppResult<Product>;
    /// Version-checked write of an existing product
    async fn save(&self, product: Product) -> AppResult<Product>;
    async fn list_filtered(&self, filter: ProductFilter) -> AppResult<Vec<Product>>;
    async fn delete(&self, code: ProductCode) -> AppResult<()>;
}

/// Persistence of shipments
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn insert(&self, shipment: Shipment) -> AppResult<Shipment>;
    async fn find_by_id(&self, id: ShipmentId) -> AppResult<Shipment>;
    async fn find_filtered(&self, filter: ShipmentFilter) -> AppResult<Vec<Shipment>>;
    /// Version-checked write of an existing shipment
    async fn update(&self, shipment: Shipment) -> AppResult<Shipment>;
}

/// The full set of writes produced by delivering a shipment: the shipment's
/// own state change, the order advancements, and the stock decrements.
#[derive(Debug, Clone)]
pub struct DeliveryBatch {
    pub shipment: Shipment,
    pub orders: Vec<Order>,
    pub products: Vec<Product>,
}

/// Atomic application of a [`DeliveryBatch`].
///
/// The shipment engine collects every mutation a delivery implies and hands
/// them over in one batch; the store applies them in a single transaction
/// (or equivalent) so either all writes land or none do. A version mismatch
/// anywhere in the batch aborts the whole batch with `Conflict`.
#[async_trait]
pub trait DeliveryUnitOfWork: Send + Sync {
    async fn commit_delivery(&self, batch: DeliveryBatch) -> AppResult<()>;
}
