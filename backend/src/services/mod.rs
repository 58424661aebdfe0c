//! Business logic services for the Shipment Logistics Platform

pub mod order;
pub mod product;
pub mod shipment;
pub mod truck;

pub use order::OrderService;
pub use product::ProductService;
pub use shipment::ShipmentService;
pub use truck::TruckService;
