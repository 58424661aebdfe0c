//! HTTP handlers for the Shipment Logistics Platform

mod health;
mod order;
mod product;
mod shipment;
mod truck;

pub use health::*;
pub use order::*;
pub use product::*;
pub use shipment::*;
pub use truck::*;
