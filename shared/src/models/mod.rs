//! Domain models for the Shipment Logistics Platform

mod order;
mod product;
mod shipment;
mod truck;

pub use order::*;
pub use product::*;
pub use shipment::*;
pub use truck::*;
