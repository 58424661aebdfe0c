//! Shared types and models for the Shipment Logistics Platform
//!
//! This crate contains the domain model shared between the backend and any
//! other components of the system: products, orders, trucks, shipments and
//! the pure state-machine and weight/price arithmetic they carry.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
