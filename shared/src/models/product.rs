//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ProductCode;

/// A product in the catalog
///
/// `code` is the business key; `id` is storage identity only and must never
/// be used for cross-entity references. `current_stock` is decremented when
/// a shipment containing the product is delivered; there is no floor check,
/// so it can go negative if callers ship more than is on hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub code: ProductCode,
    pub product_type: ProductType,
    pub name: String,
    /// Weight of one unit, in kilograms
    pub unit_weight: Decimal,
    /// Price of one unit
    pub unit_price: Decimal,
    /// Stock level below which the product shows up in low-stock queries
    pub minimum_stock: i32,
    pub current_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: i32,
    /// Optimistic-concurrency version, bumped on every save
    pub version: i64,
}

/// Product categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Food,
    Electronics,
    Clothing,
    Furniture,
    Other,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Food => "food",
            ProductType::Electronics => "electronics",
            ProductType::Clothing => "clothing",
            ProductType::Furniture => "furniture",
            ProductType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "food" => Some(ProductType::Food),
            "electronics" => Some(ProductType::Electronics),
            "clothing" => Some(ProductType::Clothing),
            "furniture" => Some(ProductType::Furniture),
            "other" => Some(ProductType::Other),
            _ => None,
        }
    }
}

impl Product {
    /// Whether current stock has fallen below the configured minimum
    pub fn is_below_minimum_stock(&self) -> bool {
        self.current_stock < self.minimum_stock
    }
}

/// Filter for product listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub product_type: Option<ProductType>,
    /// When true, only products whose stock is below their minimum
    #[serde(default)]
    pub below_minimum_stock: bool,
}
