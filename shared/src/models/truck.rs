//! Truck registry models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TruckPlate;

/// A truck in the fleet
///
/// Read-only from the shipment engine's perspective: the engine looks up
/// capacity and per-kilometer cost by plate and never writes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub id: Uuid,
    pub plate: TruckPlate,
    /// Maximum carryable weight, in kilograms
    pub max_weight: Decimal,
    /// Cost per kilometer traveled
    pub cost_per_km: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: i32,
}

impl Truck {
    /// Feasibility check: a load fits when its total weight does not exceed
    /// capacity. Exact equality is feasible.
    pub fn can_carry(&self, total_weight: Decimal) -> bool {
        total_weight <= self.max_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn truck(max_weight: &str) -> Truck {
        Truck {
            id: Uuid::new_v4(),
            plate: TruckPlate::new("AA123BB"),
            max_weight: dec(max_weight),
            cost_per_km: dec("5.0"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: 1,
        }
    }

    #[test]
    fn test_can_carry_under_capacity() {
        assert!(truck("1000").can_carry(dec("500")));
    }

    #[test]
    fn test_can_carry_exact_capacity() {
        assert!(truck("1000").can_carry(dec("1000")));
    }

    #[test]
    fn test_cannot_carry_over_capacity() {
        assert!(!truck("1000").can_carry(dec("1000.01")));
    }
}
