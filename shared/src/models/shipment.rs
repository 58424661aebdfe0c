//! Shipment models and the shipment delivery state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{OrderId, ShipmentId, TruckPlate};

/// A recorded waypoint on a shipment's route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub city: String,
    /// Kilometers traveled to reach this stop
    pub km_traveled: i32,
}

/// Delivery states of a shipment
///
/// `ToDispatch` is set at creation. Stops may only be appended while
/// `InTransit`. `Dispatched` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentState {
    ToDispatch,
    InTransit,
    Dispatched,
}

impl ShipmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentState::ToDispatch => "to_dispatch",
            ShipmentState::InTransit => "in_transit",
            ShipmentState::Dispatched => "dispatched",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "to_dispatch" => Some(ShipmentState::ToDispatch),
            "in_transit" => Some(ShipmentState::InTransit),
            "dispatched" => Some(ShipmentState::Dispatched),
            _ => None,
        }
    }
}

/// A dispatch of one or more orders via a single truck
///
/// Orders are referenced by business id, never embedded: the authoritative
/// order records are resolved through the order store at the time of use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub shipment_id: ShipmentId,
    pub order_ids: Vec<OrderId>,
    pub destination_city: String,
    pub state: ShipmentState,
    pub stops: Vec<Stop>,
    pub truck_plate: TruckPlate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: i32,
    /// Optimistic-concurrency version, bumped on every update
    pub version: i64,
}

impl Shipment {
    /// Kilometers billed for delivery cost.
    ///
    /// Sums the km of every stop except the last one recorded; the final
    /// stop's own distance is not counted. This mirrors the billing rule the
    /// operation has always used.
    pub fn billable_km(&self) -> i32 {
        let stops = self.stops.len().saturating_sub(1);
        self.stops[..stops].iter().map(|stop| stop.km_traveled).sum()
    }

    /// Delivery cost for this shipment given a per-kilometer rate
    pub fn delivery_cost(&self, cost_per_km: Decimal) -> Decimal {
        cost_per_km * Decimal::from(self.billable_km())
    }

    /// City of the most recent stop, if any
    pub fn last_stop_city(&self) -> Option<&str> {
        self.stops.last().map(|stop| stop.city.as_str())
    }
}

/// Filter for shipment queries; `None` dimensions are not applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentFilter {
    pub truck_plate: Option<TruckPlate>,
    pub state: Option<ShipmentState>,
    /// Matches shipments whose most recent stop is this city
    pub last_stop_city: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl ShipmentFilter {
    /// Filter on creation date only; every other dimension cleared
    pub fn created_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            created_from: Some(from),
            created_to: Some(to),
            ..Self::default()
        }
    }

    pub fn matches(&self, shipment: &Shipment) -> bool {
        if let Some(plate) = &self.truck_plate {
            if &shipment.truck_plate != plate {
                return false;
            }
        }
        if let Some(state) = self.state {
            if shipment.state != state {
                return false;
            }
        }
        if let Some(city) = &self.last_stop_city {
            if shipment.last_stop_city() != Some(city.as_str()) {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if shipment.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if shipment.created_at > to {
                return false;
            }
        }
        true
    }
}

/// Result of a guarded shipment transition (`start_trip` / `finish_trip`).
///
/// A transition attempted from a disallowed state is not an error: it is
/// reported as `Rejected` with the reason, and the shipment is unchanged.
/// Callers must check which variant they got.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied { shipment: Shipment },
    Rejected { reason: String },
}

impl TransitionOutcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        TransitionOutcome::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn stop(city: &str, km: i32) -> Stop {
        Stop {
            city: city.to_string(),
            km_traveled: km,
        }
    }

    fn shipment(state: ShipmentState, stops: Vec<Stop>) -> Shipment {
        Shipment {
            id: Uuid::new_v4(),
            shipment_id: ShipmentId(1),
            order_ids: vec![OrderId(1)],
            destination_city: "Cordoba".to_string(),
            state,
            stops,
            truck_plate: TruckPlate::new("AA123BB"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: 1,
            version: 1,
        }
    }

    #[test]
    fn test_billable_km_excludes_final_stop() {
        let s = shipment(
            ShipmentState::InTransit,
            vec![stop("Rafaela", 100), stop("Santa Fe", 90), stop("Parana", 30)],
        );
        assert_eq!(s.billable_km(), 190);
    }

    #[test]
    fn test_billable_km_single_stop_is_zero() {
        let s = shipment(ShipmentState::InTransit, vec![stop("Rafaela", 100)]);
        assert_eq!(s.billable_km(), 0);
    }

    #[test]
    fn test_billable_km_no_stops() {
        let s = shipment(ShipmentState::ToDispatch, vec![]);
        assert_eq!(s.billable_km(), 0);
    }

    #[test]
    fn test_delivery_cost() {
        let s = shipment(
            ShipmentState::Dispatched,
            vec![stop("Rafaela", 100), stop("Santa Fe", 90)],
        );
        assert_eq!(s.delivery_cost(dec("5.0")), dec("500.0"));
    }

    #[test]
    fn test_filter_by_date_range_only() {
        let s = shipment(ShipmentState::ToDispatch, vec![]);
        let filter =
            ShipmentFilter::created_between(s.created_at - chrono::Duration::hours(1), Utc::now());
        assert!(filter.matches(&s));
        assert!(filter.truck_plate.is_none());
        assert!(filter.state.is_none());
        assert!(filter.last_stop_city.is_none());
    }

    #[test]
    fn test_filter_date_range_excludes_outside() {
        let s = shipment(ShipmentState::ToDispatch, vec![]);
        let filter = ShipmentFilter {
            created_to: Some(s.created_at - chrono::Duration::hours(1)),
            ..ShipmentFilter::default()
        };
        assert!(!filter.matches(&s));
    }

    #[test]
    fn test_filter_by_last_stop_city() {
        let s = shipment(
            ShipmentState::InTransit,
            vec![stop("Rafaela", 100), stop("Santa Fe", 90)],
        );
        let hit = ShipmentFilter {
            last_stop_city: Some("Santa Fe".to_string()),
            ..ShipmentFilter::default()
        };
        let miss = ShipmentFilter {
            last_stop_city: Some("Rafaela".to_string()),
            ..ShipmentFilter::default()
        };
        assert!(hit.matches(&s));
        assert!(!miss.matches(&s));
    }

    #[test]
    fn test_shipment_state_round_trip() {
        for s in [
            ShipmentState::ToDispatch,
            ShipmentState::InTransit,
            ShipmentState::Dispatched,
        ] {
            assert_eq!(ShipmentState::parse(s.as_str()), Some(s));
        }
        assert_eq!(ShipmentState::parse("delivered"), None);
    }
}
