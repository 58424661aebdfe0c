//! Validation utilities for the Shipment Logistics Platform
//!
//! Pure input checks applied before anything touches a store. Business-rule
//! checks that need live data (truck capacity, order states) live in the
//! backend services.

use rust_decimal::Decimal;

use crate::models::Stop;
use crate::types::OrderId;

/// Validate an Argentinian-format license plate (AB123CD or ABC123)
pub fn validate_plate(plate: &str) -> Result<(), &'static str> {
    if plate.is_empty() {
        return Err("Plate must not be empty");
    }
    let valid_chars = plate
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if !valid_chars || plate.len() < 6 || plate.len() > 7 {
        return Err("Plate must be 6-7 uppercase letters and digits");
    }
    Ok(())
}

/// Validate the order list of a shipment request
pub fn validate_shipment_orders(order_ids: &[OrderId]) -> Result<(), &'static str> {
    if order_ids.is_empty() {
        return Err("Shipment must reference at least one order");
    }
    Ok(())
}

/// Validate a destination city name
pub fn validate_city(city: &str) -> Result<(), &'static str> {
    if city.trim().is_empty() {
        return Err("City must not be empty");
    }
    Ok(())
}

/// Validate a stop before it is appended to a shipment's route
pub fn validate_stop(stop: &Stop) -> Result<(), &'static str> {
    validate_city(&stop.city)?;
    if stop.km_traveled < 0 {
        return Err("Kilometers traveled cannot be negative");
    }
    Ok(())
}

/// Validate a line-item quantity
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a unit weight or price attribute
pub fn validate_positive_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_plate_valid() {
        assert!(validate_plate("AA123BB").is_ok());
        assert!(validate_plate("ABC123").is_ok());
    }

    #[test]
    fn test_validate_plate_invalid() {
        assert!(validate_plate("").is_err());
        assert!(validate_plate("aa123bb").is_err());
        assert!(validate_plate("AA-123").is_err());
        assert!(validate_plate("AA123BBC").is_err());
    }

    #[test]
    fn test_validate_shipment_orders() {
        assert!(validate_shipment_orders(&[OrderId(1)]).is_ok());
        assert!(validate_shipment_orders(&[]).is_err());
    }

    #[test]
    fn test_validate_city() {
        assert!(validate_city("Rosario").is_ok());
        assert!(validate_city("  ").is_err());
    }

    #[test]
    fn test_validate_stop() {
        let ok = Stop {
            city: "Santa Fe".to_string(),
            km_traveled: 120,
        };
        assert!(validate_stop(&ok).is_ok());

        let negative = Stop {
            city: "Santa Fe".to_string(),
            km_traveled: -1,
        };
        assert!(validate_stop(&negative).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount(Decimal::ONE).is_ok());
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
    }
}
