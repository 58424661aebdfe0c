//! Truck registry service

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::stores::TruckStore;
use shared::{validate_plate, validate_positive_amount, Truck, TruckPlate};

/// Fleet management service
#[derive(Clone)]
pub struct TruckService {
    trucks: Arc<dyn TruckStore>,
}

/// Input for registering a truck
#[derive(Debug, Deserialize)]
pub struct CreateTruckInput {
    pub plate: TruckPlate,
    pub max_weight: Decimal,
    pub cost_per_km: Decimal,
    pub created_by: i32,
}

impl TruckService {
    /// Create a new TruckService instance
    pub fn new(trucks: Arc<dyn TruckStore>) -> Self {
        Self { trucks }
    }

    /// Register a truck
    pub async fn create_truck(&self, input: CreateTruckInput) -> AppResult<Truck> {
        validate_plate(input.plate.as_str()).map_err(|message| AppError::Validation {
            field: "plate".to_string(),
            message: message.to_string(),
        })?;
        for (field, amount) in [
            ("max_weight", input.max_weight),
            ("cost_per_km", input.cost_per_km),
        ] {
            validate_positive_amount(amount).map_err(|message| AppError::Validation {
                field: field.to_string(),
                message: message.to_string(),
            })?;
        }

        let truck = Truck {
            id: uuid::Uuid::nil(),
            plate: input.plate,
            max_weight: input.max_weight,
            cost_per_km: input.cost_per_km,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            created_by: input.created_by,
        };

        let truck = self.trucks.insert(truck).await?;
        tracing::info!(plate = %truck.plate, "truck registered");

        Ok(truck)
    }

    /// Get a truck by plate
    pub async fn get_truck(&self, plate: &TruckPlate) -> AppResult<Truck> {
        self.trucks.find_by_plate(plate).await
    }

    /// List the fleet
    pub async fn list_trucks(&self) -> AppResult<Vec<Truck>> {
        self.trucks.list().await
    }

    /// Remove a truck from the fleet
    pub async fn delete_truck(&self, plate: &TruckPlate) -> AppResult<()> {
        self.trucks.delete(plate).await
    }
}
