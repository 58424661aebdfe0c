//! HTTP handlers for truck endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::truck::CreateTruckInput;
use crate::services::TruckService;
use crate::AppState;
use shared::{Truck, TruckPlate};

fn truck_service(state: &AppState) -> TruckService {
    TruckService::new(state.store.clone())
}

/// Register a truck
pub async fn create_truck(
    State(state): State<AppState>,
    Json(input): Json<CreateTruckInput>,
) -> AppResult<(StatusCode, Json<Truck>)> {
    let truck = truck_service(&state).create_truck(input).await?;
    Ok((StatusCode::CREATED, Json(truck)))
}

/// List the fleet
pub async fn list_trucks(State(state): State<AppState>) -> AppResult<Json<Vec<Truck>>> {
    let trucks = truck_service(&state).list_trucks().await?;
    Ok(Json(trucks))
}

/// Get a truck by plate
pub async fn get_truck(
    State(state): State<AppState>,
    Path(plate): Path<String>,
) -> AppResult<Json<Truck>> {
    let truck = truck_service(&state).get_truck(&TruckPlate::new(plate)).await?;
    Ok(Json(truck))
}

/// Remove a truck from the fleet
pub async fn delete_truck(
    State(state): State<AppState>,
    Path(plate): Path<String>,
) -> AppResult<Json<()>> {
    truck_service(&state)
        .delete_truck(&TruckPlate::new(plate))
        .await?;
    Ok(Json(()))
}
