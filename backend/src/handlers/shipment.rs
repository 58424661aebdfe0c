//! HTTP handlers for shipment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::shipment::CreateShipmentInput;
use crate::services::ShipmentService;
use crate::AppState;
use shared::{DateRange, Shipment, ShipmentFilter, ShipmentId, Stop, TransitionOutcome};

fn shipment_service(state: &AppState) -> ShipmentService {
    ShipmentService::from_store(state.store.clone())
}

/// Create a shipment
pub async fn create_shipment(
    State(state): State<AppState>,
    Json(input): Json<CreateShipmentInput>,
) -> AppResult<(StatusCode, Json<Shipment>)> {
    let shipment = shipment_service(&state).create_shipment(input).await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

/// List shipments, optionally filtered
pub async fn list_shipments(
    State(state): State<AppState>,
    Query(filter): Query<ShipmentFilter>,
) -> AppResult<Json<Vec<Shipment>>> {
    let shipments = shipment_service(&state).list_shipments(filter).await?;
    Ok(Json(shipments))
}

/// Get a shipment by id
pub async fn get_shipment(
    State(state): State<AppState>,
    Path(shipment_id): Path<i32>,
) -> AppResult<Json<Shipment>> {
    let shipment = shipment_service(&state)
        .get_shipment(ShipmentId(shipment_id))
        .await?;
    Ok(Json(shipment))
}

/// Append a stop to a shipment's route
pub async fn add_stop(
    State(state): State<AppState>,
    Path(shipment_id): Path<i32>,
    Json(stop): Json<Stop>,
) -> AppResult<Json<Shipment>> {
    let shipment = shipment_service(&state)
        .add_stop(ShipmentId(shipment_id), stop)
        .await?;
    Ok(Json(shipment))
}

/// Start a shipment's trip
pub async fn start_trip(
    State(state): State<AppState>,
    Path(shipment_id): Path<i32>,
) -> AppResult<Json<TransitionOutcome>> {
    let outcome = shipment_service(&state)
        .start_trip(ShipmentId(shipment_id))
        .await?;
    Ok(Json(outcome))
}

/// Finish a shipment's trip
pub async fn finish_trip(
    State(state): State<AppState>,
    Path(shipment_id): Path<i32>,
) -> AppResult<Json<TransitionOutcome>> {
    let outcome = shipment_service(&state)
        .finish_trip(ShipmentId(shipment_id))
        .await?;
    Ok(Json(outcome))
}

/// Date range query for the benefit report
#[derive(Debug, Deserialize)]
pub struct BenefitQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Net benefit report
#[derive(Debug, Serialize)]
pub struct BenefitResponse {
    pub net_benefit: Decimal,
}

/// Net benefit over a creation-date range
pub async fn net_benefit(
    State(state): State<AppState>,
    Query(query): Query<BenefitQuery>,
) -> AppResult<Json<BenefitResponse>> {
    let net_benefit = shipment_service(&state)
        .net_benefit(DateRange::new(query.from, query.to))
        .await?;
    Ok(Json(BenefitResponse { net_benefit }))
}
