//! Route definitions for the Shipment Logistics Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product catalog and stock ledger
        .nest("/products", product_routes())
        // Order lifecycle
        .nest("/orders", order_routes())
        // Truck registry
        .nest("/trucks", truck_routes())
        // Shipment lifecycle engine
        .nest("/shipments", shipment_routes())
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:code",
            get(handlers::get_product).delete(handlers::delete_product),
        )
        .route("/:code/stock", post(handlers::adjust_stock))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/accept", post(handlers::accept_order))
        .route("/:order_id/cancel", post(handlers::cancel_order))
}

fn truck_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_trucks).post(handlers::create_truck))
        .route(
            "/:plate",
            get(handlers::get_truck).delete(handlers::delete_truck),
        )
}

fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_shipments).post(handlers::create_shipment),
        )
        .route("/benefit", get(handlers::net_benefit))
        .route("/:shipment_id", get(handlers::get_shipment))
        .route("/:shipment_id/stops", post(handlers::add_stop))
        .route("/:shipment_id/start", post(handlers::start_trip))
        .route("/:shipment_id/finish", post(handlers::finish_trip))
}
