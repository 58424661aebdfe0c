//! Order lifecycle and catalog service tests
//!
//! Covers order creation with snapshot freezing, the accept/cancel guards,
//! product filtering and stock adjustment, and truck registration.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use shipment_logistics_backend::error::AppError;
use shipment_logistics_backend::services::order::{CreateOrderInput, LineItemInput};
use shipment_logistics_backend::services::product::{AdjustStockInput, CreateProductInput};
use shipment_logistics_backend::services::truck::CreateTruckInput;
use shipment_logistics_backend::services::{OrderService, ProductService, TruckService};
use shipment_logistics_backend::stores::{MemoryStore, ProductStore};
use shared::{OrderId, OrderState, ProductCode, ProductFilter, ProductType, TruckPlate};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Fixture {
    store: Arc<MemoryStore>,
    orders: OrderService,
    products: ProductService,
    trucks: TruckService,
}

fn setup() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    Fixture {
        orders: OrderService::new(store.clone(), store.clone()),
        products: ProductService::new(store.clone()),
        trucks: TruckService::new(store.clone()),
        store,
    }
}

fn product_input(code: i32, weight: &str, price: &str) -> CreateProductInput {
    CreateProductInput {
        code: ProductCode(code),
        product_type: ProductType::Food,
        name: format!("Product {code}"),
        unit_weight: dec(weight),
        unit_price: dec(price),
        minimum_stock: 10,
        current_stock: 100,
        created_by: 1,
    }
}

fn order_input(id: i32, items: Vec<(i32, i32)>) -> CreateOrderInput {
    CreateOrderInput {
        order_id: OrderId(id),
        line_items: items
            .into_iter()
            .map(|(code, quantity)| LineItemInput {
                product_code: ProductCode(code),
                quantity,
            })
            .collect(),
        destination_city: "Rosario".to_string(),
        created_by: 1,
    }
}

// ============================================================================
// Order creation and snapshots
// ============================================================================

#[tokio::test]
async fn test_create_order_starts_pending_with_snapshots() {
    let fx = setup();
    fx.products.create_product(product_input(10, "2.5", "8")).await.unwrap();

    let order = fx.orders.create_order(order_input(1, vec![(10, 4)])).await.unwrap();

    assert_eq!(order.state, OrderState::Pending);
    assert_eq!(order.line_items.len(), 1);
    assert_eq!(order.line_items[0].unit_weight, dec("2.5"));
    assert_eq!(order.line_items[0].unit_price, dec("8"));
    assert_eq!(order.total_weight(), dec("10.0"));
    assert_eq!(order.total_price(), dec("32"));
}

#[tokio::test]
async fn test_snapshots_survive_later_product_repricing() {
    let fx = setup();
    fx.products
        .create_product(product_input(10, "2.5", "8"))
        .await
        .unwrap();
    let order = fx.orders.create_order(order_input(1, vec![(10, 4)])).await.unwrap();

    // Reprice the product after the order was taken
    let mut product = fx.products.get_product(ProductCode(10)).await.unwrap();
    product.unit_price = dec("99");
    ProductStore::save(&*fx.store, product).await.unwrap();

    // The frozen snapshot still prices the order at creation-time values
    let reloaded = fx.orders.get_order(order.order_id).await.unwrap();
    assert_eq!(reloaded.line_items[0].unit_price, dec("8"));
    assert_eq!(reloaded.total_price(), dec("32"));
}

#[tokio::test]
async fn test_create_order_rejects_unknown_product() {
    let fx = setup();
    let err = fx
        .orders
        .create_order(order_input(1, vec![(99, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_create_order_rejects_empty_and_nonpositive_items() {
    let fx = setup();
    fx.products.create_product(product_input(10, "1", "1")).await.unwrap();

    let err = fx.orders.create_order(order_input(1, vec![])).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = fx
        .orders
        .create_order(order_input(1, vec![(10, 0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

// ============================================================================
// Accept / cancel guards
// ============================================================================

#[tokio::test]
async fn test_accept_pending_order() {
    let fx = setup();
    fx.products.create_product(product_input(10, "1", "1")).await.unwrap();
    fx.orders.create_order(order_input(1, vec![(10, 1)])).await.unwrap();

    let order = fx.orders.accept_order(OrderId(1)).await.unwrap();
    assert_eq!(order.state, OrderState::Accepted);
}

#[tokio::test]
async fn test_accept_twice_fails() {
    let fx = setup();
    fx.products.create_product(product_input(10, "1", "1")).await.unwrap();
    fx.orders.create_order(order_input(1, vec![(10, 1)])).await.unwrap();
    fx.orders.accept_order(OrderId(1)).await.unwrap();

    let err = fx.orders.accept_order(OrderId(1)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn test_cancel_pending_and_accepted_orders() {
    let fx = setup();
    fx.products.create_product(product_input(10, "1", "1")).await.unwrap();

    fx.orders.create_order(order_input(1, vec![(10, 1)])).await.unwrap();
    let cancelled = fx.orders.cancel_order(OrderId(1)).await.unwrap();
    assert_eq!(cancelled.state, OrderState::Cancelled);

    fx.orders.create_order(order_input(2, vec![(10, 1)])).await.unwrap();
    fx.orders.accept_order(OrderId(2)).await.unwrap();
    let cancelled = fx.orders.cancel_order(OrderId(2)).await.unwrap();
    assert_eq!(cancelled.state, OrderState::Cancelled);
}

#[tokio::test]
async fn test_cancel_cancelled_order_fails() {
    let fx = setup();
    fx.products.create_product(product_input(10, "1", "1")).await.unwrap();
    fx.orders.create_order(order_input(1, vec![(10, 1)])).await.unwrap();
    fx.orders.cancel_order(OrderId(1)).await.unwrap();

    let err = fx.orders.cancel_order(OrderId(1)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

// ============================================================================
// Product catalog
// ============================================================================

#[tokio::test]
async fn test_list_products_below_minimum_stock() {
    let fx = setup();
    fx.products.create_product(product_input(10, "1", "1")).await.unwrap();
    fx.products.create_product(product_input(11, "1", "1")).await.unwrap();
    fx.products
        .adjust_stock(ProductCode(11), AdjustStockInput { delta: -95 })
        .await
        .unwrap();

    let low = fx
        .products
        .list_products(ProductFilter {
            product_type: None,
            below_minimum_stock: true,
        })
        .await
        .unwrap();

    assert_eq!(low.len(), 1);
    assert_eq!(low[0].code, ProductCode(11));
    assert_eq!(low[0].current_stock, 5);
}

#[tokio::test]
async fn test_list_products_by_type() {
    let fx = setup();
    fx.products.create_product(product_input(10, "1", "1")).await.unwrap();
    let mut electronics = product_input(11, "1", "1");
    electronics.product_type = ProductType::Electronics;
    fx.products.create_product(electronics).await.unwrap();

    let found = fx
        .products
        .list_products(ProductFilter {
            product_type: Some(ProductType::Electronics),
            below_minimum_stock: false,
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, ProductCode(11));
}

#[tokio::test]
async fn test_duplicate_product_code_rejected() {
    let fx = setup();
    fx.products.create_product(product_input(10, "1", "1")).await.unwrap();
    let err = fx
        .products
        .create_product(product_input(10, "1", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateEntry(_)));
}

// ============================================================================
// Truck registry
// ============================================================================

#[tokio::test]
async fn test_register_and_fetch_truck() {
    let fx = setup();
    let truck = fx
        .trucks
        .create_truck(CreateTruckInput {
            plate: TruckPlate::new("AA123BB"),
            max_weight: dec("1000"),
            cost_per_km: dec("5.0"),
            created_by: 1,
        })
        .await
        .unwrap();

    let fetched = fx.trucks.get_truck(&truck.plate).await.unwrap();
    assert_eq!(fetched.max_weight, dec("1000"));
    assert_eq!(fetched.cost_per_km, dec("5.0"));
}

#[tokio::test]
async fn test_register_truck_rejects_bad_plate() {
    let fx = setup();
    let err = fx
        .trucks
        .create_truck(CreateTruckInput {
            plate: TruckPlate::new("aa-123"),
            max_weight: dec("1000"),
            cost_per_km: dec("5.0"),
            created_by: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
async fn test_delete_missing_truck_fails() {
    let fx = setup();
    let err = fx
        .trucks
        .delete_truck(&TruckPlate::new("ZZ999ZZ"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
