//! PostgreSQL store implementation
//!
//! Line items and stops are embedded JSONB documents, shipment order
//! references are an integer array; states are stored as text. Every write
//! to a versioned table carries a `WHERE version = $n` guard and bumps the
//! version, so a concurrent writer surfaces as `Conflict` instead of a lost
//! update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::stores::{
    DeliveryBatch, DeliveryUnitOfWork, OrderStore, ProductStore, ShipmentStore, TruckStore,
};
use shared::{
    Order, OrderId, OrderLineItem, OrderState, Product, ProductCode, ProductFilter, ProductType,
    Shipment, ShipmentFilter, ShipmentId, ShipmentState, Stop, Truck, TruckPlate,
};

/// Postgres-backed store implementing every storage trait
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    code: i32,
    product_type: String,
    name: String,
    unit_weight: Decimal,
    unit_price: Decimal,
    minimum_stock: i32,
    current_stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: i32,
    version: i64,
}

impl ProductRow {
    fn into_product(self) -> AppResult<Product> {
        let product_type = ProductType::parse(&self.product_type)
            .ok_or_else(|| AppError::Internal(format!("unknown product type {}", self.product_type)))?;
        Ok(Product {
            id: self.id,
            code: ProductCode(self.code),
            product_type,
            name: self.name,
            unit_weight: self.unit_weight,
            unit_price: self.unit_price,
            minimum_stock: self.minimum_stock,
            current_stock: self.current_stock,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            version: self.version,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    order_id: i32,
    line_items: serde_json::Value,
    destination_city: String,
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: i32,
    version: i64,
}

impl OrderRow {
    fn into_order(self) -> AppResult<Order> {
        let line_items: Vec<OrderLineItem> = serde_json::from_value(self.line_items)
            .map_err(|e| AppError::Internal(format!("malformed line items: {e}")))?;
        let state = OrderState::parse(&self.state)
            .ok_or_else(|| AppError::Internal(format!("unknown order state {}", self.state)))?;
        Ok(Order {
            id: self.id,
            order_id: OrderId(self.order_id),
            line_items,
            destination_city: self.destination_city,
            state,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            version: self.version,
        })
    }
}

#[derive(Debug, FromRow)]
struct TruckRow {
    id: Uuid,
    plate: String,
    max_weight: Decimal,
    cost_per_km: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: i32,
}

impl TruckRow {
    fn into_truck(self) -> Truck {
        Truck {
            id: self.id,
            plate: TruckPlate(self.plate),
            max_weight: self.max_weight,
            cost_per_km: self.cost_per_km,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct ShipmentRow {
    id: Uuid,
    shipment_id: i32,
    order_ids: Vec<i32>,
    destination_city: String,
    state: String,
    stops: serde_json::Value,
    truck_plate: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: i32,
    version: i64,
}

impl ShipmentRow {
    fn into_shipment(self) -> AppResult<Shipment> {
        let stops: Vec<Stop> = serde_json::from_value(self.stops)
            .map_err(|e| AppError::Internal(format!("malformed stops: {e}")))?;
        let state = ShipmentState::parse(&self.state)
            .ok_or_else(|| AppError::Internal(format!("unknown shipment state {}", self.state)))?;
        Ok(Shipment {
            id: self.id,
            shipment_id: ShipmentId(self.shipment_id),
            order_ids: self.order_ids.into_iter().map(OrderId).collect(),
            destination_city: self.destination_city,
            state,
            stops,
            truck_plate: TruckPlate(self.truck_plate),
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            version: self.version,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_id, line_items, destination_city, state, \
                             created_at, updated_at, created_by, version";
const PRODUCT_COLUMNS: &str = "id, code, product_type, name, unit_weight, unit_price, \
                               minimum_stock, current_stock, created_at, updated_at, \
                               created_by, version";
const SHIPMENT_COLUMNS: &str = "id, shipment_id, order_ids, destination_city, state, stops, \
                                truck_plate, created_at, updated_at, created_by, version";

/// Distinguishes a missing row from a version mismatch after a guarded
/// update matched nothing
async fn conflict_or_not_found(
    db: &PgPool,
    table: &str,
    key_column: &str,
    key: i32,
    resource: &str,
) -> AppError {
    let exists = sqlx::query_scalar::<_, bool>(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE {key_column} = $1)"
    ))
    .bind(key)
    .fetch_one(db)
    .await;

    match exists {
        Ok(true) => AppError::Conflict {
            resource: resource.to_string(),
        },
        Ok(false) => AppError::NotFound(resource.to_string()),
        Err(e) => AppError::DatabaseError(e),
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn find_by_id(&self, id: OrderId) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        row.into_order()
    }

    async fn insert(&self, order: Order) -> AppResult<Order> {
        let line_items = serde_json::to_value(&order.line_items)
            .map_err(|e| AppError::Internal(format!("line items not serializable: {e}")))?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (order_id, line_items, destination_city, state, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.order_id.0)
        .bind(line_items)
        .bind(&order.destination_city)
        .bind(order.state.as_str())
        .bind(order.created_by)
        .fetch_one(&self.db)
        .await?;

        row.into_order()
    }

    async fn save(&self, order: Order) -> AppResult<Order> {
        let line_items = serde_json::to_value(&order.line_items)
            .map_err(|e| AppError::Internal(format!("line items not serializable: {e}")))?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET line_items = $1, destination_city = $2, state = $3,
                updated_at = now(), version = version + 1
            WHERE order_id = $4 AND version = $5
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(line_items)
        .bind(&order.destination_city)
        .bind(order.state.as_str())
        .bind(order.order_id.0)
        .bind(order.version)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => row.into_order(),
            None => {
                Err(conflict_or_not_found(&self.db, "orders", "order_id", order.order_id.0, "Order")
                    .await)
            }
        }
    }

    async fn list(&self) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_id"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }
}

#[async_trait]
impl TruckStore for PgStore {
    async fn find_by_plate(&self, plate: &TruckPlate) -> AppResult<Truck> {
        let row = sqlx::query_as::<_, TruckRow>(
            r#"
            SELECT id, plate, max_weight, cost_per_km, created_at, updated_at, created_by
            FROM trucks
            WHERE plate = $1
            "#,
        )
        .bind(plate.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Truck".to_string()))?;

        Ok(row.into_truck())
    }

    async fn insert(&self, truck: Truck) -> AppResult<Truck> {
        let row = sqlx::query_as::<_, TruckRow>(
            r#"
            INSERT INTO trucks (plate, max_weight, cost_per_km, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, plate, max_weight, cost_per_km, created_at, updated_at, created_by
            "#,
        )
        .bind(truck.plate.as_str())
        .bind(truck.max_weight)
        .bind(truck.cost_per_km)
        .bind(truck.created_by)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_truck())
    }

    async fn list(&self) -> AppResult<Vec<Truck>> {
        let rows = sqlx::query_as::<_, TruckRow>(
            r#"
            SELECT id, plate, max_weight, cost_per_km, created_at, updated_at, created_by
            FROM trucks
            ORDER BY plate
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(TruckRow::into_truck).collect())
    }

    async fn delete(&self, plate: &TruckPlate) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM trucks WHERE plate = $1")
            .bind(plate.as_str())
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Truck".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn find_by_code(&self, code: ProductCode) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = $1"
        ))
        .bind(code.0)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        row.into_product()
    }

    async fn insert(&self, product: Product) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (code, product_type, name, unit_weight, unit_price,
                                  minimum_stock, current_stock, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.code.0)
        .bind(product.product_type.as_str())
        .bind(&product.name)
        .bind(product.unit_weight)
        .bind(product.unit_price)
        .bind(product.minimum_stock)
        .bind(product.current_stock)
        .bind(product.created_by)
        .fetch_one(&self.db)
        .await?;

        row.into_product()
    }

    async fn save(&self, product: Product) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET product_type = $1, name = $2, unit_weight = $3, unit_price = $4,
                minimum_stock = $5, current_stock = $6,
                updated_at = now(), version = version + 1
            WHERE code = $7 AND version = $8
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.product_type.as_str())
        .bind(&product.name)
        .bind(product.unit_weight)
        .bind(product.unit_price)
        .bind(product.minimum_stock)
        .bind(product.current_stock)
        .bind(product.code.0)
        .bind(product.version)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => row.into_product(),
            None => {
                Err(conflict_or_not_found(&self.db, "products", "code", product.code.0, "Product")
                    .await)
            }
        }
    }

    async fn list_filtered(&self, filter: ProductFilter) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::text IS NULL OR product_type = $1)
              AND ($2::bool = false OR current_stock < minimum_stock)
            ORDER BY code
            "#
        ))
        .bind(filter.product_type.map(|t| t.as_str()))
        .bind(filter.below_minimum_stock)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn delete(&self, code: ProductCode) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE code = $1")
            .bind(code.0)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }
}

#[async_trait]
impl ShipmentStore for PgStore {
    async fn insert(&self, shipment: Shipment) -> AppResult<Shipment> {
        let stops = serde_json::to_value(&shipment.stops)
            .map_err(|e| AppError::Internal(format!("stops not serializable: {e}")))?;
        let order_ids: Vec<i32> = shipment.order_ids.iter().map(|id| id.0).collect();

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            INSERT INTO shipments (shipment_id, order_ids, destination_city, state, stops,
                                   truck_plate, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(shipment.shipment_id.0)
        .bind(&order_ids)
        .bind(&shipment.destination_city)
        .bind(shipment.state.as_str())
        .bind(stops)
        .bind(shipment.truck_plate.as_str())
        .bind(shipment.created_by)
        .fetch_one(&self.db)
        .await?;

        row.into_shipment()
    }

    async fn find_by_id(&self, id: ShipmentId) -> AppResult<Shipment> {
        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE shipment_id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?;

        row.into_shipment()
    }

    async fn find_filtered(&self, filter: ShipmentFilter) -> AppResult<Vec<Shipment>> {
        let rows = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            SELECT {SHIPMENT_COLUMNS}
            FROM shipments
            WHERE ($1::text IS NULL OR truck_plate = $1)
              AND ($2::text IS NULL OR state = $2)
              AND ($3::text IS NULL OR stops->-1->>'city' = $3)
              AND ($4::timestamptz IS NULL OR created_at >= $4)
              AND ($5::timestamptz IS NULL OR created_at <= $5)
            ORDER BY shipment_id
            "#
        ))
        .bind(filter.truck_plate.as_ref().map(|p| p.as_str().to_string()))
        .bind(filter.state.map(|s| s.as_str()))
        .bind(&filter.last_stop_city)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ShipmentRow::into_shipment).collect()
    }

    async fn update(&self, shipment: Shipment) -> AppResult<Shipment> {
        let mut tx = self.db.begin().await?;
        let row = update_shipment_in(&mut tx, &shipment).await?;
        tx.commit().await?;

        match row {
            Some(row) => row.into_shipment(),
            None => Err(conflict_or_not_found(
                &self.db,
                "shipments",
                "shipment_id",
                shipment.shipment_id.0,
                "Shipment",
            )
            .await),
        }
    }
}

async fn update_shipment_in(
    tx: &mut Transaction<'_, Postgres>,
    shipment: &Shipment,
) -> AppResult<Option<ShipmentRow>> {
    let stops = serde_json::to_value(&shipment.stops)
        .map_err(|e| AppError::Internal(format!("stops not serializable: {e}")))?;
    let order_ids: Vec<i32> = shipment.order_ids.iter().map(|id| id.0).collect();

    let row = sqlx::query_as::<_, ShipmentRow>(&format!(
        r#"
        UPDATE shipments
        SET order_ids = $1, destination_city = $2, state = $3, stops = $4,
            truck_plate = $5, updated_at = now(), version = version + 1
        WHERE shipment_id = $6 AND version = $7
        RETURNING {SHIPMENT_COLUMNS}
        "#
    ))
    .bind(&order_ids)
    .bind(&shipment.destination_city)
    .bind(shipment.state.as_str())
    .bind(stops)
    .bind(shipment.truck_plate.as_str())
    .bind(shipment.shipment_id.0)
    .bind(shipment.version)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row)
}

#[async_trait]
impl DeliveryUnitOfWork for PgStore {
    async fn commit_delivery(&self, batch: DeliveryBatch) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let updated = update_shipment_in(&mut tx, &batch.shipment).await?;
        if updated.is_none() {
            return Err(AppError::Conflict {
                resource: "Shipment".to_string(),
            });
        }

        for order in &batch.orders {
            let result = sqlx::query(
                r#"
                UPDATE orders
                SET state = $1, updated_at = now(), version = version + 1
                WHERE order_id = $2 AND version = $3
                "#,
            )
            .bind(order.state.as_str())
            .bind(order.order_id.0)
            .bind(order.version)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::Conflict {
                    resource: "Order".to_string(),
                });
            }
        }

        for product in &batch.products {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET current_stock = $1, updated_at = now(), version = version + 1
                WHERE code = $2 AND version = $3
                "#,
            )
            .bind(product.current_stock)
            .bind(product.code.0)
            .bind(product.version)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::Conflict {
                    resource: "Product".to_string(),
                });
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
