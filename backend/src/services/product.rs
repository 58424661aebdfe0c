//! Product catalog and stock ledger service

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::stores::ProductStore;
use shared::{validate_positive_amount, Product, ProductCode, ProductFilter, ProductType};

/// Product management service
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub code: ProductCode,
    pub product_type: ProductType,
    pub name: String,
    pub unit_weight: Decimal,
    pub unit_price: Decimal,
    pub minimum_stock: i32,
    pub current_stock: i32,
    pub created_by: i32,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    /// Signed quantity added to current stock
    pub delta: i32,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name must not be empty".to_string(),
            });
        }
        for (field, amount) in [
            ("unit_weight", input.unit_weight),
            ("unit_price", input.unit_price),
        ] {
            validate_positive_amount(amount).map_err(|message| AppError::Validation {
                field: field.to_string(),
                message: message.to_string(),
            })?;
        }

        let product = Product {
            id: uuid::Uuid::nil(),
            code: input.code,
            product_type: input.product_type,
            name: input.name,
            unit_weight: input.unit_weight,
            unit_price: input.unit_price,
            minimum_stock: input.minimum_stock,
            current_stock: input.current_stock,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            created_by: input.created_by,
            version: 0,
        };

        let product = self.products.insert(product).await?;
        tracing::info!(code = %product.code, "product created");

        Ok(product)
    }

    /// Get a product by business code
    pub async fn get_product(&self, code: ProductCode) -> AppResult<Product> {
        self.products.find_by_code(code).await
    }

    /// List products, optionally filtered by type or low stock
    pub async fn list_products(&self, filter: ProductFilter) -> AppResult<Vec<Product>> {
        self.products.list_filtered(filter).await
    }

    /// Apply a manual stock adjustment. No floor check: callers wanting to
    /// forbid negative stock must validate before calling.
    pub async fn adjust_stock(
        &self,
        code: ProductCode,
        input: AdjustStockInput,
    ) -> AppResult<Product> {
        let mut product = self.products.find_by_code(code).await?;
        product.current_stock += input.delta;
        self.products.save(product).await
    }

    /// Delete a product
    pub async fn delete_product(&self, code: ProductCode) -> AppResult<()> {
        self.products.delete(code).await
    }
}
