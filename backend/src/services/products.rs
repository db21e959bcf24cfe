//! Product management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Product, ProductMaterial};
use shared::validation::{validate_item_code, validate_stock_quantity};

/// Product service for the sellable catalog
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Database row for a product; materials live in a JSONB document
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    name: String,
    code: String,
    description: Option<String>,
    price: Decimal,
    materials: sqlx::types::Json<Vec<ProductMaterial>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            code: row.code,
            description: row.description,
            price: row.price,
            materials: row.materials.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating or updating a product
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub materials: Vec<ProductMaterial>,
}

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, code, description, price, materials, created_at, updated_at";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn validate(&self, input: &ProductInput) -> AppResult<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name cannot be empty".to_string(),
                message_hr: "Naziv proizvoda ne smije biti prazan".to_string(),
            });
        }
        validate_item_code(&input.code).map_err(|e| AppError::Validation {
            field: "code".to_string(),
            message: e.to_string(),
            message_hr: "Šifra proizvoda nije ispravna".to_string(),
        })?;
        if input.price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: "Price cannot be negative".to_string(),
                message_hr: "Cijena ne smije biti negativna".to_string(),
            });
        }

        for material in &input.materials {
            validate_stock_quantity(material.quantity_per_unit).map_err(|e| {
                AppError::Validation {
                    field: "materials".to_string(),
                    message: e.to_string(),
                    message_hr: "Utrošak materijala nije ispravan".to_string(),
                }
            })?;

            // A new definition must reference live inventory; stale
            // references can only arise from later deletions.
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM inventory_items WHERE id = $1)",
            )
            .bind(material.inventory_item_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::Validation {
                    field: "materials".to_string(),
                    message: format!(
                        "Inventory item {} does not exist",
                        material.inventory_item_id
                    ),
                    message_hr: "Materijal ne postoji na skladištu".to_string(),
                });
            }

            let process_ids: Vec<Uuid> =
                material.process_steps.iter().map(|a| a.process_id()).collect();
            if !process_ids.is_empty() {
                let known = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM processes WHERE id = ANY($1)",
                )
                .bind(&process_ids)
                .fetch_one(&self.db)
                .await?;
                if known as usize != process_ids.len() {
                    return Err(AppError::Validation {
                        field: "materials".to_string(),
                        message: "Material references an unknown process".to_string(),
                        message_hr: "Materijal upućuje na nepoznatu obradu".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// List all products
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Create a product
    pub async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        self.validate(&input).await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (name, code, description, price, materials)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.price)
        .bind(sqlx::types::Json(&input.materials))
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::DuplicateEntry("code".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(row.into())
    }

    /// Update a product. Existing order lines keep their material snapshot;
    /// the change only affects lines created afterwards.
    pub async fn update_product(&self, product_id: Uuid, input: ProductInput) -> AppResult<Product> {
        self.validate(&input).await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $1, code = $2, description = $3, price = $4, materials = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .bind(input.price)
        .bind(sqlx::types::Json(&input.materials))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            if super::is_unique_violation(&e) {
                AppError::DuplicateEntry("code".to_string())
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Delete a product
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }
}
