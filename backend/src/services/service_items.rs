//! Service catalog management

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::ServiceItem;
use shared::types::Unit;

/// Service catalog service (delivery, installation and similar lines)
#[derive(Clone)]
pub struct ServiceItemService {
    db: PgPool,
}

/// Database row for a catalog service
#[derive(Debug, sqlx::FromRow)]
struct ServiceItemRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    unit: sqlx::types::Json<Unit>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceItemRow> for ServiceItem {
    fn from(row: ServiceItemRow) -> Self {
        ServiceItem {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            unit: row.unit.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating or updating a catalog service
#[derive(Debug, Deserialize)]
pub struct ServiceItemInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub unit: Unit,
}

const SERVICE_COLUMNS: &str = "id, name, description, price, unit, created_at, updated_at";

impl ServiceItemService {
    /// Create a new ServiceItemService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn validate(input: &ServiceItemInput) -> AppResult<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Service name cannot be empty".to_string(),
                message_hr: "Naziv usluge ne smije biti prazan".to_string(),
            });
        }
        if input.price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: "Price cannot be negative".to_string(),
                message_hr: "Cijena ne smije biti negativna".to_string(),
            });
        }
        Ok(())
    }

    /// List all catalog services
    pub async fn list_services(&self) -> AppResult<Vec<ServiceItem>> {
        let rows = sqlx::query_as::<_, ServiceItemRow>(&format!(
            "SELECT {} FROM services ORDER BY name",
            SERVICE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ServiceItem::from).collect())
    }

    /// Get a catalog service by ID
    pub async fn get_service(&self, service_id: Uuid) -> AppResult<ServiceItem> {
        let row = sqlx::query_as::<_, ServiceItemRow>(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(service_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service".to_string()))?;

        Ok(row.into())
    }

    /// Create a catalog service
    pub async fn create_service(&self, input: ServiceItemInput) -> AppResult<ServiceItem> {
        Self::validate(&input)?;

        let row = sqlx::query_as::<_, ServiceItemRow>(&format!(
            r#"
            INSERT INTO services (name, description, price, unit)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(sqlx::types::Json(input.unit))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a catalog service
    pub async fn update_service(
        &self,
        service_id: Uuid,
        input: ServiceItemInput,
    ) -> AppResult<ServiceItem> {
        Self::validate(&input)?;

        let row = sqlx::query_as::<_, ServiceItemRow>(&format!(
            r#"
            UPDATE services
            SET name = $1, description = $2, price = $3, unit = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(sqlx::types::Json(input.unit))
        .bind(service_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service".to_string()))?;

        Ok(row.into())
    }

    /// Delete a catalog service
    pub async fn delete_service(&self, service_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(service_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service".to_string()));
        }

        Ok(())
    }
}
