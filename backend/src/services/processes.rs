//! Production process management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Pricing, Process};
use shared::validation::validate_glass_thickness;

/// Process service for the workshop's production operations
#[derive(Clone)]
pub struct ProcessService {
    db: PgPool,
}

/// Database row for a process
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProcessRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    sort_order: i32,
    estimated_duration_minutes: Option<i32>,
    pricing: sqlx::types::Json<Pricing>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProcessRow> for Process {
    fn from(row: ProcessRow) -> Self {
        Process {
            id: row.id,
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
            estimated_duration_minutes: row.estimated_duration_minutes,
            pricing: row.pricing.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating or updating a process
#[derive(Debug, Deserialize)]
pub struct ProcessInput {
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub estimated_duration_minutes: Option<i32>,
    pub pricing: Pricing,
}

pub(crate) const PROCESS_COLUMNS: &str =
    "id, name, description, sort_order, estimated_duration_minutes, pricing, created_at, updated_at";

impl ProcessService {
    /// Create a new ProcessService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn validate(input: &ProcessInput) -> AppResult<()> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Process name cannot be empty".to_string(),
                message_hr: "Naziv obrade ne smije biti prazan".to_string(),
            });
        }

        match &input.pricing {
            Pricing::Flat { rate, .. } => {
                if *rate < Decimal::ZERO {
                    return Err(AppError::Validation {
                        field: "pricing".to_string(),
                        message: "Rate cannot be negative".to_string(),
                        message_hr: "Cijena ne smije biti negativna".to_string(),
                    });
                }
            }
            Pricing::ByThickness { prices } => {
                if prices.is_empty() {
                    return Err(AppError::Validation {
                        field: "pricing".to_string(),
                        message: "Thickness price table cannot be empty".to_string(),
                        message_hr: "Cjenik po debljini ne smije biti prazan".to_string(),
                    });
                }
                for entry in prices {
                    validate_glass_thickness(entry.thickness_mm).map_err(|e| {
                        AppError::Validation {
                            field: "pricing".to_string(),
                            message: e.to_string(),
                            message_hr: "Debljina stakla nije ispravna".to_string(),
                        }
                    })?;
                    if entry.rate < Decimal::ZERO {
                        return Err(AppError::Validation {
                            field: "pricing".to_string(),
                            message: "Rate cannot be negative".to_string(),
                            message_hr: "Cijena ne smije biti negativna".to_string(),
                        });
                    }
                }
                let mut seen = Vec::new();
                for entry in prices {
                    if seen.contains(&entry.thickness_mm) {
                        return Err(AppError::Validation {
                            field: "pricing".to_string(),
                            message: "Duplicate thickness in price table".to_string(),
                            message_hr: "Debljina se ponavlja u cjeniku".to_string(),
                        });
                    }
                    seen.push(entry.thickness_mm);
                }
            }
        }

        Ok(())
    }

    /// List all processes in production order
    pub async fn list_processes(&self) -> AppResult<Vec<Process>> {
        let rows = sqlx::query_as::<_, ProcessRow>(&format!(
            "SELECT {} FROM processes ORDER BY sort_order, name",
            PROCESS_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Process::from).collect())
    }

    /// Get a process by ID
    pub async fn get_process(&self, process_id: Uuid) -> AppResult<Process> {
        let row = sqlx::query_as::<_, ProcessRow>(&format!(
            "SELECT {} FROM processes WHERE id = $1",
            PROCESS_COLUMNS
        ))
        .bind(process_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Process".to_string()))?;

        Ok(row.into())
    }

    /// Create a process
    pub async fn create_process(&self, input: ProcessInput) -> AppResult<Process> {
        Self::validate(&input)?;

        let row = sqlx::query_as::<_, ProcessRow>(&format!(
            r#"
            INSERT INTO processes (name, description, sort_order, estimated_duration_minutes, pricing)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PROCESS_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.sort_order)
        .bind(input.estimated_duration_minutes)
        .bind(sqlx::types::Json(&input.pricing))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a process
    pub async fn update_process(&self, process_id: Uuid, input: ProcessInput) -> AppResult<Process> {
        Self::validate(&input)?;

        let row = sqlx::query_as::<_, ProcessRow>(&format!(
            r#"
            UPDATE processes
            SET name = $1, description = $2, sort_order = $3,
                estimated_duration_minutes = $4, pricing = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            PROCESS_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.sort_order)
        .bind(input.estimated_duration_minutes)
        .bind(sqlx::types::Json(&input.pricing))
        .bind(process_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Process".to_string()))?;

        Ok(row.into())
    }

    /// Delete a process
    pub async fn delete_process(&self, process_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM processes WHERE id = $1")
            .bind(process_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Process".to_string()));
        }

        Ok(())
    }
}
