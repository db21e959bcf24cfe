//! Client management service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Client;
use shared::validation::{validate_email, validate_hr_phone, validate_oib};

/// Client service for managing workshop clients
#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

/// Database row for a client
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    oib: Option<String>,
    address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            oib: row.oib,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
            phone: row.phone,
            email: row.email,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a client
#[derive(Debug, Deserialize)]
pub struct CreateClientInput {
    pub name: String,
    pub oib: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a client
#[derive(Debug, Deserialize)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub oib: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

const CLIENT_COLUMNS: &str =
    "id, name, oib, address, city, postal_code, phone, email, notes, created_at, updated_at";

impl ClientService {
    /// Create a new ClientService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn validate_contact(
        oib: Option<&str>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<()> {
        if let Some(oib) = oib {
            validate_oib(oib).map_err(|e| AppError::Validation {
                field: "oib".to_string(),
                message: e.to_string(),
                message_hr: "OIB nije ispravan".to_string(),
            })?;
        }
        if let Some(phone) = phone {
            validate_hr_phone(phone).map_err(|e| AppError::Validation {
                field: "phone".to_string(),
                message: e.to_string(),
                message_hr: "Telefonski broj nije ispravan".to_string(),
            })?;
        }
        if let Some(email) = email {
            validate_email(email).map_err(|e| AppError::Validation {
                field: "email".to_string(),
                message: e.to_string(),
                message_hr: "E-mail adresa nije ispravna".to_string(),
            })?;
        }
        Ok(())
    }

    /// List all clients
    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients ORDER BY name",
            CLIENT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Get a client by ID
    pub async fn get_client(&self, client_id: Uuid) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(row.into())
    }

    /// Create a new client
    pub async fn create_client(&self, input: CreateClientInput) -> AppResult<Client> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Client name cannot be empty".to_string(),
                message_hr: "Naziv klijenta ne smije biti prazan".to_string(),
            });
        }
        Self::validate_contact(
            input.oib.as_deref(),
            input.phone.as_deref(),
            input.email.as_deref(),
        )?;

        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            INSERT INTO clients (name, oib, address, city, postal_code, phone, email, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.oib)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.postal_code)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a client
    pub async fn update_client(
        &self,
        client_id: Uuid,
        input: UpdateClientInput,
    ) -> AppResult<Client> {
        let existing = self.get_client(client_id).await?;

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Client name cannot be empty".to_string(),
                message_hr: "Naziv klijenta ne smije biti prazan".to_string(),
            });
        }

        let oib = input.oib.or(existing.oib);
        let phone = input.phone.or(existing.phone);
        let email = input.email.or(existing.email);
        Self::validate_contact(oib.as_deref(), phone.as_deref(), email.as_deref())?;

        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            UPDATE clients
            SET name = $1, oib = $2, address = $3, city = $4, postal_code = $5,
                phone = $6, email = $7, notes = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(&name)
        .bind(&oib)
        .bind(input.address.or(existing.address))
        .bind(input.city.or(existing.city))
        .bind(input.postal_code.or(existing.postal_code))
        .bind(&phone)
        .bind(&email)
        .bind(input.notes.or(existing.notes))
        .bind(client_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a client
    pub async fn delete_client(&self, client_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }

        Ok(())
    }
}
