//! Bank account management service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::BankAccount;
use shared::validation::validate_hr_iban;

/// Bank account service for the accounts printed on quotes
#[derive(Clone)]
pub struct BankAccountService {
    db: PgPool,
}

/// Database row for a bank account
#[derive(Debug, sqlx::FromRow)]
struct BankAccountRow {
    id: Uuid,
    bank_name: String,
    iban: String,
    swift: Option<String>,
    is_primary: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BankAccountRow> for BankAccount {
    fn from(row: BankAccountRow) -> Self {
        BankAccount {
            id: row.id,
            bank_name: row.bank_name,
            iban: row.iban,
            swift: row.swift,
            is_primary: row.is_primary,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a bank account
#[derive(Debug, Deserialize)]
pub struct CreateBankAccountInput {
    pub bank_name: String,
    pub iban: String,
    pub swift: Option<String>,
    pub is_primary: Option<bool>,
}

const ACCOUNT_COLUMNS: &str = "id, bank_name, iban, swift, is_primary, created_at, updated_at";

impl BankAccountService {
    /// Create a new BankAccountService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all bank accounts, primary first
    pub async fn list_accounts(&self) -> AppResult<Vec<BankAccount>> {
        let rows = sqlx::query_as::<_, BankAccountRow>(&format!(
            "SELECT {} FROM bank_accounts ORDER BY is_primary DESC, bank_name",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(BankAccount::from).collect())
    }

    /// Get a bank account by ID
    pub async fn get_account(&self, account_id: Uuid) -> AppResult<BankAccount> {
        let row = sqlx::query_as::<_, BankAccountRow>(&format!(
            "SELECT {} FROM bank_accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bank account".to_string()))?;

        Ok(row.into())
    }

    /// Create a bank account. Marking it primary demotes the previous
    /// primary in the same transaction.
    pub async fn create_account(&self, input: CreateBankAccountInput) -> AppResult<BankAccount> {
        if input.bank_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "bank_name".to_string(),
                message: "Bank name cannot be empty".to_string(),
                message_hr: "Naziv banke ne smije biti prazan".to_string(),
            });
        }
        validate_hr_iban(&input.iban).map_err(|e| AppError::Validation {
            field: "iban".to_string(),
            message: e.to_string(),
            message_hr: "IBAN nije ispravan".to_string(),
        })?;

        let is_primary = input.is_primary.unwrap_or(false);

        let mut tx = self.db.begin().await?;

        if is_primary {
            sqlx::query("UPDATE bank_accounts SET is_primary = FALSE WHERE is_primary")
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, BankAccountRow>(&format!(
            r#"
            INSERT INTO bank_accounts (bank_name, iban, swift, is_primary)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(&input.bank_name)
        .bind(&input.iban)
        .bind(&input.swift)
        .bind(is_primary)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Update an account's bank data
    pub async fn update_account(
        &self,
        account_id: Uuid,
        input: CreateBankAccountInput,
    ) -> AppResult<BankAccount> {
        if input.bank_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "bank_name".to_string(),
                message: "Bank name cannot be empty".to_string(),
                message_hr: "Naziv banke ne smije biti prazan".to_string(),
            });
        }
        validate_hr_iban(&input.iban).map_err(|e| AppError::Validation {
            field: "iban".to_string(),
            message: e.to_string(),
            message_hr: "IBAN nije ispravan".to_string(),
        })?;

        let row = sqlx::query_as::<_, BankAccountRow>(&format!(
            r#"
            UPDATE bank_accounts
            SET bank_name = $1, iban = $2, swift = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(&input.bank_name)
        .bind(&input.iban)
        .bind(&input.swift)
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bank account".to_string()))?;

        Ok(row.into())
    }

    /// Make an account the primary one
    pub async fn set_primary(&self, account_id: Uuid) -> AppResult<BankAccount> {
        let mut tx = self.db.begin().await?;

        sqlx::query("UPDATE bank_accounts SET is_primary = FALSE WHERE is_primary")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, BankAccountRow>(&format!(
            r#"
            UPDATE bank_accounts SET is_primary = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Bank account".to_string()))?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Delete a bank account
    pub async fn delete_account(&self, account_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(account_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Bank account".to_string()));
        }

        Ok(())
    }
}
