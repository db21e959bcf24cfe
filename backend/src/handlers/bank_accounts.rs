//! HTTP handlers for bank account management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::bank_accounts::{BankAccountService, CreateBankAccountInput};
use crate::AppState;
use crate::models::BankAccount;

/// List all bank accounts
pub async fn list_bank_accounts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BankAccount>>> {
    let service = BankAccountService::new(state.db);
    let accounts = service.list_accounts().await?;
    Ok(Json(accounts))
}

/// Get a bank account
pub async fn get_bank_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<BankAccount>> {
    let service = BankAccountService::new(state.db);
    let account = service.get_account(account_id).await?;
    Ok(Json(account))
}

/// Create a bank account
pub async fn create_bank_account(
    State(state): State<AppState>,
    Json(input): Json<CreateBankAccountInput>,
) -> AppResult<impl IntoResponse> {
    let service = BankAccountService::new(state.db);
    let account = service.create_account(input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Update a bank account
pub async fn update_bank_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Json(input): Json<CreateBankAccountInput>,
) -> AppResult<Json<BankAccount>> {
    let service = BankAccountService::new(state.db);
    let account = service.update_account(account_id, input).await?;
    Ok(Json(account))
}

/// Make an account the primary one
pub async fn set_primary_bank_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<BankAccount>> {
    let service = BankAccountService::new(state.db);
    let account = service.set_primary(account_id).await?;
    Ok(Json(account))
}

/// Delete a bank account
pub async fn delete_bank_account(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = BankAccountService::new(state.db);
    service.delete_account(account_id).await?;
    Ok(Json(()))
}
