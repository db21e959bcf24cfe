//! Route definitions for the Glass Workshop Management Platform

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Client management
        .nest("/clients", client_routes())
        // Product catalog
        .nest("/products", product_routes())
        // Production processes
        .nest("/processes", process_routes())
        // Inventory and stock ledger
        .nest("/inventory", inventory_routes())
        // Service catalog
        .nest("/services", service_routes())
        // Bank accounts
        .nest("/bank-accounts", bank_account_routes())
        // Quotes
        .nest("/quotes", quote_routes())
        // Work orders
        .nest("/work-orders", work_order_routes())
        // Delivery notes
        .nest("/delivery-notes", delivery_note_routes())
        // Printable documents
        .nest("/documents", document_routes())
}

/// Client management routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_clients).post(handlers::create_client))
        .route(
            "/:client_id",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

/// Production process routes
fn process_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_processes).post(handlers::create_process))
        .route(
            "/:process_id",
            get(handlers::get_process)
                .put(handlers::update_process)
                .delete(handlers::delete_process),
        )
}

/// Inventory routes: item master data, manual movements, ledger
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_inventory_items).post(handlers::create_inventory_item),
        )
        .route(
            "/:item_id",
            get(handlers::get_inventory_item)
                .put(handlers::update_inventory_item)
                .delete(handlers::delete_inventory_item),
        )
        .route("/:item_id/adjust", post(handlers::adjust_stock))
        .route("/:item_id/transactions", get(handlers::get_item_transactions))
        .route("/transactions/all", get(handlers::list_stock_transactions))
}

/// Service catalog routes
fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_services).post(handlers::create_service))
        .route(
            "/:service_id",
            get(handlers::get_service)
                .put(handlers::update_service)
                .delete(handlers::delete_service),
        )
}

/// Bank account routes
fn bank_account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_bank_accounts).post(handlers::create_bank_account),
        )
        .route(
            "/:account_id",
            get(handlers::get_bank_account)
                .put(handlers::update_bank_account)
                .delete(handlers::delete_bank_account),
        )
        .route("/:account_id/primary", put(handlers::set_primary_bank_account))
}

/// Quote routes
fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_quotes).post(handlers::create_quote))
        .route(
            "/:quote_id",
            get(handlers::get_quote)
                .put(handlers::update_quote)
                .delete(handlers::delete_quote),
        )
        .route("/:quote_id/status", put(handlers::set_quote_status))
        .route("/:quote_id/convert", post(handlers::convert_quote))
}

/// Work order routes: CRUD plus the material-flow operations
fn work_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_work_orders).post(handlers::create_work_order),
        )
        .route(
            "/:order_id",
            get(handlers::get_work_order)
                .put(handlers::update_work_order)
                .delete(handlers::delete_work_order),
        )
        .route("/:order_id/cancel", post(handlers::cancel_work_order))
        .route(
            "/:order_id/requirements",
            get(handlers::get_work_order_requirements),
        )
        .route("/:order_id/issue", post(handlers::issue_work_order))
        .route("/:order_id/archive", post(handlers::archive_work_order))
        .route(
            "/:order_id/process-completion",
            get(handlers::get_process_completion),
        )
        .route(
            "/:order_id/delivery-note",
            post(handlers::generate_delivery_note),
        )
        .route(
            "/:order_id/items/:item_index/materials/:material_index/steps/:step_index/status",
            put(handlers::update_step_status),
        )
}

/// Delivery note routes (created and archived through work orders)
fn delivery_note_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_delivery_notes))
        .route("/:note_id", get(handlers::get_delivery_note))
}

/// Printable document routes
fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/quotes/:quote_id", post(handlers::render_quote_pdf))
        .route("/work-orders/:order_id", post(handlers::render_work_order_pdf))
        .route(
            "/work-orders/:order_id/labels",
            post(handlers::render_glass_labels_pdf),
        )
        .route(
            "/delivery-notes/:note_id",
            post(handlers::render_delivery_note_pdf),
        )
}
