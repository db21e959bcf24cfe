//! WebAssembly module for the Glass Workshop Management Platform
//!
//! Provides client-side computation for:
//! - Glass area and perimeter from mm inputs
//! - Live material requirement / shortfall preview in the order editor
//! - Quote totals
//! - Offline data validation (OIB, IBAN, dimensions)

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::stockflow::compute_requirements;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Calculate glass area in m² from mm dimensions
#[wasm_bindgen]
pub fn calculate_area_m2(width_mm: f64, height_mm: f64) -> f64 {
    (width_mm / 1000.0) * (height_mm / 1000.0)
}

/// Calculate glass perimeter in metres from mm dimensions
#[wasm_bindgen]
pub fn calculate_perimeter_m(width_mm: f64, height_mm: f64) -> f64 {
    2.0 * (width_mm + height_mm) / 1000.0
}

/// Compute the material requirements for a set of order lines against the
/// current inventory, for the shortfall preview in the order editor.
/// Inputs and output are JSON.
#[wasm_bindgen]
pub fn compute_material_requirements(
    items_json: &str,
    products_json: &str,
    inventory_json: &str,
) -> Result<String, JsValue> {
    let items: Vec<WorkOrderItem> = serde_json::from_str(items_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid items JSON: {}", e)))?;
    let products: Vec<Product> = serde_json::from_str(products_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid products JSON: {}", e)))?;
    let inventory: Vec<InventoryItem> = serde_json::from_str(inventory_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid inventory JSON: {}", e)))?;

    let requirements = compute_requirements(&items, &products, &inventory);
    serde_json::to_string(&requirements).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Compute quote totals (subtotal, VAT, total) from line items JSON
#[wasm_bindgen]
pub fn compute_quote_totals(items_json: &str, vat_rate: f64) -> Result<String, JsValue> {
    let items: Vec<WorkOrderItem> = serde_json::from_str(items_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid items JSON: {}", e)))?;
    let rate = Decimal::try_from(vat_rate)
        .map_err(|e| JsValue::from_str(&format!("Invalid VAT rate: {}", e)))?;

    let totals = compute_totals(&items, rate);
    serde_json::to_string(&totals).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Validate a Croatian OIB
#[wasm_bindgen]
pub fn is_valid_oib(oib: &str) -> bool {
    validate_oib(oib).is_ok()
}

/// Validate a Croatian IBAN
#[wasm_bindgen]
pub fn is_valid_hr_iban(iban: &str) -> bool {
    validate_hr_iban(iban).is_ok()
}

/// Validate glass dimensions in mm
#[wasm_bindgen]
pub fn are_valid_dimensions(width_mm: f64, height_mm: f64) -> bool {
    let Ok(width) = Decimal::try_from(width_mm) else {
        return false;
    };
    let Ok(height) = Decimal::try_from(height_mm) else {
        return false;
    };
    validate_dimensions(&Dimensions::new(width, height)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_calculation() {
        let area = calculate_area_m2(1000.0, 500.0);
        assert!((area - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_perimeter_calculation() {
        let perimeter = calculate_perimeter_m(1000.0, 500.0);
        assert!((perimeter - 3.0).abs() < 0.0001);
    }

    #[test]
    fn test_oib_validation() {
        assert!(is_valid_oib("12345678903"));
        assert!(!is_valid_oib("12345678901"));
    }

    #[test]
    fn test_iban_validation() {
        assert!(is_valid_hr_iban("HR1210010051863000160"));
        assert!(!is_valid_hr_iban("HR2210010051863000160"));
    }

    #[test]
    fn test_dimension_validation() {
        assert!(are_valid_dimensions(1000.0, 500.0));
        assert!(!are_valid_dimensions(0.0, 500.0));
        assert!(!are_valid_dimensions(-100.0, 500.0));
    }

    #[test]
    fn test_quote_totals_from_json() {
        let items = r#"[{
            "reference": {"type": "service", "service_id": null, "name": "Montaža"},
            "quantity": 2,
            "dimensions": {"width_mm": "0", "height_mm": "0"},
            "unit_price": "50.00",
            "materials": [],
            "notes": null
        }]"#;

        let totals_json = compute_quote_totals(items, 25.0).unwrap();
        let totals: QuoteTotals = serde_json::from_str(&totals_json).unwrap();
        assert_eq!(totals.subtotal, Decimal::from(100));
        assert_eq!(totals.vat_amount, Decimal::from(25));
        assert_eq!(totals.total, Decimal::from(125));
    }
}
