//! Validation utilities for the Glass Workshop Management Platform
//!
//! Includes Croatia-specific validations for tax and payment identifiers.

use rust_decimal::Decimal;

use crate::types::Dimensions;

// ============================================================================
// Order Input Validations
// ============================================================================

/// Validate glass dimensions: both sides positive, within cutting-table range
pub fn validate_dimensions(dimensions: &Dimensions) -> Result<(), &'static str> {
    if dimensions.width_mm <= Decimal::ZERO || dimensions.height_mm <= Decimal::ZERO {
        return Err("Dimensions must be positive");
    }
    let max_mm = Decimal::from(6000);
    if dimensions.width_mm > max_mm || dimensions.height_mm > max_mm {
        return Err("Dimensions exceed maximum sheet size (6000 mm)");
    }
    Ok(())
}

/// Validate a piece count for an order line
pub fn validate_piece_count(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be at least 1");
    }
    Ok(())
}

/// Validate a stock quantity entered by hand (receipts, adjustments)
pub fn validate_stock_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate glass thickness in millimetres (common float glass range)
pub fn validate_glass_thickness(thickness_mm: Decimal) -> Result<(), &'static str> {
    if thickness_mm <= Decimal::ZERO {
        return Err("Thickness must be positive");
    }
    if thickness_mm > Decimal::from(50) {
        return Err("Thickness exceeds maximum (50 mm)");
    }
    Ok(())
}

/// Validate a VAT rate percentage
pub fn validate_vat_rate(rate: Decimal) -> Result<(), &'static str> {
    if rate < Decimal::ZERO || rate > Decimal::from(100) {
        return Err("VAT rate must be between 0 and 100");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate product/inventory code format (2-16 uppercase alphanumeric, dashes allowed)
pub fn validate_item_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 2 {
        return Err("Code must be at least 2 characters");
    }
    if code.len() > 16 {
        return Err("Code must be at most 16 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Code must be uppercase alphanumeric");
    }
    Ok(())
}

// ============================================================================
// Croatia-Specific Validations
// ============================================================================

/// Validate a Croatian OIB (osobni identifikacijski broj)
/// 11-digit number with an ISO 7064 MOD 11,10 check digit
pub fn validate_oib(oib: &str) -> Result<(), &'static str> {
    let digits: String = oib.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 11 {
        return Err("OIB must be 11 digits");
    }

    let chars: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    let mut acc: u32 = 10;
    for &digit in chars.iter().take(10) {
        acc = (acc + digit) % 10;
        if acc == 0 {
            acc = 10;
        }
        acc = (acc * 2) % 11;
    }

    let mut check = 11 - acc;
    if check == 10 {
        check = 0;
    }

    if check != chars[10] {
        return Err("Invalid OIB checksum");
    }

    Ok(())
}

/// Validate a Croatian IBAN
/// Format: HR + 2 check digits + 17 digits, verified with the mod-97 rule
pub fn validate_hr_iban(iban: &str) -> Result<(), &'static str> {
    let cleaned: String = iban.chars().filter(|c| !c.is_whitespace()).collect();

    if !cleaned.is_ascii() || cleaned.len() != 21 {
        return Err("Croatian IBAN must be 21 characters");
    }
    if !cleaned.starts_with("HR") {
        return Err("Croatian IBAN must start with HR");
    }
    if !cleaned[2..].chars().all(|c| c.is_ascii_digit()) {
        return Err("IBAN must be digits after the country code");
    }

    // Rearrange and expand letters per ISO 13616, then mod-97
    let rearranged = format!("{}{}", &cleaned[4..], &cleaned[..4]);
    let mut remainder: u64 = 0;
    for c in rearranged.chars() {
        let value = if c.is_ascii_digit() {
            c.to_digit(10).unwrap() as u64
        } else {
            (c as u64) - ('A' as u64) + 10
        };
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }

    if remainder != 1 {
        return Err("Invalid IBAN checksum");
    }

    Ok(())
}

/// Validate a Croatian phone number
/// Accepts: 0912345678, 091-234-5678, +385912345678
pub fn validate_hr_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Domestic format: 9-10 digits starting with 0
    if (digits.len() == 9 || digits.len() == 10) && digits.starts_with('0') {
        return Ok(());
    }
    // International format with country code 385
    if (digits.len() == 11 || digits.len() == 12) && digits.starts_with("385") {
        return Ok(());
    }

    Err("Invalid Croatian phone number format")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ========================================================================
    // Order Input Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_dimensions_valid() {
        let dims = Dimensions::new(dec("1000"), dec("500"));
        assert!(validate_dimensions(&dims).is_ok());
    }

    #[test]
    fn test_validate_dimensions_zero() {
        let dims = Dimensions::new(Decimal::ZERO, dec("500"));
        assert!(validate_dimensions(&dims).is_err());
    }

    #[test]
    fn test_validate_dimensions_negative() {
        let dims = Dimensions::new(dec("-100"), dec("500"));
        assert!(validate_dimensions(&dims).is_err());
    }

    #[test]
    fn test_validate_dimensions_oversize() {
        let dims = Dimensions::new(dec("6500"), dec("500"));
        assert!(validate_dimensions(&dims).is_err());
    }

    #[test]
    fn test_validate_piece_count() {
        assert!(validate_piece_count(1).is_ok());
        assert!(validate_piece_count(50).is_ok());
        assert!(validate_piece_count(0).is_err());
        assert!(validate_piece_count(-3).is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(dec("0.5")).is_ok());
        assert!(validate_stock_quantity(Decimal::ZERO).is_err());
        assert!(validate_stock_quantity(dec("-1")).is_err());
    }

    #[test]
    fn test_validate_glass_thickness() {
        assert!(validate_glass_thickness(dec("4")).is_ok());
        assert!(validate_glass_thickness(dec("19")).is_ok());
        assert!(validate_glass_thickness(Decimal::ZERO).is_err());
        assert!(validate_glass_thickness(dec("60")).is_err());
    }

    #[test]
    fn test_validate_vat_rate() {
        assert!(validate_vat_rate(dec("25")).is_ok());
        assert!(validate_vat_rate(Decimal::ZERO).is_ok());
        assert!(validate_vat_rate(dec("-5")).is_err());
        assert!(validate_vat_rate(dec("101")).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("ured@staklarstvo.hr").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_item_code_valid() {
        assert!(validate_item_code("FLT-4").is_ok());
        assert!(validate_item_code("LAM33-1").is_ok());
    }

    #[test]
    fn test_validate_item_code_invalid() {
        assert!(validate_item_code("F").is_err()); // Too short
        assert!(validate_item_code("ABCDEFGHIJKLMNOPQ").is_err()); // Too long
        assert!(validate_item_code("flt-4").is_err()); // Lowercase
        assert!(validate_item_code("FLT 4").is_err()); // Space
    }

    // ========================================================================
    // Croatia-Specific Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_oib_valid() {
        assert!(validate_oib("12345678903").is_ok());
        assert!(validate_oib("00000000001").is_ok());
        assert!(validate_oib("69435151530").is_ok());
        assert!(validate_oib("98765432106").is_ok());
    }

    #[test]
    fn test_validate_oib_invalid() {
        // Wrong checksum
        assert!(validate_oib("12345678901").is_err());
        // Wrong length
        assert!(validate_oib("123456789").is_err());
        assert!(validate_oib("123456789012").is_err());
    }

    #[test]
    fn test_validate_hr_iban_valid() {
        assert!(validate_hr_iban("HR1210010051863000160").is_ok());
        // With spaces, as banks print them
        assert!(validate_hr_iban("HR12 1001 0051 8630 0016 0").is_ok());
    }

    #[test]
    fn test_validate_hr_iban_invalid() {
        // Corrupted check digits
        assert!(validate_hr_iban("HR2210010051863000160").is_err());
        // Wrong country
        assert!(validate_hr_iban("DE1210010051863000160").is_err());
        // Wrong length
        assert!(validate_hr_iban("HR121001005186300016").is_err());
    }

    #[test]
    fn test_validate_hr_phone_valid() {
        assert!(validate_hr_phone("0912345678").is_ok());
        assert!(validate_hr_phone("091-234-5678").is_ok());
        assert!(validate_hr_phone("+385912345678").is_ok());
        assert!(validate_hr_phone("385912345678").is_ok());
    }

    #[test]
    fn test_validate_hr_phone_invalid() {
        assert!(validate_hr_phone("12345").is_err());
        assert!(validate_hr_phone("abcdefghij").is_err());
        assert!(validate_hr_phone("1234567890123").is_err());
    }
}
