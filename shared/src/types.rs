//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Measurement units used for inventory and pricing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    SquareMeter,
    Piece,
    Kilogram,
    Meter,
}

impl Unit {
    pub fn code(&self) -> &'static str {
        match self {
            Unit::SquareMeter => "m2",
            Unit::Piece => "kom",
            Unit::Kilogram => "kg",
            Unit::Meter => "m",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::SquareMeter => write!(f, "m²"),
            Unit::Piece => write!(f, "kom"),
            Unit::Kilogram => write!(f, "kg"),
            Unit::Meter => write!(f, "m"),
        }
    }
}

/// Dimensions of a glass piece, entered in millimetres
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub width_mm: Decimal,
    pub height_mm: Decimal,
}

impl Dimensions {
    pub fn new(width_mm: Decimal, height_mm: Decimal) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Surface area in m². Always derived from the mm inputs, never stored.
    pub fn area_m2(&self) -> Decimal {
        let thousand = Decimal::from(1000);
        (self.width_mm / thousand) * (self.height_mm / thousand)
    }

    /// Perimeter in metres, used for edge processes priced per linear metre.
    pub fn perimeter_m(&self) -> Decimal {
        let thousand = Decimal::from(1000);
        Decimal::from(2) * (self.width_mm + self.height_mm) / thousand
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_area_from_mm() {
        let dims = Dimensions::new(dec("1000"), dec("500"));
        assert_eq!(dims.area_m2(), dec("0.5"));
    }

    #[test]
    fn test_area_square_metre() {
        let dims = Dimensions::new(dec("1000"), dec("1000"));
        assert_eq!(dims.area_m2(), Decimal::ONE);
    }

    #[test]
    fn test_area_zero_edge() {
        let dims = Dimensions::new(Decimal::ZERO, dec("800"));
        assert_eq!(dims.area_m2(), Decimal::ZERO);
    }

    #[test]
    fn test_perimeter() {
        let dims = Dimensions::new(dec("1000"), dec("500"));
        assert_eq!(dims.perimeter_m(), dec("3"));
    }

    #[test]
    fn test_unit_codes() {
        assert_eq!(Unit::SquareMeter.code(), "m2");
        assert_eq!(Unit::Piece.code(), "kom");
        assert_eq!(Unit::Kilogram.code(), "kg");
        assert_eq!(Unit::Meter.code(), "m");
    }
}
