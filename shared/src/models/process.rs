//! Production process models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Dimensions;

/// A production process the workshop performs (cutting, edging, tempering...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Position in the production sequence and in pickers
    pub sort_order: i32,
    pub estimated_duration_minutes: Option<i32>,
    pub pricing: Pricing,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How a process is priced. A process has exactly one pricing mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pricing {
    /// Single rate applied on the given basis
    Flat { rate: Decimal, basis: PriceBasis },
    /// Rate depends on the glass thickness of the processed piece
    ByThickness { prices: Vec<ThicknessPrice> },
}

/// Billing basis for a flat process rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    PerSquareMeter,
    PerLinearMeter,
    PerPiece,
    PerHour,
}

/// Price entry for one glass thickness
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThicknessPrice {
    pub thickness_mm: Decimal,
    pub rate: Decimal,
}

impl Process {
    /// Cost of applying this process to one piece of the given dimensions.
    /// Thickness-priced processes bill per m² at the thickness rate; hourly
    /// processes need an estimated duration to be priceable.
    pub fn cost_for_piece(
        &self,
        dimensions: &Dimensions,
        thickness_mm: Option<Decimal>,
    ) -> Option<Decimal> {
        match &self.pricing {
            Pricing::Flat { rate, basis } => match basis {
                PriceBasis::PerSquareMeter => Some(*rate * dimensions.area_m2()),
                PriceBasis::PerLinearMeter => Some(*rate * dimensions.perimeter_m()),
                PriceBasis::PerPiece => Some(*rate),
                PriceBasis::PerHour => self
                    .estimated_duration_minutes
                    .map(|minutes| *rate * Decimal::from(minutes) / Decimal::from(60)),
            },
            Pricing::ByThickness { .. } => self
                .pricing
                .rate_for(thickness_mm)
                .map(|rate| rate * dimensions.area_m2()),
        }
    }
}

impl Pricing {
    /// Resolve the applicable rate. Thickness-priced processes return the
    /// entry matching the piece's glass thickness, or nothing if the table
    /// has no such entry.
    pub fn rate_for(&self, thickness_mm: Option<Decimal>) -> Option<Decimal> {
        match self {
            Pricing::Flat { rate, .. } => Some(*rate),
            Pricing::ByThickness { prices } => {
                let thickness = thickness_mm?;
                prices
                    .iter()
                    .find(|p| p.thickness_mm == thickness)
                    .map(|p| p.rate)
            }
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
    fn test_flat_rate_ignores_thickness() {
        let pricing = Pricing::Flat {
            rate: dec("12.50"),
            basis: PriceBasis::PerSquareMeter,
        };
        assert_eq!(pricing.rate_for(None), Some(dec("12.50")));
        assert_eq!(pricing.rate_for(Some(dec("4"))), Some(dec("12.50")));
    }

    #[test]
    fn test_thickness_rate_lookup() {
        let pricing = Pricing::ByThickness {
            prices: vec![
                ThicknessPrice {
                    thickness_mm: dec("4"),
                    rate: dec("8.00"),
                },
                ThicknessPrice {
                    thickness_mm: dec("6"),
                    rate: dec("11.00"),
                },
            ],
        };
        assert_eq!(pricing.rate_for(Some(dec("6"))), Some(dec("11.00")));
        assert_eq!(pricing.rate_for(Some(dec("10"))), None);
        assert_eq!(pricing.rate_for(None), None);
    }

    fn process_with(pricing: Pricing, duration: Option<i32>) -> Process {
        Process {
            id: Uuid::nil(),
            name: "Brušenje rubova".to_string(),
            description: None,
            sort_order: 1,
            estimated_duration_minutes: duration,
            pricing,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cost_per_square_meter() {
        let process = process_with(
            Pricing::Flat {
                rate: dec("10"),
                basis: PriceBasis::PerSquareMeter,
            },
            None,
        );
        let dims = Dimensions::new(dec("1000"), dec("500"));
        assert_eq!(process.cost_for_piece(&dims, None), Some(dec("5")));
    }

    #[test]
    fn test_cost_per_linear_meter() {
        let process = process_with(
            Pricing::Flat {
                rate: dec("2"),
                basis: PriceBasis::PerLinearMeter,
            },
            None,
        );
        let dims = Dimensions::new(dec("1000"), dec("500"));
        assert_eq!(process.cost_for_piece(&dims, None), Some(dec("6")));
    }

    #[test]
    fn test_cost_per_hour_needs_duration() {
        let pricing = Pricing::Flat {
            rate: dec("30"),
            basis: PriceBasis::PerHour,
        };
        let dims = Dimensions::new(dec("1000"), dec("1000"));

        let unpriceable = process_with(pricing.clone(), None);
        assert_eq!(unpriceable.cost_for_piece(&dims, None), None);

        let priced = process_with(pricing, Some(30));
        assert_eq!(priced.cost_for_piece(&dims, None), Some(dec("15")));
    }

    #[test]
    fn test_cost_by_thickness_bills_area() {
        let process = process_with(
            Pricing::ByThickness {
                prices: vec![ThicknessPrice {
                    thickness_mm: dec("4"),
                    rate: dec("8"),
                }],
            },
            None,
        );
        let dims = Dimensions::new(dec("2000"), dec("1000"));
        assert_eq!(
            process.cost_for_piece(&dims, Some(dec("4"))),
            Some(dec("16"))
        );
        assert_eq!(process.cost_for_piece(&dims, Some(dec("6"))), None);
    }

    #[test]
    fn test_pricing_serde_tagged() {
        let pricing = Pricing::Flat {
            rate: dec("5"),
            basis: PriceBasis::PerPiece,
        };
        let json = serde_json::to_value(&pricing).unwrap();
        assert_eq!(json["mode"], "flat");
        assert_eq!(json["basis"], "per_piece");
    }
}
