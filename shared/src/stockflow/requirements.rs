//! Material requirement calculation
//!
//! Computes, for a set of order line items, the aggregate quantity of each
//! distinct inventory item required: per (item, material) pair the
//! consumption is `quantity_per_unit × pieces × area`, summed per inventory
//! item across all lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{InventoryItem, LineRef, Product, WorkOrderItem};
use crate::types::Unit;

/// Display name used when a material references a deleted inventory item
pub const UNKNOWN_MATERIAL: &str = "Unknown material";

/// Aggregate requirement for one inventory item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialRequirement {
    pub inventory_item_id: Uuid,
    pub name: String,
    pub required: Decimal,
    /// Current on-hand stock; zero when the item no longer exists
    pub available: Decimal,
    pub unit: Unit,
    pub sufficient: bool,
}

/// One line's contribution to a requirement, kept for the ledger breakdown
#[derive(Debug, Clone)]
pub(crate) struct Contribution {
    pub line_name: String,
    pub pieces: i32,
    pub area_m2: Decimal,
    pub required: Decimal,
}

/// Running total per inventory item, in insertion order of first encounter
#[derive(Debug, Clone)]
pub(crate) struct RequirementAccum {
    pub inventory_item_id: Uuid,
    pub name: String,
    pub unit: Unit,
    pub available: Decimal,
    pub required: Decimal,
    pub contributions: Vec<Contribution>,
}

impl RequirementAccum {
    pub fn sufficient(&self) -> bool {
        self.available >= self.required
    }
}

pub(crate) fn aggregate_requirements(
    items: &[WorkOrderItem],
    products: &[Product],
    inventory: &[InventoryItem],
) -> Vec<RequirementAccum> {
    let mut accums: Vec<RequirementAccum> = Vec::new();

    for item in items {
        let area = item.dimensions.area_m2();
        if area <= Decimal::ZERO {
            continue;
        }

        // Product lines must still resolve to a product; service lines
        // contribute only when they carry materials of their own.
        if let LineRef::Product { product_id, .. } = &item.reference {
            if !products.iter().any(|p| p.id == *product_id) {
                continue;
            }
        }

        for material in &item.materials {
            let required = material.quantity_per_unit * Decimal::from(item.quantity) * area;

            let index = match accums
                .iter()
                .position(|a| a.inventory_item_id == material.inventory_item_id)
            {
                Some(existing) => existing,
                None => {
                    let stock = inventory
                        .iter()
                        .find(|i| i.id == material.inventory_item_id);
                    accums.push(RequirementAccum {
                        inventory_item_id: material.inventory_item_id,
                        name: stock
                            .map(|i| i.name.clone())
                            .unwrap_or_else(|| UNKNOWN_MATERIAL.to_string()),
                        unit: stock.map(|i| i.unit).unwrap_or(material.unit),
                        available: stock.map(|i| i.quantity).unwrap_or(Decimal::ZERO),
                        required: Decimal::ZERO,
                        contributions: Vec::new(),
                    });
                    accums.len() - 1
                }
            };

            let accum = &mut accums[index];
            accum.required += required;
            accum.contributions.push(Contribution {
                line_name: item.reference.name().to_string(),
                pieces: item.quantity,
                area_m2: area,
                required,
            });
        }
    }

    accums
}

/// Compute the aggregate material requirements for a set of order lines.
///
/// A material referencing a missing inventory item reports zero
/// availability, which fails the sufficiency check; issuance stays blocked
/// instead of silently ignoring the stale reference.
pub fn compute_requirements(
    items: &[WorkOrderItem],
    products: &[Product],
    inventory: &[InventoryItem],
) -> Vec<MaterialRequirement> {
    aggregate_requirements(items, products, inventory)
        .into_iter()
        .map(|accum| MaterialRequirement {
            sufficient: accum.sufficient(),
            inventory_item_id: accum.inventory_item_id,
            name: accum.name,
            required: accum.required,
            available: accum.available,
            unit: accum.unit,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemMaterial;
    use crate::types::Dimensions;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn inventory_item(id: Uuid, name: &str, quantity: &str) -> InventoryItem {
        InventoryItem {
            id,
            name: name.to_string(),
            code: "FLT-4".to_string(),
            unit: Unit::SquareMeter,
            quantity: dec(quantity),
            kind: None,
            glass_thickness_mm: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(id: Uuid) -> Product {
        Product {
            id,
            name: "Staklo 4mm".to_string(),
            code: "ST-4".to_string(),
            description: None,
            price: dec("20"),
            materials: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product_line(
        product_id: Uuid,
        inventory_item_id: Uuid,
        rate: &str,
        pieces: i32,
        width: &str,
        height: &str,
    ) -> WorkOrderItem {
        WorkOrderItem {
            reference: LineRef::Product {
                product_id,
                name: "Staklo 4mm".to_string(),
            },
            quantity: pieces,
            dimensions: Dimensions::new(dec(width), dec(height)),
            unit_price: dec("10"),
            materials: vec![ItemMaterial {
                inventory_item_id,
                name: "Float staklo 4mm".to_string(),
                quantity_per_unit: dec(rate),
                unit: Unit::SquareMeter,
                show_on_delivery_note: true,
                steps: vec![],
            }],
            notes: None,
        }
    }

    #[test]
    fn test_requirement_formula() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let inventory = vec![inventory_item(stock_id, "Float staklo 4mm", "100")];
        let products = vec![product(product_id)];
        // 0.5 per m², 2 pieces of 1000×500 (0.5 m² each): 0.5 × 2 × 0.5 = 0.5
        let items = vec![product_line(product_id, stock_id, "0.5", 2, "1000", "500")];

        let requirements = compute_requirements(&items, &products, &inventory);
        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].required, dec("0.5"));
        assert_eq!(requirements[0].available, dec("100"));
        assert!(requirements[0].sufficient);
    }

    #[test]
    fn test_aggregation_across_lines() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let inventory = vec![inventory_item(stock_id, "Float staklo 4mm", "10")];
        let products = vec![product(product_id)];
        let items = vec![
            product_line(product_id, stock_id, "1", 1, "1000", "1000"),
            product_line(product_id, stock_id, "1", 3, "1000", "500"),
        ];

        let requirements = compute_requirements(&items, &products, &inventory);
        assert_eq!(requirements.len(), 1);
        // 1×1×1 + 1×3×0.5 = 2.5
        assert_eq!(requirements[0].required, dec("2.5"));
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let inventory = vec![inventory_item(stock_id, "Float staklo 4mm", "10")];
        let products = vec![product(product_id)];
        let a = product_line(product_id, stock_id, "0.7", 2, "800", "600");
        let b = product_line(product_id, stock_id, "0.3", 5, "400", "400");

        let forward = compute_requirements(&[a.clone(), b.clone()], &products, &inventory);
        let reverse = compute_requirements(&[b, a], &products, &inventory);
        assert_eq!(forward[0].required, reverse[0].required);
    }

    #[test]
    fn test_equality_counts_as_sufficient() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let inventory = vec![inventory_item(stock_id, "Float staklo 4mm", "0.5")];
        let products = vec![product(product_id)];
        let items = vec![product_line(product_id, stock_id, "0.5", 2, "1000", "500")];

        let requirements = compute_requirements(&items, &products, &inventory);
        assert_eq!(requirements[0].required, requirements[0].available);
        assert!(requirements[0].sufficient);
    }

    #[test]
    fn test_missing_inventory_item_blocks() {
        let product_id = Uuid::new_v4();
        let products = vec![product(product_id)];
        let items = vec![product_line(
            product_id,
            Uuid::new_v4(),
            "0.5",
            1,
            "1000",
            "1000",
        )];

        let requirements = compute_requirements(&items, &products, &[]);
        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].name, UNKNOWN_MATERIAL);
        assert_eq!(requirements[0].available, Decimal::ZERO);
        assert!(!requirements[0].sufficient);
    }

    #[test]
    fn test_unresolved_product_line_is_skipped() {
        let stock_id = Uuid::new_v4();
        let inventory = vec![inventory_item(stock_id, "Float staklo 4mm", "10")];
        let items = vec![product_line(Uuid::new_v4(), stock_id, "1", 1, "1000", "1000")];

        let requirements = compute_requirements(&items, &[], &inventory);
        assert!(requirements.is_empty());
    }

    #[test]
    fn test_zero_area_line_is_skipped() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let inventory = vec![inventory_item(stock_id, "Float staklo 4mm", "10")];
        let products = vec![product(product_id)];
        let items = vec![product_line(product_id, stock_id, "1", 2, "0", "500")];

        let requirements = compute_requirements(&items, &products, &inventory);
        assert!(requirements.is_empty());
    }

    #[test]
    fn test_service_line_without_materials_contributes_nothing() {
        let items = vec![WorkOrderItem {
            reference: LineRef::Service {
                service_id: None,
                name: "Montaža".to_string(),
            },
            quantity: 1,
            dimensions: Dimensions::new(dec("1000"), dec("1000")),
            unit_price: dec("50"),
            materials: vec![],
            notes: None,
        }];

        let requirements = compute_requirements(&items, &[], &[]);
        assert!(requirements.is_empty());
    }

    #[test]
    fn test_service_line_with_materials_contributes() {
        let stock_id = Uuid::new_v4();
        let inventory = vec![inventory_item(stock_id, "Silikon", "5")];
        let items = vec![WorkOrderItem {
            reference: LineRef::Service {
                service_id: None,
                name: "Montaža".to_string(),
            },
            quantity: 1,
            dimensions: Dimensions::new(dec("2000"), dec("1000")),
            unit_price: dec("50"),
            materials: vec![ItemMaterial {
                inventory_item_id: stock_id,
                name: "Silikon".to_string(),
                quantity_per_unit: dec("0.2"),
                unit: Unit::SquareMeter,
                show_on_delivery_note: false,
                steps: vec![],
            }],
            notes: None,
        }];

        let requirements = compute_requirements(&items, &[], &inventory);
        assert_eq!(requirements.len(), 1);
        // 0.2 × 1 × 2.0 = 0.4
        assert_eq!(requirements[0].required, dec("0.4"));
    }
}
