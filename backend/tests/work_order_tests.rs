//! Work order material-flow tests
//!
//! Tests for the issuance, archival and dispatch engines:
//! - Requirement formula and aggregation
//! - Sufficiency gate (strict >= with equality sufficient)
//! - Issue/archive round trip restores stock exactly
//! - Draft archive and double-archive guards
//! - Delivery-note generation finalizes the order

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{
    InventoryItem, ItemMaterial, ItemProcessStep, LineRef, OrderStatus, Product, StepStatus,
    TransactionKind, WorkOrder, WorkOrderItem,
};
use shared::stockflow::{
    analyze_process_completion, compute_requirements, prepare_archive, prepare_dispatch,
    prepare_issue,
};
use shared::types::{Dimensions, Unit};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn inventory_item(id: Uuid, name: &str, quantity: Decimal) -> InventoryItem {
    let now = Utc::now();
    InventoryItem {
        id,
        name: name.to_string(),
        code: "FLT-4".to_string(),
        unit: Unit::SquareMeter,
        quantity,
        kind: None,
        glass_thickness_mm: Some(dec("4")),
        created_at: now,
        updated_at: now,
    }
}

fn product(id: Uuid, name: &str) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: name.to_string(),
        code: "ST-4".to_string(),
        description: None,
        price: dec("20"),
        materials: vec![],
        created_at: now,
        updated_at: now,
    }
}

fn product_line(
    product_id: Uuid,
    stock_id: Uuid,
    rate: Decimal,
    pieces: i32,
    width_mm: Decimal,
    height_mm: Decimal,
    steps: Vec<ItemProcessStep>,
) -> WorkOrderItem {
    WorkOrderItem {
        reference: LineRef::Product {
            product_id,
            name: "Staklo 4mm".to_string(),
        },
        quantity: pieces,
        dimensions: Dimensions::new(width_mm, height_mm),
        unit_price: dec("10"),
        materials: vec![ItemMaterial {
            inventory_item_id: stock_id,
            name: "Float staklo 4mm".to_string(),
            quantity_per_unit: rate,
            unit: Unit::SquareMeter,
            show_on_delivery_note: true,
            steps,
        }],
        notes: None,
    }
}

fn draft_order(items: Vec<WorkOrderItem>) -> WorkOrder {
    let now = Utc::now();
    WorkOrder {
        id: Uuid::new_v4(),
        order_number: "WO250307-000001".to_string(),
        client_id: Uuid::new_v4(),
        items,
        status: OrderStatus::Draft,
        notes: None,
        purchase_order: None,
        quote_id: None,
        quote_number: None,
        completion_reason: None,
        created_at: now,
        completed_at: None,
        updated_at: now,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario: product consuming 0.5 units/m², order of 2 pieces at
    /// 1000×500 mm (0.5 m² each), stock 100.
    /// Required = 0.5 × 2 × 0.5 = 0.5; after issue stock is 99.5.
    #[test]
    fn test_issue_scenario_glass_4mm() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let products = vec![product(product_id, "Glass 4mm")];
        let inventory = vec![inventory_item(stock_id, "Float glass", dec("100"))];
        let order = draft_order(vec![product_line(
            product_id,
            stock_id,
            dec("0.5"),
            2,
            dec("1000"),
            dec("500"),
            vec![],
        )]);

        let prep = prepare_issue(&order, &products, &inventory, Utc::now());

        assert!(prep.sufficient);
        assert_eq!(prep.requirements.len(), 1);
        assert_eq!(prep.requirements[0].required, dec("0.5"));
        assert_eq!(prep.updated_inventory[0].quantity, dec("99.5"));
        assert_eq!(prep.new_transactions.len(), 1);
        assert_eq!(prep.new_transactions[0].kind, TransactionKind::Out);
        assert_eq!(prep.new_transactions[0].quantity, dec("0.5"));
        assert_eq!(prep.updated_order.status, OrderStatus::Pending);
    }

    /// Scenario: same order, stock lowered to 0.3. Required 0.5 > 0.3:
    /// nothing changes, the order stays a draft.
    #[test]
    fn test_issue_scenario_insufficient() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let products = vec![product(product_id, "Glass 4mm")];
        let inventory = vec![inventory_item(stock_id, "Float glass", dec("0.3"))];
        let order = draft_order(vec![product_line(
            product_id,
            stock_id,
            dec("0.5"),
            2,
            dec("1000"),
            dec("500"),
            vec![],
        )]);

        let prep = prepare_issue(&order, &products, &inventory, Utc::now());

        assert!(!prep.sufficient);
        assert!(prep.new_transactions.is_empty());
        assert_eq!(prep.updated_inventory, inventory);
        assert_eq!(prep.updated_order.status, OrderStatus::Draft);
    }

    /// Scenario: issue then archive. Stock 100 → 99.5 → 100, one `return`
    /// entry of 0.5, order archived.
    #[test]
    fn test_issue_then_archive_round_trip() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let products = vec![product(product_id, "Glass 4mm")];
        let inventory = vec![inventory_item(stock_id, "Float glass", dec("100"))];
        let order = draft_order(vec![product_line(
            product_id,
            stock_id,
            dec("0.5"),
            2,
            dec("1000"),
            dec("500"),
            vec![],
        )]);

        let issued = prepare_issue(&order, &products, &inventory, Utc::now());
        assert_eq!(issued.updated_inventory[0].quantity, dec("99.5"));

        let archived = prepare_archive(
            &issued.updated_order,
            &issued.new_transactions,
            &issued.updated_inventory,
            None,
            None,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(archived.updated_inventory[0].quantity, dec("100.0"));
        assert_eq!(archived.new_transactions.len(), 1);
        assert_eq!(archived.new_transactions[0].kind, TransactionKind::Return);
        assert_eq!(archived.new_transactions[0].quantity, dec("0.5"));
        assert_eq!(archived.updated_order.status, OrderStatus::Archived);
    }

    /// The out and return entries for each item net to zero
    #[test]
    fn test_round_trip_ledger_nets_to_zero() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let products = vec![product(product_id, "Glass 4mm")];
        let inventory = vec![inventory_item(stock_id, "Float glass", dec("50"))];
        let order = draft_order(vec![
            product_line(product_id, stock_id, dec("1"), 1, dec("1000"), dec("1000"), vec![]),
            product_line(product_id, stock_id, dec("1"), 4, dec("500"), dec("500"), vec![]),
        ]);

        let issued = prepare_issue(&order, &products, &inventory, Utc::now());
        let archived = prepare_archive(
            &issued.updated_order,
            &issued.new_transactions,
            &issued.updated_inventory,
            None,
            None,
            Utc::now(),
        )
        .unwrap();

        let net: Decimal = issued
            .new_transactions
            .iter()
            .map(|t| -t.quantity)
            .chain(archived.new_transactions.iter().map(|t| t.quantity))
            .sum();

        assert_eq!(net, Decimal::ZERO);
        assert_eq!(archived.updated_inventory[0].quantity, dec("50"));
    }

    /// Archiving a draft flips the status and touches nothing else
    #[test]
    fn test_archive_draft_no_credit() {
        let order = draft_order(vec![]);
        let stock_id = Uuid::new_v4();
        let inventory = vec![inventory_item(stock_id, "Float glass", dec("10"))];

        let prep = prepare_archive(&order, &[], &inventory, None, None, Utc::now()).unwrap();

        assert!(prep.new_transactions.is_empty());
        assert_eq!(prep.updated_inventory, inventory);
        assert_eq!(prep.updated_order.status, OrderStatus::Archived);
    }

    /// Archiving twice is rejected before any side effect
    #[test]
    fn test_double_archive_rejected() {
        let mut order = draft_order(vec![]);
        order.status = OrderStatus::Archived;

        assert!(prepare_archive(&order, &[], &[], None, None, Utc::now()).is_err());
    }

    /// Scenario: 3 of 5 steps incomplete. The analysis reports them without
    /// writes; dispatch completes all 5 and the order.
    #[test]
    fn test_dispatch_scenario_incomplete_steps() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let step = |status| ItemProcessStep {
            process_id: Uuid::new_v4(),
            mandatory: false,
            status,
            completed_at: None,
        };

        let mut order = draft_order(vec![
            product_line(
                product_id,
                stock_id,
                dec("1"),
                1,
                dec("1000"),
                dec("1000"),
                vec![
                    step(StepStatus::Completed),
                    step(StepStatus::Pending),
                    step(StepStatus::InProgress),
                ],
            ),
            product_line(
                product_id,
                stock_id,
                dec("1"),
                1,
                dec("1000"),
                dec("1000"),
                vec![step(StepStatus::Completed), step(StepStatus::Pending)],
            ),
        ]);
        order.status = OrderStatus::InProgress;

        let report = analyze_process_completion(&order);
        assert_eq!(report.total_incomplete, 3);
        assert_eq!(report.all_processes, 5);

        let prep = prepare_dispatch(&order, "DN250307-000099", Utc::now()).unwrap();
        assert_eq!(prep.updated_order.status, OrderStatus::Completed);
        for (_, _, step) in prep.updated_order.all_steps() {
            assert_eq!(step.status, StepStatus::Completed);
        }
        assert_eq!(analyze_process_completion(&prep.updated_order).total_incomplete, 0);
    }

    /// A delivery note cannot be generated for a draft
    #[test]
    fn test_dispatch_rejects_draft() {
        let order = draft_order(vec![]);
        assert!(prepare_dispatch(&order, "DN250307-000099", Utc::now()).is_err());
    }

    /// Equality of stock and requirement still issues
    #[test]
    fn test_exact_stock_is_sufficient() {
        let product_id = Uuid::new_v4();
        let stock_id = Uuid::new_v4();
        let products = vec![product(product_id, "Glass 4mm")];
        let inventory = vec![inventory_item(stock_id, "Float glass", dec("0.5"))];
        let order = draft_order(vec![product_line(
            product_id,
            stock_id,
            dec("0.5"),
            2,
            dec("1000"),
            dec("500"),
            vec![],
        )]);

        let prep = prepare_issue(&order, &products, &inventory, Utc::now());

        assert!(prep.sufficient);
        assert_eq!(prep.updated_inventory[0].quantity, Decimal::ZERO);
    }

    /// A material referencing missing stock blocks the whole issuance
    #[test]
    fn test_unknown_material_blocks_issue() {
        let product_id = Uuid::new_v4();
        let products = vec![product(product_id, "Glass 4mm")];
        let order = draft_order(vec![product_line(
            product_id,
            Uuid::new_v4(),
            dec("0.5"),
            1,
            dec("1000"),
            dec("1000"),
            vec![],
        )]);

        let prep = prepare_issue(&order, &products, &[], Utc::now());

        assert!(!prep.sufficient);
        assert_eq!(prep.requirements[0].name, "Unknown material");
        assert_eq!(prep.requirements[0].available, Decimal::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for consumption rates (0.01 to 10.00 per m²)
    fn rate_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for piece counts
    fn pieces_strategy() -> impl Strategy<Value = i32> {
        1i32..=20
    }

    /// Strategy for dimensions in mm (100 to 3000)
    fn dimension_strategy() -> impl Strategy<Value = Decimal> {
        (100i64..=3000i64).prop_map(Decimal::from)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// required = rate × pieces × area, for a single line
        #[test]
        fn prop_requirement_formula(
            rate in rate_strategy(),
            pieces in pieces_strategy(),
            width in dimension_strategy(),
            height in dimension_strategy()
        ) {
            let product_id = Uuid::new_v4();
            let stock_id = Uuid::new_v4();
            let products = vec![product(product_id, "Glass")];
            let inventory = vec![inventory_item(stock_id, "Float glass", dec("1000000"))];
            let items = vec![product_line(product_id, stock_id, rate, pieces, width, height, vec![])];

            let requirements = compute_requirements(&items, &products, &inventory);

            let area = (width / Decimal::from(1000)) * (height / Decimal::from(1000));
            let expected = rate * Decimal::from(pieces) * area;
            prop_assert_eq!(requirements[0].required, expected);
        }

        /// Aggregation over lines equals the sum of per-line requirements,
        /// independent of line order
        #[test]
        fn prop_aggregation_order_independent(
            rates in prop::collection::vec(rate_strategy(), 2..6),
            pieces in prop::collection::vec(pieces_strategy(), 2..6)
        ) {
            let len = rates.len().min(pieces.len());
            let product_id = Uuid::new_v4();
            let stock_id = Uuid::new_v4();
            let products = vec![product(product_id, "Glass")];
            let inventory = vec![inventory_item(stock_id, "Float glass", dec("1000000"))];

            let lines: Vec<WorkOrderItem> = (0..len)
                .map(|i| product_line(
                    product_id, stock_id, rates[i], pieces[i], dec("1000"), dec("1000"), vec![],
                ))
                .collect();
            let mut reversed = lines.clone();
            reversed.reverse();

            let forward = compute_requirements(&lines, &products, &inventory);
            let backward = compute_requirements(&reversed, &products, &inventory);

            prop_assert_eq!(forward[0].required, backward[0].required);

            let expected: Decimal = (0..len)
                .map(|i| rates[i] * Decimal::from(pieces[i]))
                .sum();
            prop_assert_eq!(forward[0].required, expected);
        }

        /// sufficient is exactly available >= required
        #[test]
        fn prop_sufficiency_boundary(
            required in rate_strategy(),
            offset in (-500i64..=500i64).prop_map(|n| Decimal::new(n, 2))
        ) {
            let product_id = Uuid::new_v4();
            let stock_id = Uuid::new_v4();
            let available = required + offset;
            let products = vec![product(product_id, "Glass")];
            let inventory = vec![inventory_item(stock_id, "Float glass", available)];
            // 1 piece of 1 m²: required equals the rate
            let items = vec![product_line(
                product_id, stock_id, required, 1, dec("1000"), dec("1000"), vec![],
            )];

            let requirements = compute_requirements(&items, &products, &inventory);

            prop_assert_eq!(requirements[0].sufficient, available >= required);
        }

        /// Issue then archive restores every touched item exactly
        #[test]
        fn prop_round_trip_restores_stock(
            rate in rate_strategy(),
            pieces in pieces_strategy(),
            stock in (1000i64..=100000i64).prop_map(|n| Decimal::new(n, 1))
        ) {
            let product_id = Uuid::new_v4();
            let stock_id = Uuid::new_v4();
            let products = vec![product(product_id, "Glass")];
            let inventory = vec![inventory_item(stock_id, "Float glass", stock)];
            let order = draft_order(vec![product_line(
                product_id, stock_id, rate, pieces, dec("1000"), dec("1000"), vec![],
            )]);

            let issued = prepare_issue(&order, &products, &inventory, Utc::now());
            prop_assume!(issued.sufficient);

            let archived = prepare_archive(
                &issued.updated_order,
                &issued.new_transactions,
                &issued.updated_inventory,
                None,
                None,
                Utc::now(),
            ).unwrap();

            prop_assert_eq!(archived.updated_inventory[0].quantity, stock);
        }

        /// Issuance never persists anything when any material is short
        #[test]
        fn prop_insufficient_issue_is_inert(
            rate in rate_strategy(),
            pieces in pieces_strategy()
        ) {
            let product_id = Uuid::new_v4();
            let stock_id = Uuid::new_v4();
            let required = rate * Decimal::from(pieces);
            // Stock strictly below the requirement
            let stock = required - Decimal::new(1, 2);
            prop_assume!(stock >= Decimal::ZERO);

            let products = vec![product(product_id, "Glass")];
            let inventory = vec![inventory_item(stock_id, "Float glass", stock)];
            let order = draft_order(vec![product_line(
                product_id, stock_id, rate, pieces, dec("1000"), dec("1000"), vec![],
            )]);

            let prep = prepare_issue(&order, &products, &inventory, Utc::now());

            prop_assert!(!prep.sufficient);
            prop_assert!(prep.new_transactions.is_empty());
            prop_assert_eq!(&prep.updated_inventory, &inventory);
            prop_assert_eq!(prep.updated_order.status, OrderStatus::Draft);
        }

        /// Every ledger entry keeps previous + signed delta = new
        #[test]
        fn prop_ledger_entries_consistent(
            rate in rate_strategy(),
            pieces in pieces_strategy(),
            stock in (100000i64..=1000000i64).prop_map(|n| Decimal::new(n, 1))
        ) {
            let product_id = Uuid::new_v4();
            let stock_id = Uuid::new_v4();
            let products = vec![product(product_id, "Glass")];
            let inventory = vec![inventory_item(stock_id, "Float glass", stock)];
            let order = draft_order(vec![product_line(
                product_id, stock_id, rate, pieces, dec("1000"), dec("1000"), vec![],
            )]);

            let issued = prepare_issue(&order, &products, &inventory, Utc::now());
            prop_assume!(issued.sufficient);

            for tx in &issued.new_transactions {
                prop_assert_eq!(tx.previous_quantity - tx.quantity, tx.new_quantity);
            }

            let archived = prepare_archive(
                &issued.updated_order,
                &issued.new_transactions,
                &issued.updated_inventory,
                None,
                None,
                Utc::now(),
            ).unwrap();

            for tx in &archived.new_transactions {
                prop_assert_eq!(tx.previous_quantity + tx.quantity, tx.new_quantity);
            }
        }
    }
}
