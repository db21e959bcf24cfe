//! Quote tests
//!
//! Tests for quote totals, status lifecycle and document number formats.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{
    compute_totals, format_delivery_number, format_order_number, format_quote_number, LineRef,
    QuoteStatus, WorkOrderItem,
};
use shared::types::Dimensions;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn line(unit_price: Decimal, quantity: i32) -> WorkOrderItem {
    WorkOrderItem {
        reference: LineRef::Service {
            service_id: None,
            name: "Usluga".to_string(),
        },
        quantity,
        dimensions: Dimensions::new(Decimal::ZERO, Decimal::ZERO),
        unit_price,
        materials: vec![],
        notes: None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_totals_with_croatian_vat() {
        let items = vec![line(dec("100.00"), 1), line(dec("25.50"), 2)];
        let totals = compute_totals(&items, dec("25"));

        assert_eq!(totals.subtotal, dec("151.00"));
        assert_eq!(totals.vat_amount, dec("37.75"));
        assert_eq!(totals.total, dec("188.75"));
    }

    #[test]
    fn test_totals_zero_vat() {
        let items = vec![line(dec("80.00"), 1)];
        let totals = compute_totals(&items, Decimal::ZERO);

        assert_eq!(totals.vat_amount, Decimal::ZERO);
        assert_eq!(totals.total, totals.subtotal);
    }

    #[test]
    fn test_quote_lifecycle() {
        assert!(QuoteStatus::Draft.can_transition_to(QuoteStatus::Sent));
        assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Accepted));
        assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Rejected));
        assert!(QuoteStatus::Accepted.can_transition_to(QuoteStatus::Converted));

        // No shortcuts or reversals
        assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Accepted));
        assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Converted));
        assert!(!QuoteStatus::Accepted.can_transition_to(QuoteStatus::Sent));
        assert!(!QuoteStatus::Converted.can_transition_to(QuoteStatus::Accepted));
    }

    #[test]
    fn test_archived_quote_is_terminal() {
        for status in [
            QuoteStatus::Draft,
            QuoteStatus::Sent,
            QuoteStatus::Accepted,
            QuoteStatus::Rejected,
            QuoteStatus::Converted,
        ] {
            assert!(status.can_transition_to(QuoteStatus::Archived));
        }
        assert!(!QuoteStatus::Archived.can_transition_to(QuoteStatus::Draft));
    }

    #[test]
    fn test_document_number_formats() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 6).unwrap();

        assert_eq!(format_order_number(date, 123456), "WO250806-123456");
        assert_eq!(format_quote_number(date, 42), "QT-250806-0042");
        assert_eq!(format_delivery_number(date, 7), "DN250806-000007");
    }

    #[test]
    fn test_number_suffixes_wrap() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        // Suffixes keep their fixed width even when the input overflows it
        assert_eq!(format_quote_number(date, 123456), "QT-250101-3456");
        assert_eq!(format_order_number(date, 10_000_000), "WO250101-000000");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// total = subtotal + vat, and vat = subtotal × rate / 100
        #[test]
        fn prop_totals_consistent(
            prices in prop::collection::vec(price_strategy(), 1..10),
            vat_rate in (0i64..=100i64).prop_map(Decimal::from)
        ) {
            let items: Vec<WorkOrderItem> =
                prices.iter().map(|p| line(*p, 1)).collect();

            let totals = compute_totals(&items, vat_rate);

            prop_assert_eq!(totals.total, totals.subtotal + totals.vat_amount);
            prop_assert_eq!(
                totals.vat_amount,
                totals.subtotal * vat_rate / Decimal::from(100)
            );
        }

        /// Subtotal scales linearly with quantity
        #[test]
        fn prop_subtotal_scales_with_quantity(
            price in price_strategy(),
            quantity in 1i32..=50
        ) {
            let single = compute_totals(&[line(price, 1)], Decimal::ZERO);
            let multiple = compute_totals(&[line(price, quantity)], Decimal::ZERO);

            prop_assert_eq!(
                multiple.subtotal,
                single.subtotal * Decimal::from(quantity)
            );
        }

        /// Totals are permutation-invariant
        #[test]
        fn prop_totals_order_independent(
            prices in prop::collection::vec(price_strategy(), 2..8)
        ) {
            let items: Vec<WorkOrderItem> = prices.iter().map(|p| line(*p, 1)).collect();
            let mut reversed = items.clone();
            reversed.reverse();

            let forward = compute_totals(&items, dec("25"));
            let backward = compute_totals(&reversed, dec("25"));

            prop_assert_eq!(forward.subtotal, backward.subtotal);
            prop_assert_eq!(forward.total, backward.total);
        }
    }
}
