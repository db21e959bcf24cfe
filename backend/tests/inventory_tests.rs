//! Inventory ledger tests
//!
//! Tests for stock transaction bookkeeping:
//! - Ledger arithmetic (previous + signed delta = new)
//! - Transaction kind semantics
//! - Balance reconstruction from the ledger

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::TransactionKind;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Signed delta a ledger entry applies to the stock quantity
fn signed_delta(kind: TransactionKind, quantity: Decimal) -> Decimal {
    Decimal::from(kind.signum()) * quantity
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_transaction_kinds() {
        let kinds = ["out", "return", "receipt", "adjustment"];

        for kind in kinds {
            assert_eq!(TransactionKind::parse(kind).unwrap().as_str(), kind);
        }
        assert!(TransactionKind::parse("transfer").is_none());
    }

    #[test]
    fn test_out_reduces_stock() {
        let balance = dec("100.0");
        let after = balance + signed_delta(TransactionKind::Out, dec("30.0"));
        assert_eq!(after, dec("70.0"));
    }

    #[test]
    fn test_return_credits_stock() {
        let balance = dec("70.0");
        let after = balance + signed_delta(TransactionKind::Return, dec("30.0"));
        assert_eq!(after, dec("100.0"));
    }

    #[test]
    fn test_balance_from_ledger() {
        let movements = vec![
            (TransactionKind::Receipt, dec("50.0")),
            (TransactionKind::Out, dec("20.0")),
            (TransactionKind::Receipt, dec("10.0")),
            (TransactionKind::Out, dec("15.0")),
            (TransactionKind::Return, dec("5.0")),
        ];

        let balance: Decimal = movements
            .iter()
            .fold(Decimal::ZERO, |acc, (kind, qty)| {
                acc + signed_delta(*kind, *qty)
            });

        // 50 - 20 + 10 - 15 + 5 = 30
        assert_eq!(balance, dec("30.0"));
    }

    #[test]
    fn test_zero_balance_after_full_consumption() {
        let balance = dec("12.5");
        let after = balance + signed_delta(TransactionKind::Out, dec("12.5"));
        assert_eq!(after, Decimal::ZERO);
    }

    #[test]
    fn test_shortfall_detection() {
        let available = dec("50.0");
        let required = dec("60.0");

        assert!(available < required);
        assert!(available >= dec("50.0")); // Equality stays sufficient
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for positive quantities (0.1 to 1000.0)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for transaction kinds
    fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
        prop_oneof![
            Just(TransactionKind::Out),
            Just(TransactionKind::Return),
            Just(TransactionKind::Receipt),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Balance equals the fold of signed deltas, independent of how the
        /// movements are grouped
        #[test]
        fn prop_balance_is_sum_of_deltas(
            movements in prop::collection::vec((kind_strategy(), quantity_strategy()), 1..20)
        ) {
            let balance: Decimal = movements
                .iter()
                .fold(Decimal::ZERO, |acc, (kind, qty)| acc + signed_delta(*kind, *qty));

            let (credits, debits): (Vec<_>, Vec<_>) = movements
                .iter()
                .partition(|(kind, _)| *kind != TransactionKind::Out);

            let total_in: Decimal = credits.iter().map(|(_, q)| *q).sum();
            let total_out: Decimal = debits.iter().map(|(_, q)| *q).sum();

            prop_assert_eq!(balance, total_in - total_out);
        }

        /// An out followed by a return of the same quantity is a no-op
        #[test]
        fn prop_out_return_cancels(start in quantity_strategy(), moved in quantity_strategy()) {
            let after_out = start + signed_delta(TransactionKind::Out, moved);
            let after_return = after_out + signed_delta(TransactionKind::Return, moved);

            prop_assert_eq!(after_return, start);
        }

        /// Receipts only ever increase the balance
        #[test]
        fn prop_receipt_increases(start in quantity_strategy(), received in quantity_strategy()) {
            let after = start + signed_delta(TransactionKind::Receipt, received);
            prop_assert!(after > start);
        }
    }
}
