//! Property-based tests for the matching tolerance and scoring rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::matching::{
    AMOUNT_MATCH_SCORE, NAME_MATCH_SCORE, amounts_match, names_match, score_candidate,
};

/// Strategy for amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    /// The 2% tolerance agrees with exact integer arithmetic on cents:
    /// |invoice - transfer| * 100 <= 2 * transfer.
    #[test]
    fn amount_tolerance_matches_integer_reference(
        transfer_cents in 1i64..100_000_000i64,
        invoice_cents in 1i64..100_000_000i64,
    ) {
        let transfer = Decimal::new(transfer_cents, 2);
        let invoice = Decimal::new(invoice_cents, 2);
        let expected = (invoice_cents - transfer_cents).abs() * 100 <= 2 * transfer_cents;
        prop_assert_eq!(amounts_match(transfer, invoice), expected);
    }

    /// An amount always matches itself.
    #[test]
    fn amount_matches_itself(amount in positive_amount()) {
        prop_assert!(amounts_match(amount, amount));
    }

    /// The boundary is inclusive: exactly 2% above or below still matches,
    /// one cent further out does not (when the 2% lands on whole cents).
    #[test]
    fn amount_boundary_is_inclusive(transfer_cents in 50i64..1_000_000i64) {
        let transfer = Decimal::new(transfer_cents * 50, 2);
        let delta = Decimal::new(transfer_cents, 2); // exactly 2% of transfer
        prop_assert!(amounts_match(transfer, transfer + delta));
        prop_assert!(amounts_match(transfer, transfer - delta));
        let cent = Decimal::new(1, 2);
        prop_assert!(!amounts_match(transfer, transfer + delta + cent));
        prop_assert!(!amounts_match(transfer, transfer - delta - cent));
    }

    /// Name matching is symmetric and ignores case.
    #[test]
    fn name_match_symmetric_case_insensitive(
        a in "[A-Za-z][A-Za-z ]{0,20}",
        b in "[A-Za-z][A-Za-z ]{0,20}",
    ) {
        prop_assert_eq!(names_match(&a, &b), names_match(&b, &a));
        prop_assert_eq!(names_match(&a, &b), names_match(&a.to_uppercase(), &b.to_lowercase()));
    }

    /// A non-blank name always matches itself.
    #[test]
    fn name_matches_itself(name in "[A-Za-z][A-Za-z ]{0,30}[A-Za-z]") {
        prop_assert!(names_match(&name, &name));
    }

    /// The total score is exactly the sum of the criteria that fired.
    #[test]
    fn score_is_sum_of_criteria(
        transfer in positive_amount(),
        invoice in positive_amount(),
        beneficiary in "[A-Za-z ]{0,20}",
        supplier in "[A-Za-z ]{0,20}",
    ) {
        let (score, amount_matched, name_matched) =
            score_candidate(transfer, &beneficiary, invoice, &supplier);
        let mut expected = 0;
        if amount_matched {
            expected += AMOUNT_MATCH_SCORE;
        }
        if name_matched {
            expected += NAME_MATCH_SCORE;
        }
        prop_assert_eq!(score, expected);
        prop_assert_eq!(amount_matched, amounts_match(transfer, invoice));
        prop_assert_eq!(name_matched, names_match(&beneficiary, &supplier));
    }
}
