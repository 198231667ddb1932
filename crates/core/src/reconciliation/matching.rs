//! Similarity scoring between a bank transfer and an unpaid invoice.
//!
//! The thresholds are load-bearing business behavior, kept as named
//! constants: an amount within 2% scores 50, a counterparty-name substring
//! match scores 50, and a candidate is suggested only at 60 or above. With
//! two 50-point criteria the threshold in effect requires at least one full
//! criterion; it is applied literally against [`SUGGESTION_THRESHOLD`], not
//! re-derived.

use rust_decimal::Decimal;

/// Points awarded when the amounts agree within tolerance.
pub const AMOUNT_MATCH_SCORE: u32 = 50;

/// Points awarded when the counterparty names match.
pub const NAME_MATCH_SCORE: u32 = 50;

/// Minimum score for a candidate to be suggested.
pub const SUGGESTION_THRESHOLD: u32 = 60;

/// Relative amount tolerance: |invoice - transfer| / |transfer| <= 2%.
pub const AMOUNT_RELATIVE_TOLERANCE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// True when the invoice total is within 2% of the transfer amount,
/// relative to the transfer amount. A zero transfer amount matches nothing.
#[must_use]
pub fn amounts_match(transfer_amount: Decimal, invoice_total: Decimal) -> bool {
    if transfer_amount.is_zero() {
        return false;
    }
    let relative = (invoice_total - transfer_amount).abs() / transfer_amount.abs();
    relative <= AMOUNT_RELATIVE_TOLERANCE
}

/// Case-insensitive bidirectional substring test between the transfer
/// beneficiary and the invoice supplier name. Blank names match nothing.
#[must_use]
pub fn names_match(beneficiary: &str, supplier_name: &str) -> bool {
    let a = beneficiary.trim().to_lowercase();
    let b = supplier_name.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Scores an unpaid invoice against a transfer. Returns the total score and
/// which criteria fired.
#[must_use]
pub fn score_candidate(
    transfer_amount: Decimal,
    beneficiary: &str,
    invoice_total: Decimal,
    supplier_name: &str,
) -> (u32, bool, bool) {
    let amount_matched = amounts_match(transfer_amount, invoice_total);
    let name_matched = names_match(beneficiary, supplier_name);
    let mut score = 0;
    if amount_matched {
        score += AMOUNT_MATCH_SCORE;
    }
    if name_matched {
        score += NAME_MATCH_SCORE;
    }
    (score, amount_matched, name_matched)
}
