//! Candidate and confirmation types for the Reconciliation Matcher.

use serde::{Deserialize, Serialize};

use crate::model::{BankLedgerEntry, Invoice};

/// A suggested invoice for an unlinked transfer, with the score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// The suggested invoice.
    pub invoice: Invoice,
    /// Total score (amount + name criteria).
    pub score: u32,
    /// Whether the amount criterion fired.
    pub amount_matched: bool,
    /// Whether the name criterion fired.
    pub name_matched: bool,
}

/// Result of confirming a match between a bank ledger entry and an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfirmation {
    /// The bank ledger entry, now reconciled.
    pub bank_entry: BankLedgerEntry,
    /// The invoice, now reconciled.
    pub invoice: Invoice,
}
