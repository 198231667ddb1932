//! Report and outcome types returned by the Integrity Guard.

use serde::{Deserialize, Serialize};

/// Per-category counts of records affected by a cascade delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CascadeReport {
    /// Invoice lines deleted.
    pub invoice_lines: u64,
    /// Cash ledger entries deleted.
    pub cash_entries: u64,
    /// Bank ledger entries deleted.
    pub bank_entries: u64,
    /// Bank transfers unlinked (preserved, link cleared).
    pub transfers_unlinked: u64,
    /// Issued checks reverted to available. Cashed checks keep their history
    /// and are pointer-cleared without counting here.
    pub checks_reverted: u64,
}

/// Outcome of a safe delete on a master record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The record had no dependents and was removed.
    HardDeleted,
    /// The record had dependents and was deactivated instead.
    SoftDeleted {
        /// Number of dependent records found.
        dependents: u64,
    },
}

/// Read-only dependency breakdown for a supplier, used by callers to decide
/// whether to force-delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySummary {
    /// Total invoices referencing the supplier.
    pub total_invoices: u64,
    /// Paid invoices referencing the supplier.
    pub paid_invoices: u64,
    /// Unpaid invoices referencing the supplier.
    pub unpaid_invoices: u64,
    /// True when a hard delete would succeed.
    pub can_delete: bool,
}

/// Answer to a "may I do this" pre-check, with the blocking reason when
/// denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    /// Whether the operation is permitted.
    pub allowed: bool,
    /// Why the operation is blocked, when it is.
    pub reason: Option<String>,
}

impl PermissionCheck {
    /// A permitted operation.
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// A denied operation with the blocking reason.
    #[must_use]
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}
