//! Imported bank transfer (outbound wire).

use chrono::{DateTime, NaiveDate, Utc};
use primanota_shared::types::{InvoiceId, PayslipId, TenantId, TransferId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An outbound wire payment imported from bank statements.
///
/// A transfer with `linked = true` points at exactly one settled obligation:
/// an invoice or a payslip. Unlinked transfers are the input of the
/// reconciliation matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransfer {
    /// Row id.
    pub id: TransferId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Value date of the wire.
    pub transfer_date: NaiveDate,
    /// Beneficiary name as it appears on the statement.
    pub beneficiary: String,
    /// Beneficiary IBAN.
    pub iban: Option<String>,
    /// Wire amount.
    pub amount: Decimal,
    /// Free-text payment reason.
    pub reason: Option<String>,
    /// True once reconciled against an obligation.
    pub linked: bool,
    /// Invoice this wire settles.
    pub invoice_id: Option<InvoiceId>,
    /// Payslip this wire settles.
    pub payslip_id: Option<PayslipId>,
    /// Name of the statement file this row was imported from.
    pub source_file: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl BankTransfer {
    /// Returns true if the link invariant holds: an unlinked transfer has no
    /// obligation pointers, a linked one has exactly one.
    #[must_use]
    pub const fn link_invariant_holds(&self) -> bool {
        match (self.linked, self.invoice_id, self.payslip_id) {
            (false, None, None) => true,
            (true, Some(_), None) | (true, None, Some(_)) => true,
            _ => false,
        }
    }
}
