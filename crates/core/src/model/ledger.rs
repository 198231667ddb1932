//! Cash and bank daybook (prima nota) entries.
//!
//! Ledger rows are append-style: negative amounts are outflows. Rows created
//! by the payment registrar carry a link back to the invoice they settle so
//! a cascade delete can find and remove them.

use chrono::{DateTime, NaiveDate, Utc};
use primanota_shared::types::{BankEntryId, CashEntryId, CheckId, InvoiceId, TenantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category tag on a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCategory {
    /// Invoice settled from cash.
    InvoicePayment,
    /// Invoice settled by wire transfer.
    InvoicePaymentTransfer,
    /// Invoice settled by direct debit.
    InvoicePaymentDirectDebit,
    /// Invoice settled by check.
    InvoicePaymentCheck,
    /// Payslip settled by wire transfer.
    PayslipPayment,
    /// Any other movement (manual entry, import).
    Other,
}

impl LedgerCategory {
    /// Returns the string representation of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvoicePayment => "invoice_payment",
            Self::InvoicePaymentTransfer => "invoice_payment_transfer",
            Self::InvoicePaymentDirectDebit => "invoice_payment_direct_debit",
            Self::InvoicePaymentCheck => "invoice_payment_check",
            Self::PayslipPayment => "payslip_payment",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LedgerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cash daybook row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashLedgerEntry {
    /// Row id.
    pub id: CashEntryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Operation date.
    pub entry_date: NaiveDate,
    /// Signed amount, negative for outflows.
    pub amount: Decimal,
    /// Category tag.
    pub category: LedgerCategory,
    /// Free-text description.
    pub description: String,
    /// Free-text note.
    pub note: Option<String>,
    /// Invoice this movement settles.
    pub invoice_id: Option<InvoiceId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A bank daybook row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankLedgerEntry {
    /// Row id.
    pub id: BankEntryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Operation date.
    pub entry_date: NaiveDate,
    /// Signed amount, negative for outflows.
    pub amount: Decimal,
    /// Category tag.
    pub category: LedgerCategory,
    /// Free-text description.
    pub description: String,
    /// Invoice this movement settles.
    pub invoice_id: Option<InvoiceId>,
    /// Check that produced this movement, for check payments.
    pub check_id: Option<CheckId>,
    /// True once matched against a statement movement.
    pub reconciled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_as_str() {
        assert_eq!(LedgerCategory::InvoicePayment.as_str(), "invoice_payment");
        assert_eq!(
            LedgerCategory::InvoicePaymentTransfer.as_str(),
            "invoice_payment_transfer"
        );
        assert_eq!(
            LedgerCategory::InvoicePaymentDirectDebit.as_str(),
            "invoice_payment_direct_debit"
        );
        assert_eq!(
            LedgerCategory::InvoicePaymentCheck.as_str(),
            "invoice_payment_check"
        );
        assert_eq!(LedgerCategory::PayslipPayment.as_str(), "payslip_payment");
    }
}
