//! Request and result types for the Payment Registrar.

use chrono::NaiveDate;
use primanota_shared::types::{BankEntryId, CashEntryId, CheckId, TransferId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{BankTransfer, Check, Invoice, PaymentMethod, Payslip};

/// One payment to register against an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInstruction {
    /// Settlement method.
    pub method: PaymentMethod,
    /// Amount paid; must equal the invoice total within rounding tolerance.
    pub amount: Decimal,
    /// Value date of the payment.
    pub payment_date: NaiveDate,
    /// Check used, required for method `check`.
    pub check_id: Option<CheckId>,
    /// Imported bank transfer to link, optional for wire methods.
    pub transfer_id: Option<TransferId>,
    /// Free-text note carried onto the ledger entry.
    pub note: Option<String>,
}

/// What a successful registration created and linked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    /// The invoice after being marked paid.
    pub invoice: Invoice,
    /// Cash ledger row created, for method `cash`.
    pub cash_entry_id: Option<CashEntryId>,
    /// Bank ledger row created, for wire and check methods.
    pub bank_entry_id: Option<BankEntryId>,
    /// The check after being issued, for method `check`.
    pub check: Option<Check>,
    /// Transfer linked to the invoice, when one was supplied.
    pub transfer_linked: Option<TransferId>,
}

/// Per-state check counts for a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckStats {
    /// Blank checks ready to issue.
    pub available: u64,
    /// Issued, not yet cashed.
    pub issued: u64,
    /// Cashed.
    pub cashed: u64,
    /// Voided.
    pub voided: u64,
    /// All checks.
    pub total: u64,
}

/// Result of reconciling a bank transfer against a payslip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipLinkResult {
    /// The transfer after linking.
    pub transfer: BankTransfer,
    /// The payslip after being marked paid.
    pub payslip: Payslip,
    /// Bank ledger row recording the outflow.
    pub bank_entry_id: BankEntryId,
}
