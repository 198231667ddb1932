//! Input, filter, and patch types for the entity store contract.

use chrono::NaiveDate;
use primanota_shared::types::{BankEntryId, CheckId, EmployeeId, InvoiceId, PayslipId, TenantId};
use rust_decimal::Decimal;

use crate::model::{CheckState, LedgerCategory, PaymentMethod, PayslipState};

/// Three-way patch for a nullable column: leave it, set it, or null it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Leave the column unchanged.
    #[default]
    Keep,
    /// Write the given value.
    Set(T),
    /// Null the column out.
    Clear,
}

impl<T> Patch<T> {
    /// Applies the patch to a nullable slot.
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Set(v) => *slot = Some(v),
            Self::Clear => *slot = None,
        }
    }

    /// Returns true if the patch leaves the column unchanged.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

// ============================================================================
// Insert inputs
// ============================================================================

/// Input for inserting an invoice. The store assigns id, version, and
/// timestamps; the invoice starts unpaid and unreconciled.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Invoice number as printed on the document.
    pub number: String,
    /// Supplier tax id.
    pub supplier_tax_id: String,
    /// Denormalized supplier display name.
    pub supplier_name: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Net amount.
    pub net_amount: Decimal,
    /// Tax amount.
    pub tax_amount: Decimal,
    /// Total amount.
    pub total_amount: Decimal,
}

/// Input for inserting an invoice line.
#[derive(Debug, Clone)]
pub struct NewInvoiceLine {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Owning invoice.
    pub invoice_id: InvoiceId,
    /// Line description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Line total.
    pub line_total: Decimal,
    /// VAT rate, percent.
    pub vat_rate: Decimal,
}

/// Input for inserting a supplier.
#[derive(Debug, Clone)]
pub struct NewSupplier {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Tax id, natural key per tenant.
    pub tax_id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
}

/// Input for inserting an employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Tax id.
    pub tax_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

/// Input for inserting a blank check. Checks start in `Available`.
#[derive(Debug, Clone)]
pub struct NewCheck {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Serial number, unique per tenant.
    pub serial: String,
    /// Issuing bank name.
    pub bank: String,
    /// Free-text note.
    pub note: Option<String>,
}

/// Input for inserting an imported bank transfer. Transfers start unlinked.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Value date.
    pub transfer_date: NaiveDate,
    /// Beneficiary name.
    pub beneficiary: String,
    /// Beneficiary IBAN.
    pub iban: Option<String>,
    /// Wire amount.
    pub amount: Decimal,
    /// Free-text payment reason.
    pub reason: Option<String>,
    /// Statement file this row was imported from.
    pub source_file: Option<String>,
}

/// Input for inserting a cash ledger entry.
#[derive(Debug, Clone)]
pub struct NewCashEntry {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Operation date.
    pub entry_date: NaiveDate,
    /// Signed amount, negative for outflows.
    pub amount: Decimal,
    /// Category tag.
    pub category: LedgerCategory,
    /// Description.
    pub description: String,
    /// Free-text note.
    pub note: Option<String>,
    /// Invoice this movement settles.
    pub invoice_id: Option<InvoiceId>,
}

/// Input for inserting a bank ledger entry.
#[derive(Debug, Clone)]
pub struct NewBankEntry {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Operation date.
    pub entry_date: NaiveDate,
    /// Signed amount, negative for outflows.
    pub amount: Decimal,
    /// Category tag.
    pub category: LedgerCategory,
    /// Description.
    pub description: String,
    /// Invoice this movement settles.
    pub invoice_id: Option<InvoiceId>,
    /// Check that produced this movement.
    pub check_id: Option<CheckId>,
}

/// Input for inserting a payslip. Payslips start in `Due`.
#[derive(Debug, Clone)]
pub struct NewPayslip {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Employee this payslip belongs to.
    pub employee_id: EmployeeId,
    /// Pay period, `YYYY-MM`.
    pub period: String,
    /// Gross amount.
    pub gross_amount: Decimal,
    /// Net amount.
    pub net_amount: Decimal,
}

// ============================================================================
// Query filters
// ============================================================================

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by supplier tax id.
    pub supplier_tax_id: Option<String>,
    /// Filter by paid flag.
    pub paid: Option<bool>,
    /// Filter by reconciled flag.
    pub reconciled: Option<bool>,
}

/// Filter options for listing checks.
#[derive(Debug, Clone, Default)]
pub struct CheckFilter {
    /// Filter by lifecycle state.
    pub state: Option<CheckState>,
    /// Filter by linked invoice.
    pub invoice_id: Option<InvoiceId>,
}

/// Filter options for listing bank transfers.
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    /// Filter by linked flag.
    pub linked: Option<bool>,
    /// Filter by linked invoice.
    pub invoice_id: Option<InvoiceId>,
}

/// Filter options for listing cash ledger entries.
#[derive(Debug, Clone, Default)]
pub struct CashEntryFilter {
    /// Filter by linked invoice.
    pub invoice_id: Option<InvoiceId>,
}

/// Filter options for listing bank ledger entries.
#[derive(Debug, Clone, Default)]
pub struct BankEntryFilter {
    /// Filter by linked invoice.
    pub invoice_id: Option<InvoiceId>,
    /// Filter by reconciled flag.
    pub reconciled: Option<bool>,
}

/// Filter options for listing payslips.
#[derive(Debug, Clone, Default)]
pub struct PayslipFilter {
    /// Filter by employee.
    pub employee_id: Option<EmployeeId>,
    /// Filter by payment state.
    pub state: Option<PayslipState>,
}

// ============================================================================
// Update patches
// ============================================================================

/// Fields the engine writes on an invoice. The store bumps `version` and
/// `updated_at` on every applied patch.
#[derive(Debug, Clone, Default)]
pub struct InvoicePatch {
    /// Set the paid flag.
    pub paid: Option<bool>,
    /// Set the payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Set or clear the payment date.
    pub payment_date: Patch<NaiveDate>,
    /// Set the reconciled flag.
    pub reconciled: Option<bool>,
    /// Rewrite the denormalized supplier display name.
    pub supplier_name: Option<String>,
}

/// Fields the engine writes on a supplier.
#[derive(Debug, Clone, Default)]
pub struct SupplierPatch {
    /// Set the display name.
    pub name: Option<String>,
    /// Set the contact email.
    pub email: Option<String>,
    /// Set the contact phone.
    pub phone: Option<String>,
    /// Set the street address.
    pub address: Option<String>,
    /// Set the city.
    pub city: Option<String>,
    /// Set the active flag (soft delete).
    pub active: Option<bool>,
}

/// Fields the engine writes on an employee.
#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    /// Set the first name.
    pub first_name: Option<String>,
    /// Set the last name.
    pub last_name: Option<String>,
    /// Set the tax id.
    pub tax_id: Option<String>,
    /// Set the active flag (soft delete).
    pub active: Option<bool>,
}

/// Fields the engine writes on a check.
#[derive(Debug, Clone, Default)]
pub struct CheckPatch {
    /// Set the lifecycle state.
    pub state: Option<CheckState>,
    /// Set or clear the invoice link.
    pub invoice_id: Patch<InvoiceId>,
    /// Set or clear the amount.
    pub amount: Patch<Decimal>,
    /// Set or clear the beneficiary.
    pub beneficiary: Patch<String>,
    /// Set or clear the issue date.
    pub issue_date: Patch<NaiveDate>,
    /// Set or clear the cash date.
    pub cash_date: Patch<NaiveDate>,
    /// Set or clear the note.
    pub note: Patch<String>,
}

/// Fields the engine writes on a bank transfer.
#[derive(Debug, Clone, Default)]
pub struct TransferPatch {
    /// Set the linked flag.
    pub linked: Option<bool>,
    /// Set or clear the invoice link.
    pub invoice_id: Patch<InvoiceId>,
    /// Set or clear the payslip link.
    pub payslip_id: Patch<PayslipId>,
}

/// Fields the engine writes on a bank ledger entry.
#[derive(Debug, Clone, Default)]
pub struct BankEntryPatch {
    /// Set the reconciled flag.
    pub reconciled: Option<bool>,
}

/// Fields the engine writes on a payslip.
#[derive(Debug, Clone, Default)]
pub struct PayslipPatch {
    /// Set the payment state.
    pub state: Option<PayslipState>,
    /// Set or clear the paying ledger entry link.
    pub paid_by_entry: Patch<BankEntryId>,
}

/// Unlink patch applied to all transfers pointing at an invoice during a
/// cascade delete: clears the invoice link and the linked flag.
#[must_use]
pub fn transfer_unlink_patch() -> TransferPatch {
    TransferPatch {
        linked: Some(false),
        invoice_id: Patch::Clear,
        payslip_id: Patch::Keep,
    }
}
