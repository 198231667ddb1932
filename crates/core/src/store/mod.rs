//! Entity store contract and in-memory implementation.
//!
//! The engine never talks to a database directly: every service holds an
//! injected implementation of [`EntityStore`]. The contract is
//! document-style: per-entity get/query/insert/update/delete plus a
//! unit-of-work (`begin`/`commit`/`rollback`) that makes multi-step
//! mutations atomic, and conditional updates that close the check-state,
//! invoice-version, transfer-link, and entry-reconciliation races without
//! read-then-write gaps.

pub mod memory;
pub mod types;

use primanota_shared::types::{
    BankEntryId, CheckId, EmployeeId, InvoiceId, PayslipId, TenantId, TransferId,
};
use thiserror::Error;

use crate::model::{
    BankLedgerEntry, BankTransfer, CashLedgerEntry, Check, CheckState, Employee, Invoice,
    InvoiceLine, Payslip, PayslipState, Supplier,
};

pub use memory::{Fault, MemoryStore};
pub use types::{
    BankEntryFilter, BankEntryPatch, CashEntryFilter, CheckFilter, CheckPatch, EmployeePatch,
    InvoiceFilter, InvoicePatch, NewBankEntry, NewCashEntry, NewCheck, NewEmployee, NewInvoice,
    NewInvoiceLine, NewPayslip, NewSupplier, NewTransfer, Patch, PayslipFilter, PayslipPatch,
    SupplierPatch, TransferFilter, TransferPatch, transfer_unlink_patch,
};

/// Errors surfaced by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic concurrency check failed: the row changed under us.
    #[error("Concurrent modification of {entity} {id}, please retry")]
    Conflict {
        /// Entity kind (e.g. "invoice").
        entity: &'static str,
        /// Row id.
        id: i64,
    },

    /// Unique constraint violated (e.g. duplicate check serial).
    #[error("Duplicate {entity}: {key}")]
    Duplicate {
        /// Entity kind.
        entity: &'static str,
        /// Offending natural key.
        key: String,
    },

    /// Backend failure (connection, query, injected fault).
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type alias using `StoreError`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Uniform access to the entity collections, scoped by tenant id.
///
/// Multi-step mutations wrap their calls in `begin`/`commit` and call
/// `rollback` on any intermediate error; implementations must guarantee that
/// nothing written between `begin` and a `rollback` remains visible.
/// Transactions do not nest.
///
/// Every read reflects current committed state; the engine never caches
/// entity state across calls.
#[allow(async_fn_in_trait)]
pub trait EntityStore {
    // ------------------------------------------------------------------
    // Unit of work
    // ------------------------------------------------------------------

    /// Opens a transaction.
    async fn begin(&self) -> StoreResult<()>;

    /// Commits the open transaction.
    async fn commit(&self) -> StoreResult<()>;

    /// Rolls back the open transaction, discarding every write since
    /// `begin`.
    async fn rollback(&self) -> StoreResult<()>;

    // ------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------

    /// Inserts an invoice (unpaid, version 1).
    async fn insert_invoice(&self, new: NewInvoice) -> StoreResult<Invoice>;

    /// Fetches an invoice by id.
    async fn get_invoice(&self, tenant: TenantId, id: InvoiceId) -> StoreResult<Option<Invoice>>;

    /// Lists invoices matching the filter, ascending id order.
    async fn list_invoices(
        &self,
        tenant: TenantId,
        filter: InvoiceFilter,
    ) -> StoreResult<Vec<Invoice>>;

    /// Applies a patch to an invoice, bumping its version. Returns `None`
    /// if the invoice does not exist.
    async fn update_invoice(
        &self,
        tenant: TenantId,
        id: InvoiceId,
        patch: InvoicePatch,
    ) -> StoreResult<Option<Invoice>>;

    /// Applies a patch only if the stored version matches
    /// `expected_version`; fails with [`StoreError::Conflict`] otherwise.
    /// Returns `None` if the invoice does not exist.
    async fn update_invoice_versioned(
        &self,
        tenant: TenantId,
        id: InvoiceId,
        expected_version: i64,
        patch: InvoicePatch,
    ) -> StoreResult<Option<Invoice>>;

    /// Deletes an invoice if its version matches; fails with
    /// [`StoreError::Conflict`] otherwise. Returns false if absent.
    async fn delete_invoice(
        &self,
        tenant: TenantId,
        id: InvoiceId,
        expected_version: i64,
    ) -> StoreResult<bool>;

    // ------------------------------------------------------------------
    // Invoice lines
    // ------------------------------------------------------------------

    /// Inserts an invoice line.
    async fn insert_invoice_line(&self, new: NewInvoiceLine) -> StoreResult<InvoiceLine>;

    /// Lists the lines of an invoice.
    async fn list_invoice_lines(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
    ) -> StoreResult<Vec<InvoiceLine>>;

    /// Deletes all lines of an invoice, returning how many were removed.
    async fn delete_invoice_lines(&self, tenant: TenantId, invoice: InvoiceId)
    -> StoreResult<u64>;

    // ------------------------------------------------------------------
    // Suppliers
    // ------------------------------------------------------------------

    /// Inserts a supplier; duplicate tax ids are rejected.
    async fn insert_supplier(&self, new: NewSupplier) -> StoreResult<Supplier>;

    /// Fetches a supplier by tax id.
    async fn get_supplier(&self, tenant: TenantId, tax_id: &str) -> StoreResult<Option<Supplier>>;

    /// Applies a patch to a supplier. Returns `None` if absent.
    async fn update_supplier(
        &self,
        tenant: TenantId,
        tax_id: &str,
        patch: SupplierPatch,
    ) -> StoreResult<Option<Supplier>>;

    /// Hard-deletes a supplier. Returns false if absent.
    async fn delete_supplier(&self, tenant: TenantId, tax_id: &str) -> StoreResult<bool>;

    // ------------------------------------------------------------------
    // Employees
    // ------------------------------------------------------------------

    /// Inserts an employee.
    async fn insert_employee(&self, new: NewEmployee) -> StoreResult<Employee>;

    /// Fetches an employee by id.
    async fn get_employee(&self, tenant: TenantId, id: EmployeeId)
    -> StoreResult<Option<Employee>>;

    /// Applies a patch to an employee. Returns `None` if absent.
    async fn update_employee(
        &self,
        tenant: TenantId,
        id: EmployeeId,
        patch: EmployeePatch,
    ) -> StoreResult<Option<Employee>>;

    /// Hard-deletes an employee. Returns false if absent.
    async fn delete_employee(&self, tenant: TenantId, id: EmployeeId) -> StoreResult<bool>;

    /// Counts attendance/shift records referencing an employee. Shift rows
    /// themselves belong to the (out-of-scope) HR module; the engine only
    /// needs the dependency count.
    async fn count_shifts(&self, tenant: TenantId, employee: EmployeeId) -> StoreResult<u64>;

    // ------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------

    /// Inserts a blank check; duplicate serials fail with
    /// [`StoreError::Duplicate`].
    async fn insert_check(&self, new: NewCheck) -> StoreResult<Check>;

    /// Fetches a check by id.
    async fn get_check(&self, tenant: TenantId, id: CheckId) -> StoreResult<Option<Check>>;

    /// Fetches a check by serial number.
    async fn find_check_by_serial(
        &self,
        tenant: TenantId,
        serial: &str,
    ) -> StoreResult<Option<Check>>;

    /// Lists checks matching the filter, serial ascending. Numeric serials
    /// order by value so a carnet crossing a digit boundary ("999", "1000")
    /// keeps its issue order; non-numeric serials sort lexicographically
    /// ahead of numeric ones.
    async fn list_checks(&self, tenant: TenantId, filter: CheckFilter) -> StoreResult<Vec<Check>>;

    /// Applies a patch unconditionally. Returns `None` if absent.
    async fn update_check(
        &self,
        tenant: TenantId,
        id: CheckId,
        patch: CheckPatch,
    ) -> StoreResult<Option<Check>>;

    /// Single atomic conditional update: applies the patch only if the
    /// stored state equals `expected`. Returns `None` when no row matched
    /// (absent or in another state), the `UPDATE .. WHERE state = ..`
    /// shape that closes the check race.
    async fn update_check_if_state(
        &self,
        tenant: TenantId,
        id: CheckId,
        expected: CheckState,
        patch: CheckPatch,
    ) -> StoreResult<Option<Check>>;

    /// Deletes a check only if its state equals `expected`. Returns true if
    /// a row was removed.
    async fn delete_check_if_state(
        &self,
        tenant: TenantId,
        id: CheckId,
        expected: CheckState,
    ) -> StoreResult<bool>;

    // ------------------------------------------------------------------
    // Bank transfers
    // ------------------------------------------------------------------

    /// Inserts an imported transfer.
    async fn insert_transfer(&self, new: NewTransfer) -> StoreResult<BankTransfer>;

    /// Fetches a transfer by id.
    async fn get_transfer(
        &self,
        tenant: TenantId,
        id: TransferId,
    ) -> StoreResult<Option<BankTransfer>>;

    /// Lists transfers matching the filter, newest transfer date first.
    async fn list_transfers(
        &self,
        tenant: TenantId,
        filter: TransferFilter,
    ) -> StoreResult<Vec<BankTransfer>>;

    /// Applies a patch to a transfer. Returns `None` if absent.
    async fn update_transfer(
        &self,
        tenant: TenantId,
        id: TransferId,
        patch: TransferPatch,
    ) -> StoreResult<Option<BankTransfer>>;

    /// Applies the patch only if the transfer is not yet linked. Returns
    /// `None` when no row matched (absent or already linked), so two tasks
    /// racing to settle the same movement cannot both win.
    async fn update_transfer_if_unlinked(
        &self,
        tenant: TenantId,
        id: TransferId,
        patch: TransferPatch,
    ) -> StoreResult<Option<BankTransfer>>;

    /// Applies a patch to every transfer linked to an invoice, returning
    /// how many rows were touched.
    async fn update_transfers_by_invoice(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
        patch: TransferPatch,
    ) -> StoreResult<u64>;

    /// Deletes a transfer. Returns false if absent.
    async fn delete_transfer(&self, tenant: TenantId, id: TransferId) -> StoreResult<bool>;

    // ------------------------------------------------------------------
    // Cash ledger
    // ------------------------------------------------------------------

    /// Appends a cash ledger row.
    async fn insert_cash_entry(&self, new: NewCashEntry) -> StoreResult<CashLedgerEntry>;

    /// Lists cash ledger rows matching the filter, newest first.
    async fn list_cash_entries(
        &self,
        tenant: TenantId,
        filter: CashEntryFilter,
    ) -> StoreResult<Vec<CashLedgerEntry>>;

    /// Deletes all cash ledger rows linked to an invoice, returning the
    /// count.
    async fn delete_cash_entries_by_invoice(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
    ) -> StoreResult<u64>;

    // ------------------------------------------------------------------
    // Bank ledger
    // ------------------------------------------------------------------

    /// Appends a bank ledger row.
    async fn insert_bank_entry(&self, new: NewBankEntry) -> StoreResult<BankLedgerEntry>;

    /// Fetches a bank ledger row by id.
    async fn get_bank_entry(
        &self,
        tenant: TenantId,
        id: BankEntryId,
    ) -> StoreResult<Option<BankLedgerEntry>>;

    /// Lists bank ledger rows matching the filter, newest first.
    async fn list_bank_entries(
        &self,
        tenant: TenantId,
        filter: BankEntryFilter,
    ) -> StoreResult<Vec<BankLedgerEntry>>;

    /// Applies a patch to a bank ledger row. Returns `None` if absent.
    async fn update_bank_entry(
        &self,
        tenant: TenantId,
        id: BankEntryId,
        patch: BankEntryPatch,
    ) -> StoreResult<Option<BankLedgerEntry>>;

    /// Applies the patch only if the row is not yet reconciled. Returns
    /// `None` when no row matched (absent or already reconciled).
    async fn update_bank_entry_if_unreconciled(
        &self,
        tenant: TenantId,
        id: BankEntryId,
        patch: BankEntryPatch,
    ) -> StoreResult<Option<BankLedgerEntry>>;

    /// Deletes all bank ledger rows linked to an invoice, returning the
    /// count.
    async fn delete_bank_entries_by_invoice(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
    ) -> StoreResult<u64>;

    // ------------------------------------------------------------------
    // Payslips
    // ------------------------------------------------------------------

    /// Inserts a payslip (due).
    async fn insert_payslip(&self, new: NewPayslip) -> StoreResult<Payslip>;

    /// Fetches a payslip by id.
    async fn get_payslip(&self, tenant: TenantId, id: PayslipId) -> StoreResult<Option<Payslip>>;

    /// Lists payslips matching the filter, ascending id order.
    async fn list_payslips(
        &self,
        tenant: TenantId,
        filter: PayslipFilter,
    ) -> StoreResult<Vec<Payslip>>;

    /// Applies a patch to a payslip. Returns `None` if absent.
    async fn update_payslip(
        &self,
        tenant: TenantId,
        id: PayslipId,
        patch: PayslipPatch,
    ) -> StoreResult<Option<Payslip>>;

    /// Applies the patch only if the stored state equals `expected`.
    /// Returns `None` when no row matched (absent or in another state).
    async fn update_payslip_if_state(
        &self,
        tenant: TenantId,
        id: PayslipId,
        expected: PayslipState,
        patch: PayslipPatch,
    ) -> StoreResult<Option<Payslip>>;
}
