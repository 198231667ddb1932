//! In-memory entity store.
//!
//! Backs the engine in tests and in embedded deployments without a
//! database. Transactions are snapshot-based: `begin` clones the table
//! state, `rollback` restores it. A tokio mutex serializes transactions so
//! two concurrent units of work cannot interleave their writes;
//! transactions do not nest, and a task must commit or roll back before
//! beginning again.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use primanota_shared::types::{
    BankEntryId, CashEntryId, CheckId, EmployeeId, InvoiceId, InvoiceLineId, PayslipId, TenantId,
    TransferId,
};
use tokio::sync::OwnedMutexGuard;

use crate::model::{
    BankLedgerEntry, BankTransfer, CashLedgerEntry, Check, CheckState, Employee, Invoice,
    InvoiceLine, PaymentMethod, Payslip, PayslipState, Supplier,
};

use super::types::{
    BankEntryFilter, BankEntryPatch, CashEntryFilter, CheckFilter, CheckPatch, EmployeePatch,
    InvoiceFilter, InvoicePatch, NewBankEntry, NewCashEntry, NewCheck, NewEmployee, NewInvoice,
    NewInvoiceLine, NewPayslip, NewSupplier, NewTransfer, PayslipFilter, PayslipPatch,
    SupplierPatch, TransferFilter, TransferPatch,
};
use super::{EntityStore, StoreError, StoreResult};

/// Injectable fault, consumed by a matching operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail a cash ledger insert.
    CashEntryInsert,
    /// Fail a bank ledger insert.
    BankEntryInsert,
    /// Fail an unconditional invoice update.
    InvoiceUpdate,
}

type Key = (i64, i64);

#[derive(Debug, Clone, Default)]
struct Tables {
    invoices: BTreeMap<Key, Invoice>,
    invoice_lines: BTreeMap<Key, InvoiceLine>,
    suppliers: BTreeMap<(i64, String), Supplier>,
    employees: BTreeMap<Key, Employee>,
    checks: BTreeMap<Key, Check>,
    transfers: BTreeMap<Key, BankTransfer>,
    cash_entries: BTreeMap<Key, CashLedgerEntry>,
    bank_entries: BTreeMap<Key, BankLedgerEntry>,
    payslips: BTreeMap<Key, Payslip>,
    shift_counts: BTreeMap<Key, u64>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    snapshot: Option<Tables>,
    txn_guard: Option<OwnedMutexGuard<()>>,
    // Armed fault plus how many matching operations succeed before it fires.
    fault: Option<(Fault, u32)>,
}

/// In-memory [`EntityStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    txn_lock: Arc<tokio::sync::Mutex<()>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot fault consumed by the next matching operation.
    /// Used by tests to verify rollback behavior.
    pub fn inject_fault(&self, fault: Fault) {
        self.inject_fault_after(fault, 0);
    }

    /// Arms a one-shot fault that lets `skip` matching operations succeed
    /// before firing. Used by tests to fail partway through a batch.
    pub fn inject_fault_after(&self, fault: Fault, skip: u32) {
        self.lock().fault = Some((fault, skip));
    }

    /// Sets the attendance/shift dependency count for an employee. Shift
    /// rows live in the HR module; the store only tracks the count the
    /// integrity guard needs.
    pub fn set_shift_count(&self, tenant: TenantId, employee: EmployeeId, count: u64) {
        self.lock()
            .tables
            .shift_counts
            .insert((tenant.0, employee.0), count);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn take_fault(inner: &mut Inner, fault: Fault) -> StoreResult<()> {
        if let Some((armed, skip)) = inner.fault
            && armed == fault
        {
            if skip == 0 {
                inner.fault = None;
                return Err(StoreError::Backend(format!("injected fault: {fault:?}")));
            }
            inner.fault = Some((armed, skip - 1));
        }
        Ok(())
    }
}

fn apply_invoice_patch(invoice: &mut Invoice, patch: InvoicePatch) {
    if let Some(paid) = patch.paid {
        invoice.paid = paid;
    }
    if let Some(method) = patch.payment_method {
        invoice.payment_method = method;
    }
    patch.payment_date.apply(&mut invoice.payment_date);
    if let Some(reconciled) = patch.reconciled {
        invoice.reconciled = reconciled;
    }
    if let Some(name) = patch.supplier_name {
        invoice.supplier_name = name;
    }
    invoice.version += 1;
    invoice.updated_at = Utc::now();
}

fn apply_check_patch(check: &mut Check, patch: CheckPatch) {
    if let Some(state) = patch.state {
        check.state = state;
    }
    patch.invoice_id.apply(&mut check.invoice_id);
    patch.amount.apply(&mut check.amount);
    patch.beneficiary.apply(&mut check.beneficiary);
    patch.issue_date.apply(&mut check.issue_date);
    patch.cash_date.apply(&mut check.cash_date);
    patch.note.apply(&mut check.note);
    check.updated_at = Utc::now();
}

fn apply_transfer_patch(transfer: &mut BankTransfer, patch: TransferPatch) {
    if let Some(linked) = patch.linked {
        transfer.linked = linked;
    }
    patch.invoice_id.apply(&mut transfer.invoice_id);
    patch.payslip_id.apply(&mut transfer.payslip_id);
    transfer.updated_at = Utc::now();
}

fn apply_payslip_patch(payslip: &mut Payslip, patch: PayslipPatch) {
    if let Some(state) = patch.state {
        payslip.state = state;
    }
    patch.paid_by_entry.apply(&mut payslip.paid_by_entry);
    payslip.updated_at = Utc::now();
}

impl EntityStore for MemoryStore {
    async fn begin(&self) -> StoreResult<()> {
        let guard = self.txn_lock.clone().lock_owned().await;
        let mut inner = self.lock();
        inner.snapshot = Some(inner.tables.clone());
        inner.txn_guard = Some(guard);
        Ok(())
    }

    async fn commit(&self) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.snapshot.take().is_none() {
            return Err(StoreError::Backend("commit without open transaction".into()));
        }
        inner.txn_guard = None;
        Ok(())
    }

    async fn rollback(&self) -> StoreResult<()> {
        let mut inner = self.lock();
        let Some(snapshot) = inner.snapshot.take() else {
            return Err(StoreError::Backend(
                "rollback without open transaction".into(),
            ));
        };
        inner.tables = snapshot;
        inner.txn_guard = None;
        Ok(())
    }

    async fn insert_invoice(&self, new: NewInvoice) -> StoreResult<Invoice> {
        let mut inner = self.lock();
        let id = inner.tables.next_id();
        let now = Utc::now();
        let invoice = Invoice {
            id: InvoiceId::new(id),
            tenant_id: new.tenant_id,
            number: new.number,
            supplier_tax_id: new.supplier_tax_id,
            supplier_name: new.supplier_name,
            issue_date: new.issue_date,
            due_date: new.due_date,
            net_amount: new.net_amount,
            tax_amount: new.tax_amount,
            total_amount: new.total_amount,
            paid: false,
            payment_method: PaymentMethod::None,
            payment_date: None,
            reconciled: false,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        inner
            .tables
            .invoices
            .insert((new.tenant_id.0, id), invoice.clone());
        Ok(invoice)
    }

    async fn get_invoice(&self, tenant: TenantId, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        Ok(self.lock().tables.invoices.get(&(tenant.0, id.0)).cloned())
    }

    async fn list_invoices(
        &self,
        tenant: TenantId,
        filter: InvoiceFilter,
    ) -> StoreResult<Vec<Invoice>> {
        let inner = self.lock();
        Ok(inner
            .tables
            .invoices
            .range((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
            .map(|(_, inv)| inv)
            .filter(|inv| {
                filter
                    .supplier_tax_id
                    .as_deref()
                    .is_none_or(|t| inv.supplier_tax_id == t)
                    && filter.paid.is_none_or(|p| inv.paid == p)
                    && filter.reconciled.is_none_or(|r| inv.reconciled == r)
            })
            .cloned()
            .collect())
    }

    async fn update_invoice(
        &self,
        tenant: TenantId,
        id: InvoiceId,
        patch: InvoicePatch,
    ) -> StoreResult<Option<Invoice>> {
        let mut inner = self.lock();
        Self::take_fault(&mut inner, Fault::InvoiceUpdate)?;
        let Some(invoice) = inner.tables.invoices.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        apply_invoice_patch(invoice, patch);
        Ok(Some(invoice.clone()))
    }

    async fn update_invoice_versioned(
        &self,
        tenant: TenantId,
        id: InvoiceId,
        expected_version: i64,
        patch: InvoicePatch,
    ) -> StoreResult<Option<Invoice>> {
        let mut inner = self.lock();
        let Some(invoice) = inner.tables.invoices.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        if invoice.version != expected_version {
            return Err(StoreError::Conflict {
                entity: "invoice",
                id: id.0,
            });
        }
        apply_invoice_patch(invoice, patch);
        Ok(Some(invoice.clone()))
    }

    async fn delete_invoice(
        &self,
        tenant: TenantId,
        id: InvoiceId,
        expected_version: i64,
    ) -> StoreResult<bool> {
        let mut inner = self.lock();
        let Some(invoice) = inner.tables.invoices.get(&(tenant.0, id.0)) else {
            return Ok(false);
        };
        if invoice.version != expected_version {
            return Err(StoreError::Conflict {
                entity: "invoice",
                id: id.0,
            });
        }
        inner.tables.invoices.remove(&(tenant.0, id.0));
        Ok(true)
    }

    async fn insert_invoice_line(&self, new: NewInvoiceLine) -> StoreResult<InvoiceLine> {
        let mut inner = self.lock();
        let id = inner.tables.next_id();
        let line = InvoiceLine {
            id: InvoiceLineId::new(id),
            tenant_id: new.tenant_id,
            invoice_id: new.invoice_id,
            description: new.description,
            quantity: new.quantity,
            unit_price: new.unit_price,
            line_total: new.line_total,
            vat_rate: new.vat_rate,
        };
        inner
            .tables
            .invoice_lines
            .insert((new.tenant_id.0, id), line.clone());
        Ok(line)
    }

    async fn list_invoice_lines(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
    ) -> StoreResult<Vec<InvoiceLine>> {
        let inner = self.lock();
        Ok(inner
            .tables
            .invoice_lines
            .range((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
            .map(|(_, line)| line)
            .filter(|line| line.invoice_id == invoice)
            .cloned()
            .collect())
    }

    async fn delete_invoice_lines(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
    ) -> StoreResult<u64> {
        let mut inner = self.lock();
        let before = inner.tables.invoice_lines.len();
        inner
            .tables
            .invoice_lines
            .retain(|(t, _), line| *t != tenant.0 || line.invoice_id != invoice);
        Ok((before - inner.tables.invoice_lines.len()) as u64)
    }

    async fn insert_supplier(&self, new: NewSupplier) -> StoreResult<Supplier> {
        let mut inner = self.lock();
        let key = (new.tenant_id.0, new.tax_id.clone());
        if inner.tables.suppliers.contains_key(&key) {
            return Err(StoreError::Duplicate {
                entity: "supplier",
                key: new.tax_id,
            });
        }
        let now = Utc::now();
        let supplier = Supplier {
            tenant_id: new.tenant_id,
            tax_id: new.tax_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            city: new.city,
            active: true,
            created_at: now,
            updated_at: now,
        };
        inner.tables.suppliers.insert(key, supplier.clone());
        Ok(supplier)
    }

    async fn get_supplier(&self, tenant: TenantId, tax_id: &str) -> StoreResult<Option<Supplier>> {
        Ok(self
            .lock()
            .tables
            .suppliers
            .get(&(tenant.0, tax_id.to_string()))
            .cloned())
    }

    async fn update_supplier(
        &self,
        tenant: TenantId,
        tax_id: &str,
        patch: SupplierPatch,
    ) -> StoreResult<Option<Supplier>> {
        let mut inner = self.lock();
        let Some(supplier) = inner
            .tables
            .suppliers
            .get_mut(&(tenant.0, tax_id.to_string()))
        else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            supplier.name = name;
        }
        if let Some(email) = patch.email {
            supplier.email = Some(email);
        }
        if let Some(phone) = patch.phone {
            supplier.phone = Some(phone);
        }
        if let Some(address) = patch.address {
            supplier.address = Some(address);
        }
        if let Some(city) = patch.city {
            supplier.city = Some(city);
        }
        if let Some(active) = patch.active {
            supplier.active = active;
        }
        supplier.updated_at = Utc::now();
        Ok(Some(supplier.clone()))
    }

    async fn delete_supplier(&self, tenant: TenantId, tax_id: &str) -> StoreResult<bool> {
        Ok(self
            .lock()
            .tables
            .suppliers
            .remove(&(tenant.0, tax_id.to_string()))
            .is_some())
    }

    async fn insert_employee(&self, new: NewEmployee) -> StoreResult<Employee> {
        let mut inner = self.lock();
        let id = inner.tables.next_id();
        let now = Utc::now();
        let employee = Employee {
            id: EmployeeId::new(id),
            tenant_id: new.tenant_id,
            tax_id: new.tax_id,
            first_name: new.first_name,
            last_name: new.last_name,
            active: true,
            created_at: now,
            updated_at: now,
        };
        inner
            .tables
            .employees
            .insert((new.tenant_id.0, id), employee.clone());
        Ok(employee)
    }

    async fn get_employee(
        &self,
        tenant: TenantId,
        id: EmployeeId,
    ) -> StoreResult<Option<Employee>> {
        Ok(self.lock().tables.employees.get(&(tenant.0, id.0)).cloned())
    }

    async fn update_employee(
        &self,
        tenant: TenantId,
        id: EmployeeId,
        patch: EmployeePatch,
    ) -> StoreResult<Option<Employee>> {
        let mut inner = self.lock();
        let Some(employee) = inner.tables.employees.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        if let Some(first_name) = patch.first_name {
            employee.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            employee.last_name = last_name;
        }
        if let Some(tax_id) = patch.tax_id {
            employee.tax_id = tax_id;
        }
        if let Some(active) = patch.active {
            employee.active = active;
        }
        employee.updated_at = Utc::now();
        Ok(Some(employee.clone()))
    }

    async fn delete_employee(&self, tenant: TenantId, id: EmployeeId) -> StoreResult<bool> {
        Ok(self
            .lock()
            .tables
            .employees
            .remove(&(tenant.0, id.0))
            .is_some())
    }

    async fn count_shifts(&self, tenant: TenantId, employee: EmployeeId) -> StoreResult<u64> {
        Ok(self
            .lock()
            .tables
            .shift_counts
            .get(&(tenant.0, employee.0))
            .copied()
            .unwrap_or(0))
    }

    async fn insert_check(&self, new: NewCheck) -> StoreResult<Check> {
        let mut inner = self.lock();
        let duplicate = inner
            .tables
            .checks
            .range((new.tenant_id.0, i64::MIN)..=(new.tenant_id.0, i64::MAX))
            .any(|(_, c)| c.serial == new.serial);
        if duplicate {
            return Err(StoreError::Duplicate {
                entity: "check",
                key: new.serial,
            });
        }
        let id = inner.tables.next_id();
        let now = Utc::now();
        let check = Check {
            id: CheckId::new(id),
            tenant_id: new.tenant_id,
            serial: new.serial,
            bank: new.bank,
            state: CheckState::Available,
            invoice_id: None,
            amount: None,
            beneficiary: None,
            issue_date: None,
            cash_date: None,
            note: new.note,
            created_at: now,
            updated_at: now,
        };
        inner
            .tables
            .checks
            .insert((new.tenant_id.0, id), check.clone());
        Ok(check)
    }

    async fn get_check(&self, tenant: TenantId, id: CheckId) -> StoreResult<Option<Check>> {
        Ok(self.lock().tables.checks.get(&(tenant.0, id.0)).cloned())
    }

    async fn find_check_by_serial(
        &self,
        tenant: TenantId,
        serial: &str,
    ) -> StoreResult<Option<Check>> {
        let inner = self.lock();
        Ok(inner
            .tables
            .checks
            .range((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
            .map(|(_, c)| c)
            .find(|c| c.serial == serial)
            .cloned())
    }

    async fn list_checks(&self, tenant: TenantId, filter: CheckFilter) -> StoreResult<Vec<Check>> {
        let inner = self.lock();
        let mut checks: Vec<Check> = inner
            .tables
            .checks
            .range((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
            .map(|(_, c)| c)
            .filter(|c| {
                filter.state.is_none_or(|s| c.state == s)
                    && filter.invoice_id.is_none_or(|inv| c.invoice_id == Some(inv))
            })
            .cloned()
            .collect();
        // Numeric serials compare by value so "999" precedes "1000".
        checks.sort_by(|a, b| {
            (a.serial.parse::<u64>().ok(), &a.serial).cmp(&(b.serial.parse::<u64>().ok(), &b.serial))
        });
        Ok(checks)
    }

    async fn update_check(
        &self,
        tenant: TenantId,
        id: CheckId,
        patch: CheckPatch,
    ) -> StoreResult<Option<Check>> {
        let mut inner = self.lock();
        let Some(check) = inner.tables.checks.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        apply_check_patch(check, patch);
        Ok(Some(check.clone()))
    }

    async fn update_check_if_state(
        &self,
        tenant: TenantId,
        id: CheckId,
        expected: CheckState,
        patch: CheckPatch,
    ) -> StoreResult<Option<Check>> {
        let mut inner = self.lock();
        let Some(check) = inner.tables.checks.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        if check.state != expected {
            return Ok(None);
        }
        apply_check_patch(check, patch);
        Ok(Some(check.clone()))
    }

    async fn delete_check_if_state(
        &self,
        tenant: TenantId,
        id: CheckId,
        expected: CheckState,
    ) -> StoreResult<bool> {
        let mut inner = self.lock();
        let matches = inner
            .tables
            .checks
            .get(&(tenant.0, id.0))
            .is_some_and(|c| c.state == expected);
        if matches {
            inner.tables.checks.remove(&(tenant.0, id.0));
        }
        Ok(matches)
    }

    async fn insert_transfer(&self, new: NewTransfer) -> StoreResult<BankTransfer> {
        let mut inner = self.lock();
        let id = inner.tables.next_id();
        let now = Utc::now();
        let transfer = BankTransfer {
            id: TransferId::new(id),
            tenant_id: new.tenant_id,
            transfer_date: new.transfer_date,
            beneficiary: new.beneficiary,
            iban: new.iban,
            amount: new.amount,
            reason: new.reason,
            linked: false,
            invoice_id: None,
            payslip_id: None,
            source_file: new.source_file,
            created_at: now,
            updated_at: now,
        };
        inner
            .tables
            .transfers
            .insert((new.tenant_id.0, id), transfer.clone());
        Ok(transfer)
    }

    async fn get_transfer(
        &self,
        tenant: TenantId,
        id: TransferId,
    ) -> StoreResult<Option<BankTransfer>> {
        Ok(self.lock().tables.transfers.get(&(tenant.0, id.0)).cloned())
    }

    async fn list_transfers(
        &self,
        tenant: TenantId,
        filter: TransferFilter,
    ) -> StoreResult<Vec<BankTransfer>> {
        let inner = self.lock();
        let mut transfers: Vec<BankTransfer> = inner
            .tables
            .transfers
            .range((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
            .map(|(_, t)| t)
            .filter(|t| {
                filter.linked.is_none_or(|l| t.linked == l)
                    && filter.invoice_id.is_none_or(|inv| t.invoice_id == Some(inv))
            })
            .cloned()
            .collect();
        transfers.sort_by(|a, b| b.transfer_date.cmp(&a.transfer_date).then(b.id.cmp(&a.id)));
        Ok(transfers)
    }

    async fn update_transfer(
        &self,
        tenant: TenantId,
        id: TransferId,
        patch: TransferPatch,
    ) -> StoreResult<Option<BankTransfer>> {
        let mut inner = self.lock();
        let Some(transfer) = inner.tables.transfers.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        apply_transfer_patch(transfer, patch);
        Ok(Some(transfer.clone()))
    }

    async fn update_transfer_if_unlinked(
        &self,
        tenant: TenantId,
        id: TransferId,
        patch: TransferPatch,
    ) -> StoreResult<Option<BankTransfer>> {
        let mut inner = self.lock();
        let Some(transfer) = inner.tables.transfers.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        if transfer.linked {
            return Ok(None);
        }
        apply_transfer_patch(transfer, patch);
        Ok(Some(transfer.clone()))
    }

    async fn update_transfers_by_invoice(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
        patch: TransferPatch,
    ) -> StoreResult<u64> {
        let mut inner = self.lock();
        let mut touched = 0;
        for (_, transfer) in inner
            .tables
            .transfers
            .range_mut((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
        {
            if transfer.invoice_id == Some(invoice) {
                apply_transfer_patch(transfer, patch.clone());
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn delete_transfer(&self, tenant: TenantId, id: TransferId) -> StoreResult<bool> {
        Ok(self
            .lock()
            .tables
            .transfers
            .remove(&(tenant.0, id.0))
            .is_some())
    }

    async fn insert_cash_entry(&self, new: NewCashEntry) -> StoreResult<CashLedgerEntry> {
        let mut inner = self.lock();
        Self::take_fault(&mut inner, Fault::CashEntryInsert)?;
        let id = inner.tables.next_id();
        let entry = CashLedgerEntry {
            id: CashEntryId::new(id),
            tenant_id: new.tenant_id,
            entry_date: new.entry_date,
            amount: new.amount,
            category: new.category,
            description: new.description,
            note: new.note,
            invoice_id: new.invoice_id,
            created_at: Utc::now(),
        };
        inner
            .tables
            .cash_entries
            .insert((new.tenant_id.0, id), entry.clone());
        Ok(entry)
    }

    async fn list_cash_entries(
        &self,
        tenant: TenantId,
        filter: CashEntryFilter,
    ) -> StoreResult<Vec<CashLedgerEntry>> {
        let inner = self.lock();
        let mut entries: Vec<CashLedgerEntry> = inner
            .tables
            .cash_entries
            .range((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
            .map(|(_, e)| e)
            .filter(|e| filter.invoice_id.is_none_or(|inv| e.invoice_id == Some(inv)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn delete_cash_entries_by_invoice(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
    ) -> StoreResult<u64> {
        let mut inner = self.lock();
        let before = inner.tables.cash_entries.len();
        inner
            .tables
            .cash_entries
            .retain(|(t, _), e| *t != tenant.0 || e.invoice_id != Some(invoice));
        Ok((before - inner.tables.cash_entries.len()) as u64)
    }

    async fn insert_bank_entry(&self, new: NewBankEntry) -> StoreResult<BankLedgerEntry> {
        let mut inner = self.lock();
        Self::take_fault(&mut inner, Fault::BankEntryInsert)?;
        let id = inner.tables.next_id();
        let entry = BankLedgerEntry {
            id: BankEntryId::new(id),
            tenant_id: new.tenant_id,
            entry_date: new.entry_date,
            amount: new.amount,
            category: new.category,
            description: new.description,
            invoice_id: new.invoice_id,
            check_id: new.check_id,
            reconciled: false,
            created_at: Utc::now(),
        };
        inner
            .tables
            .bank_entries
            .insert((new.tenant_id.0, id), entry.clone());
        Ok(entry)
    }

    async fn get_bank_entry(
        &self,
        tenant: TenantId,
        id: BankEntryId,
    ) -> StoreResult<Option<BankLedgerEntry>> {
        Ok(self
            .lock()
            .tables
            .bank_entries
            .get(&(tenant.0, id.0))
            .cloned())
    }

    async fn list_bank_entries(
        &self,
        tenant: TenantId,
        filter: BankEntryFilter,
    ) -> StoreResult<Vec<BankLedgerEntry>> {
        let inner = self.lock();
        let mut entries: Vec<BankLedgerEntry> = inner
            .tables
            .bank_entries
            .range((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
            .map(|(_, e)| e)
            .filter(|e| {
                filter.invoice_id.is_none_or(|inv| e.invoice_id == Some(inv))
                    && filter.reconciled.is_none_or(|r| e.reconciled == r)
            })
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn update_bank_entry(
        &self,
        tenant: TenantId,
        id: BankEntryId,
        patch: BankEntryPatch,
    ) -> StoreResult<Option<BankLedgerEntry>> {
        let mut inner = self.lock();
        let Some(entry) = inner.tables.bank_entries.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        if let Some(reconciled) = patch.reconciled {
            entry.reconciled = reconciled;
        }
        Ok(Some(entry.clone()))
    }

    async fn update_bank_entry_if_unreconciled(
        &self,
        tenant: TenantId,
        id: BankEntryId,
        patch: BankEntryPatch,
    ) -> StoreResult<Option<BankLedgerEntry>> {
        let mut inner = self.lock();
        let Some(entry) = inner.tables.bank_entries.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        if entry.reconciled {
            return Ok(None);
        }
        if let Some(reconciled) = patch.reconciled {
            entry.reconciled = reconciled;
        }
        Ok(Some(entry.clone()))
    }

    async fn delete_bank_entries_by_invoice(
        &self,
        tenant: TenantId,
        invoice: InvoiceId,
    ) -> StoreResult<u64> {
        let mut inner = self.lock();
        let before = inner.tables.bank_entries.len();
        inner
            .tables
            .bank_entries
            .retain(|(t, _), e| *t != tenant.0 || e.invoice_id != Some(invoice));
        Ok((before - inner.tables.bank_entries.len()) as u64)
    }

    async fn insert_payslip(&self, new: NewPayslip) -> StoreResult<Payslip> {
        let mut inner = self.lock();
        let id = inner.tables.next_id();
        let now = Utc::now();
        let payslip = Payslip {
            id: PayslipId::new(id),
            tenant_id: new.tenant_id,
            employee_id: new.employee_id,
            period: new.period,
            gross_amount: new.gross_amount,
            net_amount: new.net_amount,
            state: PayslipState::Due,
            paid_by_entry: None,
            created_at: now,
            updated_at: now,
        };
        inner
            .tables
            .payslips
            .insert((new.tenant_id.0, id), payslip.clone());
        Ok(payslip)
    }

    async fn get_payslip(&self, tenant: TenantId, id: PayslipId) -> StoreResult<Option<Payslip>> {
        Ok(self.lock().tables.payslips.get(&(tenant.0, id.0)).cloned())
    }

    async fn list_payslips(
        &self,
        tenant: TenantId,
        filter: PayslipFilter,
    ) -> StoreResult<Vec<Payslip>> {
        let inner = self.lock();
        Ok(inner
            .tables
            .payslips
            .range((tenant.0, i64::MIN)..=(tenant.0, i64::MAX))
            .map(|(_, p)| p)
            .filter(|p| {
                filter.employee_id.is_none_or(|e| p.employee_id == e)
                    && filter.state.is_none_or(|s| p.state == s)
            })
            .cloned()
            .collect())
    }

    async fn update_payslip(
        &self,
        tenant: TenantId,
        id: PayslipId,
        patch: PayslipPatch,
    ) -> StoreResult<Option<Payslip>> {
        let mut inner = self.lock();
        let Some(payslip) = inner.tables.payslips.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        apply_payslip_patch(payslip, patch);
        Ok(Some(payslip.clone()))
    }

    async fn update_payslip_if_state(
        &self,
        tenant: TenantId,
        id: PayslipId,
        expected: PayslipState,
        patch: PayslipPatch,
    ) -> StoreResult<Option<Payslip>> {
        let mut inner = self.lock();
        let Some(payslip) = inner.tables.payslips.get_mut(&(tenant.0, id.0)) else {
            return Ok(None);
        };
        if payslip.state != expected {
            return Ok(None);
        }
        apply_payslip_patch(payslip, patch);
        Ok(Some(payslip.clone()))
    }
}
