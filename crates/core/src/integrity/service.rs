//! Delete gating and cascade execution.

use std::sync::Arc;

use primanota_shared::types::{CheckId, EmployeeId, InvoiceId, TenantId, TransferId};
use tracing::{info, instrument, warn};

use crate::integrity::error::IntegrityError;
use crate::integrity::types::{CascadeReport, DeleteOutcome, DependencySummary, PermissionCheck};
use crate::model::{CheckState, Invoice};
use crate::store::{
    CheckFilter, CheckPatch, EmployeePatch, EntityStore, InvoiceFilter, Patch, PayslipFilter,
    SupplierPatch, transfer_unlink_patch,
};

/// Gates every delete operation on dependent-record existence.
pub struct IntegrityGuard<S> {
    store: Arc<S>,
}

impl<S: EntityStore> IntegrityGuard<S> {
    /// Creates a guard over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Deletes an invoice together with every record that exists solely to
    /// support it: its lines and its ledger entries are removed, linked
    /// transfers are preserved but unlinked, issued checks are reverted to
    /// available, cashed checks keep their history and only lose the invoice
    /// pointer. Atomic: all steps commit together or none do.
    #[instrument(skip(self))]
    pub async fn delete_invoice_cascade(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<CascadeReport, IntegrityError> {
        let invoice = self
            .store
            .get_invoice(tenant, invoice_id)
            .await?
            .ok_or(IntegrityError::InvoiceNotFound(invoice_id))?;

        self.store.begin().await?;
        match self.cascade_steps(tenant, &invoice).await {
            Ok(report) => {
                self.store.commit().await?;
                info!(
                    invoice_id = %invoice_id,
                    lines = report.invoice_lines,
                    cash = report.cash_entries,
                    bank = report.bank_entries,
                    transfers = report.transfers_unlinked,
                    checks = report.checks_reverted,
                    "invoice cascade delete committed"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(invoice_id = %invoice_id, error = %err, "invoice cascade delete rolled back");
                self.store.rollback().await?;
                Err(err)
            }
        }
    }

    async fn cascade_steps(
        &self,
        tenant: TenantId,
        invoice: &Invoice,
    ) -> Result<CascadeReport, IntegrityError> {
        let invoice_lines = self.store.delete_invoice_lines(tenant, invoice.id).await?;
        let cash_entries = self
            .store
            .delete_cash_entries_by_invoice(tenant, invoice.id)
            .await?;
        let bank_entries = self
            .store
            .delete_bank_entries_by_invoice(tenant, invoice.id)
            .await?;
        let transfers_unlinked = self
            .store
            .update_transfers_by_invoice(tenant, invoice.id, transfer_unlink_patch())
            .await?;

        let mut checks_reverted = 0;
        let linked_checks = self
            .store
            .list_checks(
                tenant,
                CheckFilter {
                    invoice_id: Some(invoice.id),
                    state: None,
                },
            )
            .await?;
        for check in linked_checks {
            match check.state {
                CheckState::Issued => {
                    let reverted = self
                        .store
                        .update_check_if_state(
                            tenant,
                            check.id,
                            CheckState::Issued,
                            CheckPatch {
                                state: Some(CheckState::Available),
                                invoice_id: Patch::Clear,
                                amount: Patch::Clear,
                                beneficiary: Patch::Clear,
                                issue_date: Patch::Clear,
                                ..Default::default()
                            },
                        )
                        .await?;
                    if reverted.is_some() {
                        checks_reverted += 1;
                    }
                }
                CheckState::Cashed => {
                    // Financial history stays intact, only the dangling
                    // pointer goes away.
                    self.store
                        .update_check(
                            tenant,
                            check.id,
                            CheckPatch {
                                invoice_id: Patch::Clear,
                                ..Default::default()
                            },
                        )
                        .await?;
                }
                CheckState::Available | CheckState::Voided => {}
            }
        }

        let removed = self
            .store
            .delete_invoice(tenant, invoice.id, invoice.version)
            .await?;
        if !removed {
            return Err(IntegrityError::Conflict {
                entity: "invoice",
                id: invoice.id.into_inner(),
            });
        }

        Ok(CascadeReport {
            invoice_lines,
            cash_entries,
            bank_entries,
            transfers_unlinked,
            checks_reverted,
        })
    }

    /// Deletes a supplier if nothing references it; deactivates it when
    /// `force` is set and dependents exist; rejects otherwise, mutating
    /// nothing.
    #[instrument(skip(self))]
    pub async fn delete_supplier_safe(
        &self,
        tenant: TenantId,
        tax_id: &str,
        force: bool,
    ) -> Result<DeleteOutcome, IntegrityError> {
        self.store
            .get_supplier(tenant, tax_id)
            .await?
            .ok_or_else(|| IntegrityError::SupplierNotFound(tax_id.to_string()))?;

        let invoices = self
            .store
            .list_invoices(
                tenant,
                InvoiceFilter {
                    supplier_tax_id: Some(tax_id.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        let dependents = invoices.len() as u64;

        if dependents == 0 {
            self.store.delete_supplier(tenant, tax_id).await?;
            info!(tax_id, "supplier hard-deleted");
            return Ok(DeleteOutcome::HardDeleted);
        }
        if !force {
            return Err(IntegrityError::SupplierHasDependents {
                invoices: dependents,
            });
        }

        self.store
            .update_supplier(
                tenant,
                tax_id,
                SupplierPatch {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        info!(tax_id, dependents, "supplier soft-deleted");
        Ok(DeleteOutcome::SoftDeleted { dependents })
    }

    /// Deletes an employee if no payslips or shift records reference them;
    /// deactivates when `force` is set; rejects otherwise.
    #[instrument(skip(self))]
    pub async fn delete_employee_safe(
        &self,
        tenant: TenantId,
        employee_id: EmployeeId,
        force: bool,
    ) -> Result<DeleteOutcome, IntegrityError> {
        self.store
            .get_employee(tenant, employee_id)
            .await?
            .ok_or(IntegrityError::EmployeeNotFound(employee_id))?;

        let payslips = self
            .store
            .list_payslips(
                tenant,
                PayslipFilter {
                    employee_id: Some(employee_id),
                    state: None,
                },
            )
            .await?
            .len() as u64;
        let shifts = self.store.count_shifts(tenant, employee_id).await?;
        let dependents = payslips + shifts;

        if dependents == 0 {
            self.store.delete_employee(tenant, employee_id).await?;
            info!(employee_id = %employee_id, "employee hard-deleted");
            return Ok(DeleteOutcome::HardDeleted);
        }
        if !force {
            return Err(IntegrityError::EmployeeHasDependents { payslips, shifts });
        }

        self.store
            .update_employee(
                tenant,
                employee_id,
                EmployeePatch {
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await?;
        info!(employee_id = %employee_id, dependents, "employee soft-deleted");
        Ok(DeleteOutcome::SoftDeleted { dependents })
    }

    /// Deletes a check only while it is still blank. Issued and cashed
    /// checks are financial history and are never deleted; the error names
    /// the offending state.
    #[instrument(skip(self))]
    pub async fn delete_check_safe(
        &self,
        tenant: TenantId,
        check_id: CheckId,
    ) -> Result<(), IntegrityError> {
        let check = self
            .store
            .get_check(tenant, check_id)
            .await?
            .ok_or(IntegrityError::CheckNotFound(check_id))?;
        if check.state != CheckState::Available {
            return Err(IntegrityError::CheckNotDeletable { state: check.state });
        }

        // Conditional delete: the state may have moved since the read above.
        let removed = self
            .store
            .delete_check_if_state(tenant, check_id, CheckState::Available)
            .await?;
        if !removed {
            let current = self.store.get_check(tenant, check_id).await?;
            return match current {
                Some(c) => Err(IntegrityError::CheckNotDeletable { state: c.state }),
                None => Err(IntegrityError::CheckNotFound(check_id)),
            };
        }
        info!(check_id = %check_id, "check deleted");
        Ok(())
    }

    /// Read-only dependency breakdown for a supplier.
    #[instrument(skip(self))]
    pub async fn get_supplier_dependencies(
        &self,
        tenant: TenantId,
        tax_id: &str,
    ) -> Result<DependencySummary, IntegrityError> {
        self.store
            .get_supplier(tenant, tax_id)
            .await?
            .ok_or_else(|| IntegrityError::SupplierNotFound(tax_id.to_string()))?;

        let invoices = self
            .store
            .list_invoices(
                tenant,
                InvoiceFilter {
                    supplier_tax_id: Some(tax_id.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        let paid = invoices.iter().filter(|i| i.paid).count() as u64;
        let total = invoices.len() as u64;
        Ok(DependencySummary {
            total_invoices: total,
            paid_invoices: paid,
            unpaid_invoices: total - paid,
            can_delete: total == 0,
        })
    }

    /// A transfer may be deleted only while unlinked.
    #[instrument(skip(self))]
    pub async fn check_can_delete_bank_transfer(
        &self,
        tenant: TenantId,
        transfer_id: TransferId,
    ) -> Result<PermissionCheck, IntegrityError> {
        let transfer = self
            .store
            .get_transfer(tenant, transfer_id)
            .await?
            .ok_or(IntegrityError::TransferNotFound(transfer_id))?;
        if transfer.linked {
            return Ok(PermissionCheck::denied(
                "transfer is linked to an invoice or payslip; unlink it first",
            ));
        }
        Ok(PermissionCheck::allowed())
    }

    /// A paid invoice is frozen until its payment is reversed.
    #[instrument(skip(self))]
    pub async fn check_can_modify_paid_invoice(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
    ) -> Result<PermissionCheck, IntegrityError> {
        let invoice = self
            .store
            .get_invoice(tenant, invoice_id)
            .await?
            .ok_or(IntegrityError::InvoiceNotFound(invoice_id))?;
        if invoice.paid {
            return Ok(PermissionCheck::denied(
                "invoice is paid; reverse the payment before editing",
            ));
        }
        Ok(PermissionCheck::allowed())
    }
}
