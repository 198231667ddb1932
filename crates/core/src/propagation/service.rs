//! Master-record updates with denormalized-field propagation.

use std::sync::Arc;

use primanota_shared::types::{EmployeeId, TenantId};
use tracing::{info, instrument, warn};

use crate::model::{EmployeeChanges, SupplierChanges};
use crate::propagation::error::PropagationError;
use crate::propagation::types::{EmployeePropagationReport, SupplierPropagationReport};
use crate::store::{EmployeePatch, EntityStore, InvoiceFilter, InvoicePatch, SupplierPatch};

/// Applies master-record edits and rewrites denormalized display fields on
/// dependent records.
pub struct PropagationEngine<S> {
    store: Arc<S>,
}

impl<S: EntityStore> PropagationEngine<S> {
    /// Creates an engine over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Applies `changes` to a supplier. If the display name changed, the
    /// denormalized supplier name on every referencing invoice is rewritten.
    ///
    /// The rewrite is best-effort, not atomic with the master update: if it
    /// stops partway the error carries how many invoices were rewritten so
    /// the caller can detect the mismatch and retry.
    #[instrument(skip(self, changes))]
    pub async fn update_supplier_propagate(
        &self,
        tenant: TenantId,
        tax_id: &str,
        changes: SupplierChanges,
    ) -> Result<SupplierPropagationReport, PropagationError> {
        if changes.is_empty() {
            return Err(PropagationError::EmptyChanges);
        }
        let supplier = self
            .store
            .get_supplier(tenant, tax_id)
            .await?
            .ok_or_else(|| PropagationError::SupplierNotFound(tax_id.to_string()))?;

        let new_name = changes
            .name
            .as_ref()
            .filter(|n| **n != supplier.name)
            .cloned();

        let updated = self
            .store
            .update_supplier(
                tenant,
                tax_id,
                SupplierPatch {
                    name: changes.name,
                    email: changes.email,
                    phone: changes.phone,
                    address: changes.address,
                    city: changes.city,
                    active: None,
                },
            )
            .await?
            .ok_or_else(|| PropagationError::SupplierNotFound(tax_id.to_string()))?;

        let Some(name) = new_name else {
            return Ok(SupplierPropagationReport {
                supplier: updated,
                propagation_required: false,
                invoices_updated: 0,
            });
        };

        let invoices_updated = self.rewrite_invoice_names(tenant, tax_id, &name).await?;
        info!(tax_id, invoices_updated, "supplier name propagated");
        Ok(SupplierPropagationReport {
            supplier: updated,
            propagation_required: true,
            invoices_updated,
        })
    }

    /// Rewrites the denormalized supplier name on each referencing invoice,
    /// one row at a time so a failure yields an accurate partial count.
    async fn rewrite_invoice_names(
        &self,
        tenant: TenantId,
        tax_id: &str,
        name: &str,
    ) -> Result<u64, PropagationError> {
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

        let mut updated = 0;
        for invoice in invoices {
            let result = self
                .store
                .update_invoice(
                    tenant,
                    invoice.id,
                    InvoicePatch {
                        supplier_name: Some(name.to_string()),
                        ..Default::default()
                    },
                )
                .await;
            match result {
                Ok(_) => updated += 1,
                Err(err) => {
                    warn!(
                        tax_id,
                        invoice_id = %invoice.id,
                        updated,
                        error = %err,
                        "supplier name propagation stopped partway"
                    );
                    return Err(PropagationError::PartialPropagation {
                        invoices_updated: updated,
                        cause: err.to_string(),
                    });
                }
            }
        }
        Ok(updated)
    }

    /// Applies `changes` to an employee. Payslips and shift records join the
    /// employee by id, so no dependent rewrite happens; the report states
    /// the policy explicitly.
    #[instrument(skip(self, changes))]
    pub async fn update_employee_propagate(
        &self,
        tenant: TenantId,
        employee_id: EmployeeId,
        changes: EmployeeChanges,
    ) -> Result<EmployeePropagationReport, PropagationError> {
        if changes.is_empty() {
            return Err(PropagationError::EmptyChanges);
        }
        let employee = self
            .store
            .update_employee(
                tenant,
                employee_id,
                EmployeePatch {
                    first_name: changes.first_name,
                    last_name: changes.last_name,
                    tax_id: changes.tax_id,
                    active: None,
                },
            )
            .await?
            .ok_or(PropagationError::EmployeeNotFound(employee_id))?;

        Ok(EmployeePropagationReport {
            employee,
            propagation_required: false,
        })
    }
}
