//! Integrity Guard error types.

use primanota_shared::AppError;
use primanota_shared::types::{CheckId, EmployeeId, InvoiceId, TransferId};
use thiserror::Error;

use crate::model::CheckState;
use crate::store::StoreError;

/// Errors that can occur while gating or executing a delete.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// Invoice not found for the tenant.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Supplier not found for the tenant.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    /// Employee not found for the tenant.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    /// Check not found for the tenant.
    #[error("Check not found: {0}")]
    CheckNotFound(CheckId),

    /// Bank transfer not found for the tenant.
    #[error("Bank transfer not found: {0}")]
    TransferNotFound(TransferId),

    /// Supplier delete blocked by referencing invoices.
    #[error("Supplier has {invoices} dependent invoice(s); pass force to deactivate instead")]
    SupplierHasDependents {
        /// Number of invoices referencing the supplier.
        invoices: u64,
    },

    /// Employee delete blocked by payslips or shift records.
    #[error(
        "Employee has {payslips} payslip(s) and {shifts} shift record(s); pass force to deactivate instead"
    )]
    EmployeeHasDependents {
        /// Number of payslips referencing the employee.
        payslips: u64,
        /// Number of shift records referencing the employee.
        shifts: u64,
    },

    /// Check delete permitted only in the `available` state.
    #[error("Cannot delete check in state '{state}': only available checks can be deleted")]
    CheckNotDeletable {
        /// Current state of the check.
        state: CheckState,
    },

    /// Concurrent modification detected.
    #[error("Concurrent modification of {entity} {id}, please retry")]
    Conflict {
        /// Entity kind.
        entity: &'static str,
        /// Row id.
        id: i64,
    },

    /// Store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for IntegrityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { entity, id } => Self::Conflict { entity, id },
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<IntegrityError> for AppError {
    fn from(err: IntegrityError) -> Self {
        let message = err.to_string();
        match err {
            IntegrityError::InvoiceNotFound(_)
            | IntegrityError::SupplierNotFound(_)
            | IntegrityError::EmployeeNotFound(_)
            | IntegrityError::CheckNotFound(_)
            | IntegrityError::TransferNotFound(_) => Self::NotFound(message),
            IntegrityError::SupplierHasDependents { .. }
            | IntegrityError::EmployeeHasDependents { .. }
            | IntegrityError::CheckNotDeletable { .. } => Self::IntegrityViolation(message),
            IntegrityError::Conflict { .. } => Self::Conflict(message),
            IntegrityError::Store(_) => Self::Store(message),
        }
    }
}

impl IntegrityError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::SupplierNotFound(_) => "SUPPLIER_NOT_FOUND",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::CheckNotFound(_) => "CHECK_NOT_FOUND",
            Self::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            Self::SupplierHasDependents { .. } => "SUPPLIER_HAS_DEPENDENTS",
            Self::EmployeeHasDependents { .. } => "EMPLOYEE_HAS_DEPENDENTS",
            Self::CheckNotDeletable { .. } => "CHECK_NOT_DELETABLE",
            Self::Conflict { .. } => "CONCURRENT_MODIFICATION",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvoiceNotFound(_)
            | Self::SupplierNotFound(_)
            | Self::EmployeeNotFound(_)
            | Self::CheckNotFound(_)
            | Self::TransferNotFound(_) => 404,

            Self::SupplierHasDependents { .. }
            | Self::EmployeeHasDependents { .. }
            | Self::CheckNotDeletable { .. } => 400,

            Self::Conflict { .. } => 409,

            Self::Store(_) => 500,
        }
    }
}
