//! Propagation Engine error types.

use primanota_shared::AppError;
use primanota_shared::types::EmployeeId;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during a propagated master-record update.
#[derive(Debug, Error)]
pub enum PropagationError {
    /// Supplier not found for the tenant.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    /// Employee not found for the tenant.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    /// The changes payload has no fields set.
    #[error("No fields to update")]
    EmptyChanges,

    /// The master update committed but the denormalized rewrite stopped
    /// partway. The count tells the caller how many invoices were rewritten
    /// before the failure so the mismatch is detectable.
    #[error(
        "Supplier updated but name propagation stopped after {invoices_updated} invoice(s): {cause}"
    )]
    PartialPropagation {
        /// Invoices rewritten before the failure.
        invoices_updated: u64,
        /// Underlying failure.
        cause: String,
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

impl From<StoreError> for PropagationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { entity, id } => Self::Conflict { entity, id },
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<PropagationError> for AppError {
    fn from(err: PropagationError) -> Self {
        let message = err.to_string();
        match err {
            PropagationError::SupplierNotFound(_) | PropagationError::EmployeeNotFound(_) => {
                Self::NotFound(message)
            }
            PropagationError::EmptyChanges => Self::Validation(message),
            PropagationError::Conflict { .. } => Self::Conflict(message),
            PropagationError::PartialPropagation { .. } | PropagationError::Store(_) => {
                Self::Store(message)
            }
        }
    }
}

impl PropagationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SupplierNotFound(_) => "SUPPLIER_NOT_FOUND",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::EmptyChanges => "EMPTY_CHANGES",
            Self::PartialPropagation { .. } => "PARTIAL_PROPAGATION",
            Self::Conflict { .. } => "CONCURRENT_MODIFICATION",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::SupplierNotFound(_) | Self::EmployeeNotFound(_) => 404,
            Self::EmptyChanges => 400,
            Self::Conflict { .. } => 409,
            Self::PartialPropagation { .. } | Self::Store(_) => 500,
        }
    }
}
