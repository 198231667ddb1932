//! Reconciliation Matcher error types.

use primanota_shared::AppError;
use primanota_shared::types::{BankEntryId, InvoiceId, TransferId};
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while matching or confirming a reconciliation.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Bank transfer not found for the tenant.
    #[error("Bank transfer not found: {0}")]
    TransferNotFound(TransferId),

    /// Invoice not found for the tenant.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Bank ledger entry not found for the tenant.
    #[error("Bank ledger entry not found: {0}")]
    BankEntryNotFound(BankEntryId),

    /// Matching is only defined for unlinked transfers.
    #[error("Transfer {0} is already linked")]
    TransferAlreadyLinked(TransferId),

    /// The bank ledger entry is already reconciled.
    #[error("Bank ledger entry {0} is already reconciled")]
    EntryAlreadyReconciled(BankEntryId),

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

impl From<StoreError> for ReconciliationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { entity, id } => Self::Conflict { entity, id },
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<ReconciliationError> for AppError {
    fn from(err: ReconciliationError) -> Self {
        let message = err.to_string();
        match err {
            ReconciliationError::TransferNotFound(_)
            | ReconciliationError::InvoiceNotFound(_)
            | ReconciliationError::BankEntryNotFound(_) => Self::NotFound(message),
            ReconciliationError::TransferAlreadyLinked(_)
            | ReconciliationError::EntryAlreadyReconciled(_) => Self::InvalidState(message),
            ReconciliationError::Conflict { .. } => Self::Conflict(message),
            ReconciliationError::Store(_) => Self::Store(message),
        }
    }
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::BankEntryNotFound(_) => "BANK_ENTRY_NOT_FOUND",
            Self::TransferAlreadyLinked(_) => "TRANSFER_ALREADY_LINKED",
            Self::EntryAlreadyReconciled(_) => "ENTRY_ALREADY_RECONCILED",
            Self::Conflict { .. } => "CONCURRENT_MODIFICATION",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::TransferNotFound(_) | Self::InvoiceNotFound(_) | Self::BankEntryNotFound(_) => {
                404
            }
            Self::TransferAlreadyLinked(_) | Self::EntryAlreadyReconciled(_) => 400,
            Self::Conflict { .. } => 409,
            Self::Store(_) => 500,
        }
    }
}
