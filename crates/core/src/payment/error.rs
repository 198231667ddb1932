//! Payment Registrar error types.

use primanota_shared::AppError;
use primanota_shared::types::{CheckId, InvoiceId, PayslipId, TransferId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::{CheckState, PaymentMethod};
use crate::store::StoreError;

/// Errors that can occur while registering a payment or moving a payment
/// instrument through its lifecycle.
#[derive(Debug, Error)]
pub enum PaymentError {
    // ========== Not found ==========
    /// Invoice not found for the tenant.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Check not found for the tenant.
    #[error("Check not found: {0}")]
    CheckNotFound(CheckId),

    /// Bank transfer not found for the tenant.
    #[error("Bank transfer not found: {0}")]
    TransferNotFound(TransferId),

    /// Payslip not found for the tenant.
    #[error("Payslip not found: {0}")]
    PayslipNotFound(PayslipId),

    // ========== Invalid state ==========
    /// The invoice is already settled.
    #[error("Invoice {0} is already paid")]
    InvoiceAlreadyPaid(InvoiceId),

    /// The check is not in the state the operation requires.
    #[error("Check {id} is '{state}', expected '{expected}'")]
    CheckNotInState {
        /// Check id.
        id: CheckId,
        /// Current state.
        state: CheckState,
        /// State the operation requires.
        expected: CheckState,
    },

    /// The transfer is already linked to an invoice or payslip.
    #[error("Transfer {0} is already linked")]
    TransferAlreadyLinked(TransferId),

    /// The payslip is already paid.
    #[error("Payslip {0} is already paid")]
    PayslipAlreadyPaid(PayslipId),

    // ========== Validation ==========
    /// Method `check` requires a check id.
    #[error("Payment method 'check' requires a check id")]
    MissingCheckId,

    /// The method has no settlement semantics in this engine. `mixed` must
    /// be composed by the caller out of single-method registrations.
    #[error("Payment method '{0}' cannot be registered directly")]
    UnsupportedMethod(PaymentMethod),

    /// The payment amount does not match the invoice total.
    #[error("Payment amount {amount} does not match invoice total {invoice_total}")]
    AmountMismatch {
        /// Invoice total.
        invoice_total: Decimal,
        /// Amount the caller tried to register.
        amount: Decimal,
    },

    /// The transfer amount is too far from the payslip net amount.
    #[error(
        "Transfer amount {transfer_amount} does not match payslip net {payslip_net} (tolerance 1.00)"
    )]
    PayslipAmountMismatch {
        /// Payslip net amount.
        payslip_net: Decimal,
        /// Transfer amount.
        transfer_amount: Decimal,
    },

    /// Check book size out of bounds (1 to 100 checks per carnet).
    #[error("Check book size {0} out of bounds (1-100)")]
    CheckBookSize(u32),

    /// A check with this serial already exists for the tenant.
    #[error("Duplicate check serial: {0}")]
    DuplicateSerial(String),

    // ========== Concurrency / store ==========
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

impl From<StoreError> for PaymentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { entity, id } => Self::Conflict { entity, id },
            StoreError::Duplicate { key, .. } => Self::DuplicateSerial(key),
            StoreError::Backend(msg) => Self::Store(msg),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let message = err.to_string();
        match err {
            PaymentError::InvoiceNotFound(_)
            | PaymentError::CheckNotFound(_)
            | PaymentError::TransferNotFound(_)
            | PaymentError::PayslipNotFound(_) => Self::NotFound(message),
            PaymentError::InvoiceAlreadyPaid(_)
            | PaymentError::CheckNotInState { .. }
            | PaymentError::TransferAlreadyLinked(_)
            | PaymentError::PayslipAlreadyPaid(_) => Self::InvalidState(message),
            PaymentError::MissingCheckId
            | PaymentError::UnsupportedMethod(_)
            | PaymentError::AmountMismatch { .. }
            | PaymentError::PayslipAmountMismatch { .. }
            | PaymentError::CheckBookSize(_)
            | PaymentError::DuplicateSerial(_) => Self::Validation(message),
            PaymentError::Conflict { .. } => Self::Conflict(message),
            PaymentError::Store(_) => Self::Store(message),
        }
    }
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::CheckNotFound(_) => "CHECK_NOT_FOUND",
            Self::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            Self::PayslipNotFound(_) => "PAYSLIP_NOT_FOUND",
            Self::InvoiceAlreadyPaid(_) => "INVOICE_ALREADY_PAID",
            Self::CheckNotInState { .. } => "CHECK_NOT_IN_STATE",
            Self::TransferAlreadyLinked(_) => "TRANSFER_ALREADY_LINKED",
            Self::PayslipAlreadyPaid(_) => "PAYSLIP_ALREADY_PAID",
            Self::MissingCheckId => "MISSING_CHECK_ID",
            Self::UnsupportedMethod(_) => "UNSUPPORTED_METHOD",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::PayslipAmountMismatch { .. } => "PAYSLIP_AMOUNT_MISMATCH",
            Self::CheckBookSize(_) => "CHECK_BOOK_SIZE",
            Self::DuplicateSerial(_) => "DUPLICATE_SERIAL",
            Self::Conflict { .. } => "CONCURRENT_MODIFICATION",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvoiceNotFound(_)
            | Self::CheckNotFound(_)
            | Self::TransferNotFound(_)
            | Self::PayslipNotFound(_) => 404,

            Self::InvoiceAlreadyPaid(_)
            | Self::CheckNotInState { .. }
            | Self::TransferAlreadyLinked(_)
            | Self::PayslipAlreadyPaid(_)
            | Self::MissingCheckId
            | Self::UnsupportedMethod(_)
            | Self::AmountMismatch { .. }
            | Self::PayslipAmountMismatch { .. }
            | Self::CheckBookSize(_)
            | Self::DuplicateSerial(_) => 400,

            Self::Conflict { .. } => 409,

            Self::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PaymentError::MissingCheckId.error_code(), "MISSING_CHECK_ID");
        assert_eq!(
            PaymentError::UnsupportedMethod(PaymentMethod::Mixed).error_code(),
            "UNSUPPORTED_METHOD"
        );
        assert_eq!(
            PaymentError::CheckNotInState {
                id: CheckId::new(1),
                state: CheckState::Issued,
                expected: CheckState::Available,
            }
            .error_code(),
            "CHECK_NOT_IN_STATE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            PaymentError::InvoiceNotFound(InvoiceId::new(1)).http_status_code(),
            404
        );
        assert_eq!(PaymentError::MissingCheckId.http_status_code(), 400);
        assert_eq!(
            PaymentError::Conflict {
                entity: "invoice",
                id: 1
            }
            .http_status_code(),
            409
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let err: PaymentError = StoreError::Duplicate {
            entity: "check",
            key: "1001".to_string(),
        }
        .into();
        assert!(matches!(err, PaymentError::DuplicateSerial(ref s) if s == "1001"));
    }
}
