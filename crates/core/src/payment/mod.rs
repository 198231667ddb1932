//! Payment Registrar: translates "invoice X paid via method M" into ledger
//! entries and instrument links.
//!
//! Also owns the check lifecycle (carnet creation, cashing, voiding) and the
//! payslip side of bank-transfer reconciliation. Every multi-step mutation is
//! one atomic unit against the store.

pub mod error;
pub mod service;
pub mod types;

pub use error::PaymentError;
pub use service::{
    AMOUNT_ROUNDING_TOLERANCE, MAX_CHECK_BOOK_SIZE, PAYSLIP_LINK_TOLERANCE, PaymentRegistrar,
};
pub use types::{CheckStats, PaymentInstruction, PaymentResult, PayslipLinkResult};
