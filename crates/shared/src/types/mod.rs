//! Shared type definitions.

pub mod id;

pub use id::{
    BankEntryId, CashEntryId, CheckId, EmployeeId, InvoiceId, InvoiceLineId, PayslipId, TenantId,
    TransferId,
};
