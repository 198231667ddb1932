//! Domain entities and state enums.
//!
//! Every entity is scoped by a [`TenantId`](primanota_shared::types::TenantId)
//! and carries `created_at`/`updated_at` audit timestamps. State and method
//! fields are enums, not free strings, so invalid values cannot be
//! represented.

pub mod check;
pub mod employee;
pub mod invoice;
pub mod ledger;
pub mod payslip;
pub mod supplier;
pub mod transfer;

pub use check::{Check, CheckState};
pub use employee::{Employee, EmployeeChanges};
pub use invoice::{Invoice, InvoiceLine, PaymentMethod};
pub use ledger::{BankLedgerEntry, CashLedgerEntry, LedgerCategory};
pub use payslip::{Payslip, PayslipState};
pub use supplier::{Supplier, SupplierChanges};
pub use transfer::BankTransfer;
