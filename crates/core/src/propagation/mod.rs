//! Propagation Engine: keeps denormalized display fields consistent after a
//! master-record edit.
//!
//! Invoices carry a denormalized supplier display name, so a supplier rename
//! rewrites every referencing invoice. Payslips join the employee by id and
//! need no propagation write; the report says so explicitly instead of
//! silently doing nothing.

pub mod error;
pub mod service;
pub mod types;

pub use error::PropagationError;
pub use service::PropagationEngine;
pub use types::{EmployeePropagationReport, SupplierPropagationReport};
