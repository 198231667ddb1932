//! Report types returned by the Propagation Engine.

use serde::{Deserialize, Serialize};

use crate::model::Supplier;

/// Result of a propagated supplier update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPropagationReport {
    /// The supplier after the update.
    pub supplier: Supplier,
    /// Whether a display-name change required rewriting invoices.
    pub propagation_required: bool,
    /// Invoices whose denormalized supplier name was rewritten.
    pub invoices_updated: u64,
}

/// Result of an employee update. Payslips read the employee name via join,
/// so `propagation_required` is always false; the field exists so callers
/// see the policy instead of inferring it from a missing count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePropagationReport {
    /// The employee after the update.
    pub employee: crate::model::Employee,
    /// Always false: dependent records join by id.
    pub propagation_required: bool,
}
