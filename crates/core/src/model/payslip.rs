//! Payslip entity.

use chrono::{DateTime, Utc};
use primanota_shared::types::{BankEntryId, EmployeeId, PayslipId, TenantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment state of a payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayslipState {
    /// Net amount still owed to the employee.
    Due,
    /// Net amount has been paid out.
    Paid,
}

impl PayslipState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for PayslipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monthly payslip for an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payslip {
    /// Row id.
    pub id: PayslipId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Employee this payslip belongs to.
    pub employee_id: EmployeeId,
    /// Pay period, `YYYY-MM`.
    pub period: String,
    /// Gross amount.
    pub gross_amount: Decimal,
    /// Net amount owed to the employee.
    pub net_amount: Decimal,
    /// Payment state.
    pub state: PayslipState,
    /// Bank ledger entry that paid this payslip, once settled.
    pub paid_by_entry: Option<BankEntryId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
