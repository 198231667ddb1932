//! Employee master record.

use chrono::{DateTime, Utc};
use primanota_shared::types::{EmployeeId, TenantId};
use serde::{Deserialize, Serialize};

/// An employee of the business.
///
/// Payslips and shift records reference the employee by numeric id and read
/// the display name via join at query time, so renames need no propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Row id.
    pub id: EmployeeId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Tax id, natural key per tenant.
    pub tax_id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// False once soft-deleted.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Field changes applied to an employee master record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeChanges {
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
    /// New tax id.
    pub tax_id: Option<String>,
}

impl EmployeeChanges {
    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.tax_id.is_none()
    }
}
