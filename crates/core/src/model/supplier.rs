//! Supplier (vendor) master record.

use chrono::{DateTime, Utc};
use primanota_shared::types::TenantId;
use serde::{Deserialize, Serialize};

/// A vendor identified by tax id.
///
/// Invoices reference the supplier by tax id, not by an owning relationship:
/// a supplier may be soft-deleted (`active = false`) while its invoices
/// remain queryable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Tax id, natural key per tenant.
    pub tax_id: String,
    /// Display name (propagated onto invoices on rename).
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// False once soft-deleted.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Field changes applied to a supplier master record.
///
/// Only `Some` fields are written. A name change triggers propagation of the
/// denormalized display name onto referencing invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierChanges {
    /// New display name.
    pub name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New contact phone.
    pub phone: Option<String>,
    /// New street address.
    pub address: Option<String>,
    /// New city.
    pub city: Option<String>,
}

impl SupplierChanges {
    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.city.is_none()
    }
}
