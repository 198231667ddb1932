//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `CheckId` where an
//! `InvoiceId` is expected. All entities use integer row ids assigned by the
//! store; ids are only meaningful within a tenant.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers over `i64`.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Creates an ID from a raw row id.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the inner row id.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(TenantId, "Identifier for a tenant (one physical business).");
typed_id!(InvoiceId, "Unique identifier for an invoice.");
typed_id!(InvoiceLineId, "Unique identifier for an invoice line.");
typed_id!(EmployeeId, "Unique identifier for an employee.");
typed_id!(CheckId, "Unique identifier for a bank check instrument.");
typed_id!(TransferId, "Unique identifier for an imported bank transfer.");
typed_id!(CashEntryId, "Unique identifier for a cash ledger entry.");
typed_id!(BankEntryId, "Unique identifier for a bank ledger entry.");
typed_id!(PayslipId, "Unique identifier for a payslip.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_id_roundtrip() {
        let id = InvoiceId::new(42);
        assert_eq!(id.into_inner(), 42);
        assert_eq!(id, InvoiceId::from(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_typed_id_ordering() {
        assert!(InvoiceId::new(1) < InvoiceId::new(2));
    }

    #[test]
    fn test_typed_id_serde_transparent() {
        let id = CheckId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: CheckId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }
}
