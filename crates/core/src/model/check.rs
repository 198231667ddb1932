//! Bank check instrument.

use chrono::{DateTime, NaiveDate, Utc};
use primanota_shared::types::{CheckId, InvoiceId, TenantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a physical check.
///
/// Valid transitions:
/// - Available → Issued (payment registration)
/// - Issued → Cashed (beneficiary cashes it)
/// - Issued → Available (its invoice link is removed)
/// - Available → Voided
///
/// A check in `Issued` or `Cashed` always carries an invoice link; a check
/// in `Available` or `Voided` never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    /// Blank check in the carnet, ready to be issued.
    Available,
    /// Filled in and handed to a beneficiary.
    Issued,
    /// Cashed by the beneficiary (financial history, immutable).
    Cashed,
    /// Voided without ever being issued.
    Voided,
}

impl CheckState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Issued => "issued",
            Self::Cashed => "cashed",
            Self::Voided => "voided",
        }
    }

    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(Self::Available),
            "issued" => Some(Self::Issued),
            "cashed" => Some(Self::Cashed),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }

    /// Returns true if the check may be deleted.
    ///
    /// Issued and cashed checks are financial history and must never be
    /// deleted; voided checks are kept for carnet completeness.
    #[must_use]
    pub const fn is_deletable(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Returns true if a transition from `self` to `to` is valid.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Available, Self::Issued | Self::Voided)
                | (Self::Issued, Self::Cashed | Self::Available)
        )
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A physical bank check, distinct from a "check-in" attendance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Row id.
    pub id: CheckId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Serial number, unique per tenant.
    pub serial: String,
    /// Issuing bank name.
    pub bank: String,
    /// Lifecycle state.
    pub state: CheckState,
    /// Invoice this check settles, when issued or cashed.
    pub invoice_id: Option<InvoiceId>,
    /// Amount written on the check.
    pub amount: Option<Decimal>,
    /// Beneficiary written on the check.
    pub beneficiary: Option<String>,
    /// Date the check was issued.
    pub issue_date: Option<NaiveDate>,
    /// Date the check was cashed.
    pub cash_date: Option<NaiveDate>,
    /// Free-text note.
    pub note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
