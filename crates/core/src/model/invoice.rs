//! Invoice and invoice line entities.

use chrono::{DateTime, NaiveDate, Utc};
use primanota_shared::types::{InvoiceId, InvoiceLineId, TenantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an invoice was (or will be) settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Settled from the cash ledger.
    Cash,
    /// Settled by outbound wire transfer.
    BankTransfer,
    /// Settled by direct debit on the bank account.
    BankDirectDebit,
    /// Settled by issuing a physical check.
    Check,
    /// Split across multiple instruments (no single-call settlement).
    Mixed,
    /// Not settled yet.
    None,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bank_transfer",
            Self::BankDirectDebit => "bank_direct_debit",
            Self::Check => "check",
            Self::Mixed => "mixed",
            Self::None => "none",
        }
    }

    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "bank_transfer" => Some(Self::BankTransfer),
            "bank_direct_debit" => Some(Self::BankDirectDebit),
            "check" => Some(Self::Check),
            "mixed" => Some(Self::Mixed),
            "none" => Some(Self::None),
            _ => Option::None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A supplier bill owed by the business.
///
/// The supplier display name is denormalized onto the invoice; the
/// propagation engine keeps it consistent when the supplier master record
/// is renamed. `version` supports optimistic concurrency on the
/// delete-vs-payment race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Row id.
    pub id: InvoiceId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Invoice number as printed on the document.
    pub number: String,
    /// Tax id of the issuing supplier (natural key into `Supplier`).
    pub supplier_tax_id: String,
    /// Denormalized supplier display name.
    pub supplier_name: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Net (taxable) amount.
    pub net_amount: Decimal,
    /// Tax amount.
    pub tax_amount: Decimal,
    /// Total amount owed.
    pub total_amount: Decimal,
    /// Whether the invoice has been settled.
    pub paid: bool,
    /// Settlement method.
    pub payment_method: PaymentMethod,
    /// Settlement date, when paid.
    pub payment_date: Option<NaiveDate>,
    /// Whether a bank movement has been reconciled against this invoice.
    pub reconciled: bool,
    /// Optimistic concurrency version, bumped on every update.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A single line of an invoice. Lines exist only to support their invoice
/// and are removed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Row id.
    pub id: InvoiceLineId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Owning invoice.
    pub invoice_id: InvoiceId,
    /// Line description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Line total.
    pub line_total: Decimal,
    /// VAT rate applied, percent.
    pub vat_rate: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_as_str() {
        assert_eq!(PaymentMethod::Cash.as_str(), "cash");
        assert_eq!(PaymentMethod::BankTransfer.as_str(), "bank_transfer");
        assert_eq!(PaymentMethod::BankDirectDebit.as_str(), "bank_direct_debit");
        assert_eq!(PaymentMethod::Check.as_str(), "check");
        assert_eq!(PaymentMethod::Mixed.as_str(), "mixed");
        assert_eq!(PaymentMethod::None.as_str(), "none");
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(
            PaymentMethod::parse("BANK_TRANSFER"),
            Some(PaymentMethod::BankTransfer)
        );
        assert_eq!(PaymentMethod::parse("invalid"), None);
    }

    #[test]
    fn test_payment_method_display() {
        assert_eq!(format!("{}", PaymentMethod::Check), "check");
    }
}
