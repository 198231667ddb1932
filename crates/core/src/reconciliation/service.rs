//! Match suggestion, unreconciled listings, and confirmation write-back.

use std::sync::Arc;

use primanota_shared::types::{BankEntryId, InvoiceId, TenantId, TransferId};
use tracing::{info, instrument, warn};

use crate::model::{BankLedgerEntry, BankTransfer, Check, CheckState, Payslip, PayslipState};
use crate::payment::PAYSLIP_LINK_TOLERANCE;
use crate::reconciliation::error::ReconciliationError;
use crate::reconciliation::matching::{SUGGESTION_THRESHOLD, score_candidate};
use crate::reconciliation::types::{MatchCandidate, MatchConfirmation};
use crate::store::{
    BankEntryFilter, BankEntryPatch, CheckFilter, EntityStore, InvoiceFilter, InvoicePatch,
    PayslipFilter, TransferFilter,
};

/// Proposes and confirms links between imported bank movements and the
/// obligations they settle.
pub struct ReconciliationMatcher<S> {
    store: Arc<S>,
}

impl<S: EntityStore> ReconciliationMatcher<S> {
    /// Creates a matcher over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Proposes the unpaid invoice an unlinked transfer most likely settles,
    /// or `None` when nothing scores at or above the threshold.
    ///
    /// Candidates are scanned in ascending invoice id order and a later
    /// candidate replaces the best only on a strictly greater score, so
    /// equal scores deterministically resolve to the lowest invoice id.
    #[instrument(skip(self))]
    pub async fn suggest_invoice_match(
        &self,
        tenant: TenantId,
        transfer_id: TransferId,
    ) -> Result<Option<MatchCandidate>, ReconciliationError> {
        let transfer = self
            .store
            .get_transfer(tenant, transfer_id)
            .await?
            .ok_or(ReconciliationError::TransferNotFound(transfer_id))?;
        if transfer.linked {
            return Err(ReconciliationError::TransferAlreadyLinked(transfer_id));
        }

        let unpaid = self
            .store
            .list_invoices(
                tenant,
                InvoiceFilter {
                    paid: Some(false),
                    ..Default::default()
                },
            )
            .await?;

        let mut best: Option<MatchCandidate> = None;
        for invoice in unpaid {
            let (score, amount_matched, name_matched) = score_candidate(
                transfer.amount,
                &transfer.beneficiary,
                invoice.total_amount,
                &invoice.supplier_name,
            );
            if score > best.as_ref().map_or(0, |b| b.score) {
                best = Some(MatchCandidate {
                    invoice,
                    score,
                    amount_matched,
                    name_matched,
                });
            }
        }

        Ok(best.filter(|b| b.score >= SUGGESTION_THRESHOLD))
    }

    /// Due payslips whose net amount is within the payslip tolerance of the
    /// transfer amount, closest first. Used for payroll wires.
    #[instrument(skip(self))]
    pub async fn suggest_payslip_match(
        &self,
        tenant: TenantId,
        transfer_id: TransferId,
    ) -> Result<Vec<Payslip>, ReconciliationError> {
        let transfer = self
            .store
            .get_transfer(tenant, transfer_id)
            .await?
            .ok_or(ReconciliationError::TransferNotFound(transfer_id))?;
        if transfer.linked {
            return Err(ReconciliationError::TransferAlreadyLinked(transfer_id));
        }

        let mut due = self
            .store
            .list_payslips(
                tenant,
                PayslipFilter {
                    state: Some(PayslipState::Due),
                    employee_id: None,
                },
            )
            .await?;
        due.retain(|p| (p.net_amount - transfer.amount).abs() <= PAYSLIP_LINK_TOLERANCE);
        due.sort_by(|a, b| {
            let da = (a.net_amount - transfer.amount).abs();
            let db = (b.net_amount - transfer.amount).abs();
            da.cmp(&db).then(a.id.cmp(&b.id))
        });
        Ok(due)
    }

    /// All transfers still waiting for a link, newest first.
    #[instrument(skip(self))]
    pub async fn list_unlinked_transfers(
        &self,
        tenant: TenantId,
    ) -> Result<Vec<BankTransfer>, ReconciliationError> {
        Ok(self
            .store
            .list_transfers(
                tenant,
                TransferFilter {
                    linked: Some(false),
                    invoice_id: None,
                },
            )
            .await?)
    }

    /// All blank checks, lowest serial first so the oldest carnet is used up
    /// before a new one is opened.
    #[instrument(skip(self))]
    pub async fn list_available_checks(
        &self,
        tenant: TenantId,
    ) -> Result<Vec<Check>, ReconciliationError> {
        Ok(self
            .store
            .list_checks(
                tenant,
                CheckFilter {
                    state: Some(CheckState::Available),
                    invoice_id: None,
                },
            )
            .await?)
    }

    /// Bank ledger rows not yet reconciled against a bank statement, newest
    /// first.
    #[instrument(skip(self))]
    pub async fn list_unreconciled_bank_entries(
        &self,
        tenant: TenantId,
    ) -> Result<Vec<BankLedgerEntry>, ReconciliationError> {
        Ok(self
            .store
            .list_bank_entries(
                tenant,
                BankEntryFilter {
                    reconciled: Some(false),
                    invoice_id: None,
                },
            )
            .await?)
    }

    /// Human-confirmation write-back: marks a bank ledger entry and an
    /// invoice reconciled together.
    ///
    /// The reconciled guard is a conditional update inside the transaction,
    /// so a confirmation that lands on the same entry after our read loses
    /// cleanly instead of double-reconciling.
    #[instrument(skip(self))]
    pub async fn confirm_match(
        &self,
        tenant: TenantId,
        bank_entry_id: BankEntryId,
        invoice_id: InvoiceId,
    ) -> Result<MatchConfirmation, ReconciliationError> {
        self.store
            .get_bank_entry(tenant, bank_entry_id)
            .await?
            .ok_or(ReconciliationError::BankEntryNotFound(bank_entry_id))?;
        self.store
            .get_invoice(tenant, invoice_id)
            .await?
            .ok_or(ReconciliationError::InvoiceNotFound(invoice_id))?;

        self.store.begin().await?;
        match self.confirm_steps(tenant, bank_entry_id, invoice_id).await {
            Ok(confirmation) => {
                self.store.commit().await?;
                info!(bank_entry_id = %bank_entry_id, invoice_id = %invoice_id, "match confirmed");
                Ok(confirmation)
            }
            Err(err) => {
                warn!(bank_entry_id = %bank_entry_id, error = %err, "match confirmation rolled back");
                self.store.rollback().await?;
                Err(err)
            }
        }
    }

    async fn confirm_steps(
        &self,
        tenant: TenantId,
        bank_entry_id: BankEntryId,
        invoice_id: InvoiceId,
    ) -> Result<MatchConfirmation, ReconciliationError> {
        let marked = self
            .store
            .update_bank_entry_if_unreconciled(
                tenant,
                bank_entry_id,
                BankEntryPatch {
                    reconciled: Some(true),
                },
            )
            .await?;
        let Some(bank_entry) = marked else {
            return Err(match self.store.get_bank_entry(tenant, bank_entry_id).await? {
                Some(_) => ReconciliationError::EntryAlreadyReconciled(bank_entry_id),
                None => ReconciliationError::BankEntryNotFound(bank_entry_id),
            });
        };
        let invoice = self
            .store
            .update_invoice(
                tenant,
                invoice_id,
                InvoicePatch {
                    reconciled: Some(true),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(ReconciliationError::InvoiceNotFound(invoice_id))?;

        Ok(MatchConfirmation {
            bank_entry,
            invoice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerCategory;
    use crate::store::{MemoryStore, NewBankEntry, NewEmployee, NewInvoice, NewPayslip, NewTransfer};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const TENANT: TenantId = TenantId(1);

    fn matcher(store: &Arc<MemoryStore>) -> ReconciliationMatcher<MemoryStore> {
        ReconciliationMatcher::new(Arc::clone(store))
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    async fn seed_invoice(store: &MemoryStore, number: &str, name: &str, total: Decimal) -> InvoiceId {
        store
            .insert_invoice(NewInvoice {
                tenant_id: TENANT,
                number: number.to_string(),
                supplier_tax_id: "IT00112233445".to_string(),
                supplier_name: name.to_string(),
                issue_date: date(1),
                due_date: None,
                net_amount: total,
                tax_amount: dec!(0),
                total_amount: total,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_transfer(store: &MemoryStore, beneficiary: &str, amount: Decimal) -> TransferId {
        store
            .insert_transfer(NewTransfer {
                tenant_id: TENANT,
                transfer_date: date(15),
                beneficiary: beneficiary.to_string(),
                iban: None,
                amount,
                reason: None,
                source_file: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_suggests_full_match() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, "2026/001", "Acme Srl", dec!(1005.00)).await;
        seed_invoice(&store, "2026/002", "Beta Spa", dec!(5000.00)).await;
        let transfer = seed_transfer(&store, "Acme Srl", dec!(1000.00)).await;

        let candidate = matcher(&store)
            .suggest_invoice_match(TENANT, transfer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(candidate.invoice.id, invoice);
        assert_eq!(candidate.score, 100);
        assert!(candidate.amount_matched);
        assert!(candidate.name_matched);
    }

    #[tokio::test]
    async fn test_no_suggestion_below_threshold() {
        let store = Arc::new(MemoryStore::new());
        // 20% off and a non-matching name: score 0.
        seed_invoice(&store, "2026/001", "Beta Spa", dec!(1200.00)).await;
        // Amount-only match: score 50, still below threshold.
        seed_invoice(&store, "2026/002", "Gamma Snc", dec!(1001.00)).await;
        let transfer = seed_transfer(&store, "Acme Srl", dec!(1000.00)).await;

        let candidate = matcher(&store)
            .suggest_invoice_match(TENANT, transfer)
            .await
            .unwrap();
        assert!(candidate.is_none());
    }

    #[tokio::test]
    async fn test_tie_breaks_to_lowest_invoice_id() {
        let store = Arc::new(MemoryStore::new());
        let first = seed_invoice(&store, "2026/001", "Acme Srl", dec!(1000.00)).await;
        seed_invoice(&store, "2026/002", "Acme Srl", dec!(1000.00)).await;
        let transfer = seed_transfer(&store, "Acme Srl", dec!(1000.00)).await;

        let candidate = matcher(&store)
            .suggest_invoice_match(TENANT, transfer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(candidate.invoice.id, first);
    }

    #[tokio::test]
    async fn test_paid_invoices_excluded() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, "2026/001", "Acme Srl", dec!(1000.00)).await;
        store
            .update_invoice(
                TENANT,
                invoice,
                InvoicePatch {
                    paid: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let transfer = seed_transfer(&store, "Acme Srl", dec!(1000.00)).await;

        let candidate = matcher(&store)
            .suggest_invoice_match(TENANT, transfer)
            .await
            .unwrap();
        assert!(candidate.is_none());
    }

    #[tokio::test]
    async fn test_linked_transfer_rejected() {
        let store = Arc::new(MemoryStore::new());
        let transfer = seed_transfer(&store, "Acme Srl", dec!(1000.00)).await;
        store
            .update_transfer(
                TENANT,
                transfer,
                crate::store::TransferPatch {
                    linked: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = matcher(&store).suggest_invoice_match(TENANT, transfer).await;
        assert!(matches!(
            result,
            Err(ReconciliationError::TransferAlreadyLinked(_))
        ));
    }

    #[tokio::test]
    async fn test_payslip_suggestions_sorted_by_closeness() {
        let store = Arc::new(MemoryStore::new());
        let employee = store
            .insert_employee(NewEmployee {
                tenant_id: TENANT,
                tax_id: "RSSMRA80A01H501U".to_string(),
                first_name: "Mario".to_string(),
                last_name: "Rossi".to_string(),
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for net in [dec!(1600.90), dec!(1600.10), dec!(1700.00)] {
            let payslip = store
                .insert_payslip(NewPayslip {
                    tenant_id: TENANT,
                    employee_id: employee.id,
                    period: "2026-05".to_string(),
                    gross_amount: net + dec!(500),
                    net_amount: net,
                })
                .await
                .unwrap();
            ids.push(payslip.id);
        }
        let transfer = seed_transfer(&store, "Mario Rossi", dec!(1600.00)).await;

        let suggestions = matcher(&store)
            .suggest_payslip_match(TENANT, transfer)
            .await
            .unwrap();
        // 1700.00 is out of tolerance; 1600.10 is closer than 1600.90.
        assert_eq!(
            suggestions.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![ids[1], ids[0]]
        );
    }

    #[tokio::test]
    async fn test_listings() {
        let store = Arc::new(MemoryStore::new());
        let unlinked = seed_transfer(&store, "Acme Srl", dec!(100.00)).await;
        let linked = seed_transfer(&store, "Beta Spa", dec!(200.00)).await;
        store
            .update_transfer(
                TENANT,
                linked,
                crate::store::TransferPatch {
                    linked: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let transfers = matcher(&store).list_unlinked_transfers(TENANT).await.unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].id, unlinked);
    }

    #[tokio::test]
    async fn test_confirm_match_marks_both_sides() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, "2026/001", "Acme Srl", dec!(400.00)).await;
        let entry = store
            .insert_bank_entry(NewBankEntry {
                tenant_id: TENANT,
                entry_date: date(20),
                amount: dec!(-400.00),
                category: LedgerCategory::InvoicePaymentTransfer,
                description: "wire".to_string(),
                invoice_id: Some(invoice),
                check_id: None,
            })
            .await
            .unwrap();

        let confirmation = matcher(&store)
            .confirm_match(TENANT, entry.id, invoice)
            .await
            .unwrap();
        assert!(confirmation.bank_entry.reconciled);
        assert!(confirmation.invoice.reconciled);

        // Second confirmation is rejected.
        let result = matcher(&store).confirm_match(TENANT, entry.id, invoice).await;
        assert!(matches!(
            result,
            Err(ReconciliationError::EntryAlreadyReconciled(_))
        ));

        let unreconciled = matcher(&store)
            .list_unreconciled_bank_entries(TENANT)
            .await
            .unwrap();
        assert!(unreconciled.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_loses_to_competing_confirmation() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, "2026/001", "Acme Srl", dec!(400.00)).await;
        let entry = store
            .insert_bank_entry(NewBankEntry {
                tenant_id: TENANT,
                entry_date: date(20),
                amount: dec!(-400.00),
                category: LedgerCategory::InvoicePaymentTransfer,
                description: "wire".to_string(),
                invoice_id: None,
                check_id: None,
            })
            .await
            .unwrap();

        // Another confirmation claims the entry first.
        store
            .update_bank_entry(
                TENANT,
                entry.id,
                crate::store::BankEntryPatch {
                    reconciled: Some(true),
                },
            )
            .await
            .unwrap();

        let result = matcher(&store).confirm_match(TENANT, entry.id, invoice).await;
        assert!(matches!(
            result,
            Err(ReconciliationError::EntryAlreadyReconciled(_))
        ));

        // The losing confirmation left the invoice untouched.
        let invoice = store.get_invoice(TENANT, invoice).await.unwrap().unwrap();
        assert!(!invoice.reconciled);
    }
}
