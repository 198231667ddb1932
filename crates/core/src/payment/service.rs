//! Payment registration and payment-instrument lifecycle.

use std::sync::Arc;

use chrono::NaiveDate;
use primanota_shared::types::{CheckId, InvoiceId, PayslipId, TenantId, TransferId};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::model::{Check, CheckState, Invoice, LedgerCategory, PaymentMethod, PayslipState};
use crate::payment::error::PaymentError;
use crate::payment::types::{CheckStats, PaymentInstruction, PaymentResult, PayslipLinkResult};
use crate::store::{
    CheckFilter, CheckPatch, EntityStore, InvoicePatch, NewBankEntry, NewCashEntry, NewCheck,
    Patch, PayslipPatch, TransferPatch,
};

/// Rounding tolerance between the registered amount and the invoice total.
pub const AMOUNT_ROUNDING_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Absolute tolerance when matching a bank transfer to a payslip net amount.
pub const PAYSLIP_LINK_TOLERANCE: Decimal = Decimal::ONE;

/// Largest carnet a single call may create.
pub const MAX_CHECK_BOOK_SIZE: u32 = 100;

/// Registers invoice payments and drives the check and payslip-link
/// lifecycles.
pub struct PaymentRegistrar<S> {
    store: Arc<S>,
}

impl<S: EntityStore> PaymentRegistrar<S> {
    /// Creates a registrar over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Marks an invoice paid and creates the ledger entry and instrument
    /// links its method requires. One atomic unit: a failure anywhere rolls
    /// back the paid flag.
    ///
    /// `mixed` has no settlement semantics here; callers compose it out of
    /// single-method registrations.
    #[instrument(skip(self, instruction), fields(method = %instruction.method))]
    pub async fn register_invoice_payment(
        &self,
        tenant: TenantId,
        invoice_id: InvoiceId,
        instruction: PaymentInstruction,
    ) -> Result<PaymentResult, PaymentError> {
        match instruction.method {
            PaymentMethod::Cash
            | PaymentMethod::BankTransfer
            | PaymentMethod::BankDirectDebit
            | PaymentMethod::Check => {}
            method @ (PaymentMethod::Mixed | PaymentMethod::None) => {
                return Err(PaymentError::UnsupportedMethod(method));
            }
        }
        if instruction.method == PaymentMethod::Check && instruction.check_id.is_none() {
            return Err(PaymentError::MissingCheckId);
        }

        let invoice = self
            .store
            .get_invoice(tenant, invoice_id)
            .await?
            .ok_or(PaymentError::InvoiceNotFound(invoice_id))?;
        if invoice.paid {
            return Err(PaymentError::InvoiceAlreadyPaid(invoice_id));
        }
        if (instruction.amount - invoice.total_amount).abs() > AMOUNT_ROUNDING_TOLERANCE {
            return Err(PaymentError::AmountMismatch {
                invoice_total: invoice.total_amount,
                amount: instruction.amount,
            });
        }

        self.store.begin().await?;
        match self.register_steps(tenant, &invoice, &instruction).await {
            Ok(result) => {
                self.store.commit().await?;
                info!(
                    invoice_id = %invoice_id,
                    amount = %instruction.amount,
                    "payment registered"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(invoice_id = %invoice_id, error = %err, "payment registration rolled back");
                self.store.rollback().await?;
                Err(err)
            }
        }
    }

    async fn register_steps(
        &self,
        tenant: TenantId,
        invoice: &Invoice,
        instruction: &PaymentInstruction,
    ) -> Result<PaymentResult, PaymentError> {
        let paid = self
            .store
            .update_invoice_versioned(
                tenant,
                invoice.id,
                invoice.version,
                InvoicePatch {
                    paid: Some(true),
                    payment_method: Some(instruction.method),
                    payment_date: Patch::Set(instruction.payment_date),
                    ..Default::default()
                },
            )
            .await?
            .ok_or(PaymentError::InvoiceNotFound(invoice.id))?;

        let description = format!(
            "Invoice {} payment - {}",
            invoice.number, invoice.supplier_name
        );
        let outflow = -instruction.amount;

        let mut result = PaymentResult {
            invoice: paid,
            cash_entry_id: None,
            bank_entry_id: None,
            check: None,
            transfer_linked: None,
        };

        match instruction.method {
            PaymentMethod::Cash => {
                let entry = self
                    .store
                    .insert_cash_entry(NewCashEntry {
                        tenant_id: tenant,
                        entry_date: instruction.payment_date,
                        amount: outflow,
                        category: LedgerCategory::InvoicePayment,
                        description,
                        note: instruction.note.clone(),
                        invoice_id: Some(invoice.id),
                    })
                    .await?;
                result.cash_entry_id = Some(entry.id);
            }
            PaymentMethod::BankTransfer | PaymentMethod::BankDirectDebit => {
                let category = if instruction.method == PaymentMethod::BankTransfer {
                    LedgerCategory::InvoicePaymentTransfer
                } else {
                    LedgerCategory::InvoicePaymentDirectDebit
                };
                let entry = self
                    .store
                    .insert_bank_entry(NewBankEntry {
                        tenant_id: tenant,
                        entry_date: instruction.payment_date,
                        amount: outflow,
                        category,
                        description,
                        invoice_id: Some(invoice.id),
                        check_id: None,
                    })
                    .await?;
                result.bank_entry_id = Some(entry.id);

                if let Some(transfer_id) = instruction.transfer_id {
                    result.transfer_linked =
                        Some(self.link_transfer(tenant, transfer_id, invoice.id).await?);
                }
            }
            PaymentMethod::Check => {
                // Checked before the transaction opened.
                let check_id = instruction
                    .check_id
                    .ok_or(PaymentError::MissingCheckId)?;
                let check = self
                    .issue_check(tenant, check_id, invoice, instruction)
                    .await?;
                let entry = self
                    .store
                    .insert_bank_entry(NewBankEntry {
                        tenant_id: tenant,
                        entry_date: instruction.payment_date,
                        amount: outflow,
                        category: LedgerCategory::InvoicePaymentCheck,
                        description,
                        invoice_id: Some(invoice.id),
                        check_id: Some(check.id),
                    })
                    .await?;
                result.bank_entry_id = Some(entry.id);
                result.check = Some(check);
            }
            PaymentMethod::Mixed | PaymentMethod::None => {
                return Err(PaymentError::UnsupportedMethod(instruction.method));
            }
        }

        Ok(result)
    }

    /// Single conditional update from unlinked: a transfer linked by a
    /// concurrent task after our read cannot be overwritten.
    async fn link_transfer(
        &self,
        tenant: TenantId,
        transfer_id: TransferId,
        invoice_id: InvoiceId,
    ) -> Result<TransferId, PaymentError> {
        let linked = self
            .store
            .update_transfer_if_unlinked(
                tenant,
                transfer_id,
                TransferPatch {
                    linked: Some(true),
                    invoice_id: Patch::Set(invoice_id),
                    payslip_id: Patch::Keep,
                },
            )
            .await?;
        match linked {
            Some(_) => Ok(transfer_id),
            None => Err(self.transfer_link_error(tenant, transfer_id).await?),
        }
    }

    /// Distinguishes "gone" from "already linked" after a conditional
    /// transfer update matched nothing.
    async fn transfer_link_error(
        &self,
        tenant: TenantId,
        transfer_id: TransferId,
    ) -> Result<PaymentError, PaymentError> {
        Ok(match self.store.get_transfer(tenant, transfer_id).await? {
            Some(_) => PaymentError::TransferAlreadyLinked(transfer_id),
            None => PaymentError::TransferNotFound(transfer_id),
        })
    }

    /// Single conditional update from `available`: a concurrent registration
    /// racing on the same check loses cleanly instead of double-issuing.
    async fn issue_check(
        &self,
        tenant: TenantId,
        check_id: CheckId,
        invoice: &Invoice,
        instruction: &PaymentInstruction,
    ) -> Result<Check, PaymentError> {
        let issued = self
            .store
            .update_check_if_state(
                tenant,
                check_id,
                CheckState::Available,
                CheckPatch {
                    state: Some(CheckState::Issued),
                    invoice_id: Patch::Set(invoice.id),
                    amount: Patch::Set(instruction.amount),
                    beneficiary: Patch::Set(invoice.supplier_name.clone()),
                    issue_date: Patch::Set(instruction.payment_date),
                    ..Default::default()
                },
            )
            .await?;
        match issued {
            Some(check) => Ok(check),
            None => self.check_state_error(tenant, check_id, CheckState::Available).await,
        }
    }

    async fn check_state_error(
        &self,
        tenant: TenantId,
        check_id: CheckId,
        expected: CheckState,
    ) -> Result<Check, PaymentError> {
        match self.store.get_check(tenant, check_id).await? {
            Some(check) => Err(PaymentError::CheckNotInState {
                id: check_id,
                state: check.state,
                expected,
            }),
            None => Err(PaymentError::CheckNotFound(check_id)),
        }
    }

    /// Batch-creates a carnet of blank checks with sequential serials.
    /// Atomic: a duplicate serial anywhere rolls the whole carnet back.
    #[instrument(skip(self))]
    pub async fn create_check_book(
        &self,
        tenant: TenantId,
        bank: &str,
        first_serial: u32,
        count: u32,
    ) -> Result<Vec<Check>, PaymentError> {
        if count == 0 || count > MAX_CHECK_BOOK_SIZE {
            return Err(PaymentError::CheckBookSize(count));
        }

        self.store.begin().await?;
        let mut checks = Vec::with_capacity(count as usize);
        for offset in 0..count {
            let new = NewCheck {
                tenant_id: tenant,
                serial: (first_serial + offset).to_string(),
                bank: bank.to_string(),
                note: None,
            };
            match self.store.insert_check(new).await {
                Ok(check) => checks.push(check),
                Err(err) => {
                    warn!(bank, first_serial, count, error = %err, "check book creation rolled back");
                    self.store.rollback().await?;
                    return Err(err.into());
                }
            }
        }
        self.store.commit().await?;
        info!(bank, first_serial, count, "check book created");
        Ok(checks)
    }

    /// Marks an issued check as cashed on the given date.
    #[instrument(skip(self))]
    pub async fn mark_check_cashed(
        &self,
        tenant: TenantId,
        check_id: CheckId,
        cash_date: NaiveDate,
    ) -> Result<Check, PaymentError> {
        let cashed = self
            .store
            .update_check_if_state(
                tenant,
                check_id,
                CheckState::Issued,
                CheckPatch {
                    state: Some(CheckState::Cashed),
                    cash_date: Patch::Set(cash_date),
                    ..Default::default()
                },
            )
            .await?;
        match cashed {
            Some(check) => {
                info!(check_id = %check_id, "check cashed");
                Ok(check)
            }
            None => self.check_state_error(tenant, check_id, CheckState::Issued).await,
        }
    }

    /// Voids a blank check so it can never be issued.
    #[instrument(skip(self))]
    pub async fn void_check(
        &self,
        tenant: TenantId,
        check_id: CheckId,
    ) -> Result<Check, PaymentError> {
        let voided = self
            .store
            .update_check_if_state(
                tenant,
                check_id,
                CheckState::Available,
                CheckPatch {
                    state: Some(CheckState::Voided),
                    ..Default::default()
                },
            )
            .await?;
        match voided {
            Some(check) => {
                info!(check_id = %check_id, "check voided");
                Ok(check)
            }
            None => self.check_state_error(tenant, check_id, CheckState::Available).await,
        }
    }

    /// Reconciles an imported bank transfer against a payslip: the transfer
    /// is linked, a bank ledger outflow is recorded, and the payslip is
    /// marked paid pointing at that ledger row. The amounts must agree
    /// within [`PAYSLIP_LINK_TOLERANCE`].
    ///
    /// The linked/paid guards are conditional updates inside the
    /// transaction, so a competing link that commits after our reads makes
    /// this one roll back instead of double-settling.
    #[instrument(skip(self))]
    pub async fn link_transfer_to_payslip(
        &self,
        tenant: TenantId,
        transfer_id: TransferId,
        payslip_id: PayslipId,
    ) -> Result<PayslipLinkResult, PaymentError> {
        let transfer = self
            .store
            .get_transfer(tenant, transfer_id)
            .await?
            .ok_or(PaymentError::TransferNotFound(transfer_id))?;
        let payslip = self
            .store
            .get_payslip(tenant, payslip_id)
            .await?
            .ok_or(PaymentError::PayslipNotFound(payslip_id))?;
        if (transfer.amount - payslip.net_amount).abs() > PAYSLIP_LINK_TOLERANCE {
            return Err(PaymentError::PayslipAmountMismatch {
                payslip_net: payslip.net_amount,
                transfer_amount: transfer.amount,
            });
        }

        self.store.begin().await?;
        match self
            .payslip_link_steps(tenant, transfer_id, payslip_id, &transfer)
            .await
        {
            Ok(result) => {
                self.store.commit().await?;
                info!(transfer_id = %transfer_id, payslip_id = %payslip_id, "payslip linked");
                Ok(result)
            }
            Err(err) => {
                warn!(transfer_id = %transfer_id, error = %err, "payslip link rolled back");
                self.store.rollback().await?;
                Err(err)
            }
        }
    }

    async fn payslip_link_steps(
        &self,
        tenant: TenantId,
        transfer_id: TransferId,
        payslip_id: PayslipId,
        transfer: &crate::model::BankTransfer,
    ) -> Result<PayslipLinkResult, PaymentError> {
        let entry = self
            .store
            .insert_bank_entry(NewBankEntry {
                tenant_id: tenant,
                entry_date: transfer.transfer_date,
                amount: -transfer.amount,
                category: LedgerCategory::PayslipPayment,
                description: format!("Payslip payment - {}", transfer.beneficiary),
                invoice_id: None,
                check_id: None,
            })
            .await?;
        let linked = self
            .store
            .update_transfer_if_unlinked(
                tenant,
                transfer_id,
                TransferPatch {
                    linked: Some(true),
                    invoice_id: Patch::Keep,
                    payslip_id: Patch::Set(payslip_id),
                },
            )
            .await?;
        let Some(linked) = linked else {
            return Err(self.transfer_link_error(tenant, transfer_id).await?);
        };
        let paid = self
            .store
            .update_payslip_if_state(
                tenant,
                payslip_id,
                PayslipState::Due,
                PayslipPatch {
                    state: Some(PayslipState::Paid),
                    paid_by_entry: Patch::Set(entry.id),
                },
            )
            .await?;
        let Some(payslip) = paid else {
            return Err(match self.store.get_payslip(tenant, payslip_id).await? {
                Some(_) => PaymentError::PayslipAlreadyPaid(payslip_id),
                None => PaymentError::PayslipNotFound(payslip_id),
            });
        };

        Ok(PayslipLinkResult {
            transfer: linked,
            payslip,
            bank_entry_id: entry.id,
        })
    }

    /// Per-state check counts for the tenant.
    #[instrument(skip(self))]
    pub async fn check_stats(&self, tenant: TenantId) -> Result<CheckStats, PaymentError> {
        let checks = self.store.list_checks(tenant, CheckFilter::default()).await?;
        let mut stats = CheckStats::default();
        for check in &checks {
            match check.state {
                CheckState::Available => stats.available += 1,
                CheckState::Issued => stats.issued += 1,
                CheckState::Cashed => stats.cashed += 1,
                CheckState::Voided => stats.voided += 1,
            }
        }
        stats.total = checks.len() as u64;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        BankEntryFilter, CashEntryFilter, Fault, MemoryStore, NewInvoice, NewPayslip, NewTransfer,
    };
    use rust_decimal_macros::dec;

    const TENANT: TenantId = TenantId(1);

    fn registrar(store: &Arc<MemoryStore>) -> PaymentRegistrar<MemoryStore> {
        PaymentRegistrar::new(Arc::clone(store))
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn cash_payment(amount: Decimal) -> PaymentInstruction {
        PaymentInstruction {
            method: PaymentMethod::Cash,
            amount,
            payment_date: date(10),
            check_id: None,
            transfer_id: None,
            note: None,
        }
    }

    async fn seed_invoice(store: &MemoryStore, total: Decimal) -> Invoice {
        store
            .insert_invoice(NewInvoice {
                tenant_id: TENANT,
                number: "2026/042".to_string(),
                supplier_tax_id: "IT00112233445".to_string(),
                supplier_name: "Acme Srl".to_string(),
                issue_date: date(1),
                due_date: None,
                net_amount: total,
                tax_amount: dec!(0),
                total_amount: total,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cash_payment_creates_ledger_entry() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(500.00)).await;

        let result = registrar(&store)
            .register_invoice_payment(TENANT, invoice.id, cash_payment(dec!(500.00)))
            .await
            .unwrap();
        assert!(result.invoice.paid);
        assert_eq!(result.invoice.payment_method, PaymentMethod::Cash);
        assert_eq!(result.invoice.payment_date, Some(date(10)));
        assert!(result.cash_entry_id.is_some());
        assert!(result.bank_entry_id.is_none());

        let entries = store
            .list_cash_entries(
                TENANT,
                CashEntryFilter {
                    invoice_id: Some(invoice.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, dec!(-500.00));
        assert!(entries[0].description.contains("2026/042"));
    }

    #[tokio::test]
    async fn test_payment_atomicity_under_fault() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(500.00)).await;
        store.inject_fault(Fault::CashEntryInsert);

        let result = registrar(&store)
            .register_invoice_payment(TENANT, invoice.id, cash_payment(dec!(500.00)))
            .await;
        assert!(matches!(result, Err(PaymentError::Store(_))));

        // No partial state: the paid flag rolled back with the ledger write.
        let invoice = store.get_invoice(TENANT, invoice.id).await.unwrap().unwrap();
        assert!(!invoice.paid);
        assert_eq!(invoice.payment_method, PaymentMethod::None);
    }

    #[tokio::test]
    async fn test_check_payment_issues_check() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(1200.00)).await;
        let r = registrar(&store);
        let checks = r
            .create_check_book(TENANT, "Banca Test", 1001, 1)
            .await
            .unwrap();

        let result = r
            .register_invoice_payment(
                TENANT,
                invoice.id,
                PaymentInstruction {
                    method: PaymentMethod::Check,
                    amount: dec!(1200.00),
                    payment_date: date(12),
                    check_id: Some(checks[0].id),
                    transfer_id: None,
                    note: None,
                },
            )
            .await
            .unwrap();

        let check = result.check.unwrap();
        assert_eq!(check.state, CheckState::Issued);
        assert_eq!(check.invoice_id, Some(invoice.id));
        assert_eq!(check.amount, Some(dec!(1200.00)));
        assert_eq!(check.beneficiary.as_deref(), Some("Acme Srl"));
        assert_eq!(check.issue_date, Some(date(12)));

        let entries = store
            .list_bank_entries(
                TENANT,
                BankEntryFilter {
                    invoice_id: Some(invoice.id),
                    reconciled: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].check_id, Some(check.id));
        assert_eq!(entries[0].amount, dec!(-1200.00));
    }

    #[tokio::test]
    async fn test_paying_with_issued_check_fails_cleanly() {
        let store = Arc::new(MemoryStore::new());
        let first = seed_invoice(&store, dec!(100.00)).await;
        let second = seed_invoice(&store, dec!(100.00)).await;
        let r = registrar(&store);
        let checks = r
            .create_check_book(TENANT, "Banca Test", 2001, 1)
            .await
            .unwrap();
        let pay = || PaymentInstruction {
            method: PaymentMethod::Check,
            amount: dec!(100.00),
            payment_date: date(14),
            check_id: Some(checks[0].id),
            transfer_id: None,
            note: None,
        };

        r.register_invoice_payment(TENANT, first.id, pay())
            .await
            .unwrap();

        let result = r.register_invoice_payment(TENANT, second.id, pay()).await;
        assert!(matches!(
            result,
            Err(PaymentError::CheckNotInState {
                state: CheckState::Issued,
                ..
            })
        ));
        // The losing registration mutated nothing.
        let second = store.get_invoice(TENANT, second.id).await.unwrap().unwrap();
        assert!(!second.paid);
    }

    #[tokio::test]
    async fn test_check_method_requires_check_id() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(100.00)).await;

        let result = registrar(&store)
            .register_invoice_payment(
                TENANT,
                invoice.id,
                PaymentInstruction {
                    method: PaymentMethod::Check,
                    amount: dec!(100.00),
                    payment_date: date(14),
                    check_id: None,
                    transfer_id: None,
                    note: None,
                },
            )
            .await;
        assert!(matches!(result, Err(PaymentError::MissingCheckId)));
    }

    #[tokio::test]
    async fn test_mixed_method_rejected() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(100.00)).await;

        let result = registrar(&store)
            .register_invoice_payment(
                TENANT,
                invoice.id,
                PaymentInstruction {
                    method: PaymentMethod::Mixed,
                    amount: dec!(100.00),
                    payment_date: date(14),
                    check_id: None,
                    transfer_id: None,
                    note: None,
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(PaymentError::UnsupportedMethod(PaymentMethod::Mixed))
        ));
    }

    #[tokio::test]
    async fn test_amount_must_match_invoice_total() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(500.00)).await;

        let result = registrar(&store)
            .register_invoice_payment(TENANT, invoice.id, cash_payment(dec!(480.00)))
            .await;
        assert!(matches!(result, Err(PaymentError::AmountMismatch { .. })));

        // One cent off is within rounding tolerance.
        registrar(&store)
            .register_invoice_payment(TENANT, invoice.id, cash_payment(dec!(500.01)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_already_paid_rejected() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(500.00)).await;
        let r = registrar(&store);
        r.register_invoice_payment(TENANT, invoice.id, cash_payment(dec!(500.00)))
            .await
            .unwrap();

        let result = r
            .register_invoice_payment(TENANT, invoice.id, cash_payment(dec!(500.00)))
            .await;
        assert!(matches!(result, Err(PaymentError::InvoiceAlreadyPaid(_))));
    }

    #[tokio::test]
    async fn test_wire_payment_links_transfer() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(850.00)).await;
        let transfer = store
            .insert_transfer(NewTransfer {
                tenant_id: TENANT,
                transfer_date: date(8),
                beneficiary: "Acme Srl".to_string(),
                iban: Some("IT60X0542811101000000123456".to_string()),
                amount: dec!(850.00),
                reason: Some("invoice 2026/042".to_string()),
                source_file: None,
            })
            .await
            .unwrap();

        let result = registrar(&store)
            .register_invoice_payment(
                TENANT,
                invoice.id,
                PaymentInstruction {
                    method: PaymentMethod::BankTransfer,
                    amount: dec!(850.00),
                    payment_date: date(8),
                    check_id: None,
                    transfer_id: Some(transfer.id),
                    note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(result.transfer_linked, Some(transfer.id));

        let transfer = store.get_transfer(TENANT, transfer.id).await.unwrap().unwrap();
        assert!(transfer.linked);
        assert_eq!(transfer.invoice_id, Some(invoice.id));
    }

    #[tokio::test]
    async fn test_check_book_bounds() {
        let store = Arc::new(MemoryStore::new());
        let r = registrar(&store);

        let checks = r
            .create_check_book(TENANT, "Banca Test", 5001, 100)
            .await
            .unwrap();
        assert_eq!(checks.len(), 100);
        assert_eq!(checks[0].serial, "5001");
        assert_eq!(checks[99].serial, "5100");
        assert!(checks.iter().all(|c| c.state == CheckState::Available));

        assert!(matches!(
            r.create_check_book(TENANT, "Banca Test", 6001, 101).await,
            Err(PaymentError::CheckBookSize(101))
        ));
        assert!(matches!(
            r.create_check_book(TENANT, "Banca Test", 6001, 0).await,
            Err(PaymentError::CheckBookSize(0))
        ));
    }

    #[tokio::test]
    async fn test_check_book_duplicate_serial_rolls_back() {
        let store = Arc::new(MemoryStore::new());
        let r = registrar(&store);
        r.create_check_book(TENANT, "Banca Test", 1005, 1)
            .await
            .unwrap();

        // 1001..1010 collides with the existing 1005.
        let result = r.create_check_book(TENANT, "Banca Test", 1001, 10).await;
        assert!(matches!(result, Err(PaymentError::DuplicateSerial(_))));

        // None of the new carnet survived.
        let stats = r.check_stats(TENANT).await.unwrap();
        assert_eq!(stats.total, 1);
    }

    #[tokio::test]
    async fn test_check_cash_and_void_lifecycle() {
        let store = Arc::new(MemoryStore::new());
        let invoice = seed_invoice(&store, dec!(300.00)).await;
        let r = registrar(&store);
        let checks = r
            .create_check_book(TENANT, "Banca Test", 7001, 2)
            .await
            .unwrap();

        // Cashing a blank check is invalid.
        assert!(matches!(
            r.mark_check_cashed(TENANT, checks[0].id, date(20)).await,
            Err(PaymentError::CheckNotInState { .. })
        ));

        r.register_invoice_payment(
            TENANT,
            invoice.id,
            PaymentInstruction {
                method: PaymentMethod::Check,
                amount: dec!(300.00),
                payment_date: date(15),
                check_id: Some(checks[0].id),
                transfer_id: None,
                note: None,
            },
        )
        .await
        .unwrap();

        let cashed = r
            .mark_check_cashed(TENANT, checks[0].id, date(20))
            .await
            .unwrap();
        assert_eq!(cashed.state, CheckState::Cashed);
        assert_eq!(cashed.cash_date, Some(date(20)));

        let voided = r.void_check(TENANT, checks[1].id).await.unwrap();
        assert_eq!(voided.state, CheckState::Voided);
        // Voided checks cannot be issued.
        assert!(matches!(
            r.void_check(TENANT, checks[1].id).await,
            Err(PaymentError::CheckNotInState { .. })
        ));

        let stats = r.check_stats(TENANT).await.unwrap();
        assert_eq!(
            stats,
            CheckStats {
                available: 0,
                issued: 0,
                cashed: 1,
                voided: 1,
                total: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_payslip_link_within_tolerance() {
        let store = Arc::new(MemoryStore::new());
        let employee = store
            .insert_employee(crate::store::NewEmployee {
                tenant_id: TENANT,
                tax_id: "RSSMRA80A01H501U".to_string(),
                first_name: "Mario".to_string(),
                last_name: "Rossi".to_string(),
            })
            .await
            .unwrap();
        let payslip = store
            .insert_payslip(NewPayslip {
                tenant_id: TENANT,
                employee_id: employee.id,
                period: "2026-04".to_string(),
                gross_amount: dec!(2100.00),
                net_amount: dec!(1600.00),
            })
            .await
            .unwrap();
        let transfer = store
            .insert_transfer(NewTransfer {
                tenant_id: TENANT,
                transfer_date: date(27),
                beneficiary: "Mario Rossi".to_string(),
                iban: None,
                amount: dec!(1600.80),
                reason: Some("salary april".to_string()),
                source_file: None,
            })
            .await
            .unwrap();

        let result = registrar(&store)
            .link_transfer_to_payslip(TENANT, transfer.id, payslip.id)
            .await
            .unwrap();
        assert!(result.transfer.linked);
        assert_eq!(result.transfer.payslip_id, Some(payslip.id));
        assert_eq!(result.payslip.state, PayslipState::Paid);
        assert_eq!(result.payslip.paid_by_entry, Some(result.bank_entry_id));

        // Linking again fails on both sides.
        assert!(matches!(
            registrar(&store)
                .link_transfer_to_payslip(TENANT, transfer.id, payslip.id)
                .await,
            Err(PaymentError::TransferAlreadyLinked(_))
        ));
    }

    #[tokio::test]
    async fn test_payslip_link_loses_to_competing_link() {
        let store = Arc::new(MemoryStore::new());
        let employee = store
            .insert_employee(crate::store::NewEmployee {
                tenant_id: TENANT,
                tax_id: "RSSMRA80A01H501U".to_string(),
                first_name: "Mario".to_string(),
                last_name: "Rossi".to_string(),
            })
            .await
            .unwrap();
        let payslip = store
            .insert_payslip(NewPayslip {
                tenant_id: TENANT,
                employee_id: employee.id,
                period: "2026-04".to_string(),
                gross_amount: dec!(2100.00),
                net_amount: dec!(1600.00),
            })
            .await
            .unwrap();
        let transfer = store
            .insert_transfer(NewTransfer {
                tenant_id: TENANT,
                transfer_date: date(27),
                beneficiary: "Mario Rossi".to_string(),
                iban: None,
                amount: dec!(1600.00),
                reason: None,
                source_file: None,
            })
            .await
            .unwrap();

        // Another task settles the transfer first.
        store
            .update_transfer(
                TENANT,
                transfer.id,
                TransferPatch {
                    linked: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = registrar(&store)
            .link_transfer_to_payslip(TENANT, transfer.id, payslip.id)
            .await;
        assert!(matches!(
            result,
            Err(PaymentError::TransferAlreadyLinked(_))
        ));

        // The losing link rolled back fully: payslip still due, no outflow.
        let payslip = store.get_payslip(TENANT, payslip.id).await.unwrap().unwrap();
        assert_eq!(payslip.state, PayslipState::Due);
        let entries = store
            .list_bank_entries(TENANT, BankEntryFilter::default())
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_payslip_link_loses_to_paid_payslip() {
        let store = Arc::new(MemoryStore::new());
        let employee = store
            .insert_employee(crate::store::NewEmployee {
                tenant_id: TENANT,
                tax_id: "RSSMRA80A01H501U".to_string(),
                first_name: "Mario".to_string(),
                last_name: "Rossi".to_string(),
            })
            .await
            .unwrap();
        let payslip = store
            .insert_payslip(NewPayslip {
                tenant_id: TENANT,
                employee_id: employee.id,
                period: "2026-04".to_string(),
                gross_amount: dec!(2100.00),
                net_amount: dec!(1600.00),
            })
            .await
            .unwrap();
        let transfer = store
            .insert_transfer(NewTransfer {
                tenant_id: TENANT,
                transfer_date: date(27),
                beneficiary: "Mario Rossi".to_string(),
                iban: None,
                amount: dec!(1600.00),
                reason: None,
                source_file: None,
            })
            .await
            .unwrap();

        // Another wire paid this payslip first.
        store
            .update_payslip(
                TENANT,
                payslip.id,
                crate::store::PayslipPatch {
                    state: Some(PayslipState::Paid),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = registrar(&store)
            .link_transfer_to_payslip(TENANT, transfer.id, payslip.id)
            .await;
        assert!(matches!(result, Err(PaymentError::PayslipAlreadyPaid(_))));

        // The transfer link and the ledger outflow rolled back together.
        let transfer = store.get_transfer(TENANT, transfer.id).await.unwrap().unwrap();
        assert!(!transfer.linked);
        assert_eq!(transfer.payslip_id, None);
        let entries = store
            .list_bank_entries(TENANT, BankEntryFilter::default())
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_payslip_link_beyond_tolerance() {
        let store = Arc::new(MemoryStore::new());
        let employee = store
            .insert_employee(crate::store::NewEmployee {
                tenant_id: TENANT,
                tax_id: "RSSMRA80A01H501U".to_string(),
                first_name: "Mario".to_string(),
                last_name: "Rossi".to_string(),
            })
            .await
            .unwrap();
        let payslip = store
            .insert_payslip(NewPayslip {
                tenant_id: TENANT,
                employee_id: employee.id,
                period: "2026-04".to_string(),
                gross_amount: dec!(2100.00),
                net_amount: dec!(1600.00),
            })
            .await
            .unwrap();
        let transfer = store
            .insert_transfer(NewTransfer {
                tenant_id: TENANT,
                transfer_date: date(27),
                beneficiary: "Mario Rossi".to_string(),
                iban: None,
                amount: dec!(1601.01),
                reason: None,
                source_file: None,
            })
            .await
            .unwrap();

        let result = registrar(&store)
            .link_transfer_to_payslip(TENANT, transfer.id, payslip.id)
            .await;
        assert!(matches!(
            result,
            Err(PaymentError::PayslipAmountMismatch { .. })
        ));
        let payslip = store.get_payslip(TENANT, payslip.id).await.unwrap().unwrap();
        assert_eq!(payslip.state, PayslipState::Due);
    }
}
