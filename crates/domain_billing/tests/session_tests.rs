//! Tests for the accounting session against the in-memory store

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};

use core_kernel::{ContactId, PolicyId};
use domain_billing::{
    AccountingSession, AccountingStore, BillingError, InMemoryAccountingStore, InvoiceQuery,
    SessionState, UnitOfWork,
};
use domain_party::{Contact, ContactRole};
use domain_policy::{BillingSchedule, Policy, PolicyBuilder, PolicyStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn days_after(d: NaiveDate, n: u64) -> NaiveDate {
    d.checked_add_days(Days::new(n)).unwrap()
}

struct Fixture {
    store: InMemoryAccountingStore,
    policy: Policy,
    insured: Contact,
    agent: Contact,
}

impl Fixture {
    async fn new(premium: i64, schedule: BillingSchedule) -> Self {
        let store = InMemoryAccountingStore::new();
        let insured = Contact::new("Test Insured", ContactRole::NamedInsured);
        let agent = Contact::new("Test Agent", ContactRole::Agent);
        store.insert_contact(insured.clone()).await;
        store.insert_contact(agent.clone()).await;

        let policy = PolicyBuilder::new()
            .name("Test Policy")
            .effective_date(date(2015, 1, 1))
            .annual_premium(premium)
            .billing_schedule(schedule)
            .named_insured(insured.id)
            .agent(agent.id)
            .build()
            .unwrap();
        store.insert_policy(policy.clone()).await;

        Self { store, policy, insured, agent }
    }

    fn shared(&self) -> Arc<dyn AccountingStore> {
        Arc::new(self.store.clone())
    }

    async fn open(&self) -> AccountingSession {
        AccountingSession::open(self.shared(), self.policy.id).await.unwrap()
    }

    async fn bill_dates(&self) -> Vec<NaiveDate> {
        self.store
            .list_invoices(self.policy.id, InvoiceQuery::live())
            .await
            .unwrap()
            .iter()
            .map(|i| i.bill_date)
            .collect()
    }
}

// ============================================================================
// Construction Tests
// ============================================================================

mod construction_tests {
    use super::*;

    #[tokio::test]
    async fn test_annual_policy_gets_one_invoice() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        fx.open().await;

        let invoices = fx.store.all_invoices(fx.policy.id).await;
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].amount_due, 1200);
    }

    #[tokio::test]
    async fn test_monthly_policy_gets_twelve_invoices() {
        let fx = Fixture::new(1200, BillingSchedule::Monthly).await;
        fx.open().await;

        let invoices = fx.store.all_invoices(fx.policy.id).await;
        assert_eq!(invoices.len(), 12);
        assert!(invoices.iter().all(|i| i.amount_due == 100));
    }

    #[tokio::test]
    async fn test_reopening_does_not_duplicate_invoices() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        fx.open().await;
        fx.open().await;

        assert_eq!(fx.store.all_invoices(fx.policy.id).await.len(), 4);
    }

    #[tokio::test]
    async fn test_pending_session_has_no_invoices_yet() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let pending = AccountingSession::load(fx.shared(), fx.policy.id).await.unwrap();

        assert_eq!(pending.policy().id, fx.policy.id);
        assert!(fx.store.all_invoices(fx.policy.id).await.is_empty());

        let session = pending.with_span(tracing::Span::none()).ensure_invoices().await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(fx.store.all_invoices(fx.policy.id).await.len(), 4);
    }

    #[tokio::test]
    async fn test_regenerates_when_all_invoices_deleted() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        fx.open().await;

        let ids: Vec<_> = fx.store.all_invoices(fx.policy.id).await.iter().map(|i| i.id).collect();
        fx.store.commit(UnitOfWork::new(fx.policy.id).soft_delete(ids)).await.unwrap();
        fx.open().await;

        let invoices = fx.store.all_invoices(fx.policy.id).await;
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices.iter().filter(|i| i.is_live()).count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_policy() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let missing = PolicyId::new();

        let result = AccountingSession::open(fx.shared(), missing).await;
        assert!(matches!(result, Err(BillingError::PolicyNotFound(id)) if id == missing));
    }
}

// ============================================================================
// Balance Tests
// ============================================================================

mod balance_tests {
    use super::*;

    #[tokio::test]
    async fn test_annual_on_effective_date() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let session = fx.open().await;

        assert_eq!(session.return_account_balance(Some(date(2015, 1, 1))).await.unwrap(), 1200);
    }

    #[tokio::test]
    async fn test_quarterly_on_effective_date() {
        let fx = Fixture::new(1200, BillingSchedule::Quarterly).await;
        let session = fx.open().await;

        assert_eq!(session.return_account_balance(Some(date(2015, 1, 1))).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_quarterly_on_last_bill_date() {
        let fx = Fixture::new(1200, BillingSchedule::Quarterly).await;
        let session = fx.open().await;
        let last = fx.bill_dates().await[3];

        assert_eq!(session.return_account_balance(Some(last)).await.unwrap(), 1200);
    }

    #[tokio::test]
    async fn test_full_payment_on_second_bill_date() {
        let fx = Fixture::new(1200, BillingSchedule::Quarterly).await;
        let session = fx.open().await;
        let second = fx.bill_dates().await[1];

        session.make_payment(Some(fx.insured.id), Some(second), 600).await.unwrap();

        assert_eq!(session.return_account_balance(Some(second)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_before_effective_date_is_zero() {
        let fx = Fixture::new(1200, BillingSchedule::Monthly).await;
        let session = fx.open().await;

        assert_eq!(session.return_account_balance(Some(date(2014, 12, 31))).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overpayment_is_credit() {
        let fx = Fixture::new(1200, BillingSchedule::Monthly).await;
        let session = fx.open().await;

        session.make_payment(None, Some(date(2015, 1, 1)), 300).await.unwrap();

        assert_eq!(session.return_account_balance(Some(date(2015, 1, 1))).await.unwrap(), -200);
    }

    #[tokio::test]
    async fn test_future_payment_not_counted() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let session = fx.open().await;

        session.make_payment(None, Some(date(2015, 3, 1)), 1200).await.unwrap();

        assert_eq!(session.return_account_balance(Some(date(2015, 2, 28))).await.unwrap(), 1200);
        assert_eq!(session.return_account_balance(Some(date(2015, 3, 1))).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_statement_matches_balance() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let session = fx.open().await;
        session.make_payment(None, Some(date(2015, 1, 1)), 400).await.unwrap();

        let statement = session.statement(Some(date(2015, 4, 1))).await.unwrap();

        assert_eq!(statement.policy_id, fx.policy.id);
        assert_eq!(statement.invoices.len(), 2);
        assert_eq!(statement.balance, 400);
        assert_eq!(statement.total_paid(), 400);
    }
}

// ============================================================================
// Payment Tests
// ============================================================================

mod payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_to_named_insured() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let session = fx.open().await;

        let payment = session.make_payment(None, Some(date(2015, 1, 15)), 500).await.unwrap();

        assert_eq!(payment.contact_id, fx.insured.id);
        assert_eq!(payment.policy_id, fx.policy.id);
        assert_eq!(payment.amount_paid, 500);
        assert_eq!(payment.transaction_date, date(2015, 1, 15));
    }

    #[tokio::test]
    async fn test_explicit_contact_is_recorded() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let session = fx.open().await;

        let payment = session.make_payment(Some(fx.agent.id), Some(date(2015, 1, 15)), 500).await.unwrap();

        assert_eq!(payment.contact_id, fx.agent.id);
    }

    #[tokio::test]
    async fn test_defaults_to_today() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let session = fx.open().await;

        let payment = session.make_payment(None, None, 100).await.unwrap();

        assert_eq!(payment.transaction_date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_missing_named_insured() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let mut policy = fx.policy.clone();
        policy.named_insured = None;
        fx.store.insert_policy(policy).await;
        let session = fx.open().await;

        let result = session.make_payment(None, Some(date(2015, 1, 1)), 100).await;

        assert!(matches!(result, Err(BillingError::ContactResolution { policy_id }) if policy_id == fx.policy.id));
    }

    #[tokio::test]
    async fn test_named_insured_not_in_store() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let mut policy = fx.policy.clone();
        policy.named_insured = Some(ContactId::new());
        fx.store.insert_policy(policy).await;
        let session = fx.open().await;

        let result = session.make_payment(None, Some(date(2015, 1, 1)), 100).await;

        assert!(matches!(result, Err(BillingError::ContactResolution { .. })));
        assert!(fx.store.list_payments(fx.policy.id, Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let session = fx.open().await;

        assert!(matches!(
            session.make_payment(None, Some(date(2015, 1, 1)), 0).await,
            Err(BillingError::InvalidAmount(0))
        ));
    }
}

// ============================================================================
// Cancellation Tests
// ============================================================================

mod cancellation_tests {
    use super::*;

    async fn quarterly_with_first_installment_paid() -> (Fixture, AccountingSession, NaiveDate) {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let session = fx.open().await;
        session.make_payment(None, Some(date(2015, 1, 1)), 400).await.unwrap();

        let second_due = fx
            .store
            .list_invoices(fx.policy.id, InvoiceQuery::live())
            .await
            .unwrap()[1]
            .due_date;
        (fx, session, second_due)
    }

    #[tokio::test]
    async fn test_unpaid_before_cancel_date() {
        let (_fx, session, second_due) = quarterly_with_first_installment_paid().await;
        let evaluation = days_after(second_due, 10);

        assert!(!session.evaluate_cancellation_pending_due_to_non_pay(Some(evaluation)).await.unwrap());
        assert!(!session.evaluate_cancel(Some(evaluation)).await.unwrap());
    }

    #[tokio::test]
    async fn test_unpaid_past_cancel_date() {
        let (_fx, session, second_due) = quarterly_with_first_installment_paid().await;
        let evaluation = days_after(second_due, 20);

        assert!(session.evaluate_cancellation_pending_due_to_non_pay(Some(evaluation)).await.unwrap());
        assert!(session.evaluate_cancel(Some(evaluation)).await.unwrap());
    }

    #[tokio::test]
    async fn test_paid_late_but_before_cancel_date() {
        let (_fx, session, second_due) = quarterly_with_first_installment_paid().await;
        session.make_payment(None, Some(days_after(second_due, 8)), 400).await.unwrap();

        let evaluation = days_after(second_due, 20);
        assert!(!session.evaluate_cancellation_pending_due_to_non_pay(Some(evaluation)).await.unwrap());
    }

    #[tokio::test]
    async fn test_nothing_lapsed_yet() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let session = fx.open().await;

        assert!(!session.evaluate_cancel(Some(date(2015, 2, 14))).await.unwrap());
        assert!(session.evaluate_cancel(Some(date(2015, 2, 15))).await.unwrap());
    }

    #[tokio::test]
    async fn test_cancel_policy_is_idempotent() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let mut session = fx.open().await;

        let first = session.cancel_policy("underwriting").await.unwrap();
        let second = session.cancel_policy("underwriting").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.status, PolicyStatus::Canceled);
        assert_eq!(second.cancellation_reason.as_deref(), Some("underwriting"));
        assert_eq!(second.status_changed_on, Some(Utc::now().date_naive()));
        assert_eq!(session.state(), SessionState::Canceled);

        let stored = fx.store.find_policy(fx.policy.id).await.unwrap();
        assert_eq!(stored, second);
    }
}

// ============================================================================
// Policy Change Tests
// ============================================================================

mod change_tests {
    use super::*;

    #[tokio::test]
    async fn test_quarterly_to_monthly() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let mut session = fx.open().await;
        session.make_payment(None, Some(date(2015, 1, 1)), 400).await.unwrap();

        let updated = session
            .change_policy(BillingSchedule::Monthly, date(2015, 3, 1))
            .await
            .unwrap();

        assert_eq!(updated.billing_schedule, BillingSchedule::Monthly);
        assert_eq!(updated.named_insured, Some(fx.insured.id));
        assert_eq!(updated.agent, Some(fx.agent.id));

        let all = fx.store.all_invoices(fx.policy.id).await;
        let superseded: Vec<_> = all.iter().filter(|i| !i.is_live()).collect();
        assert_eq!(superseded.len(), 3);
        assert!(superseded.iter().all(|i| i.bill_date >= date(2015, 3, 1)));

        let new: Vec<_> = all
            .iter()
            .filter(|i| i.is_live() && i.bill_date >= date(2015, 3, 1))
            .collect();
        assert_eq!(new.len(), 10);
        assert!(new.iter().all(|i| i.amount_due == 120));
        assert_eq!(new.last().unwrap().bill_date, date(2015, 12, 1));

        let kept: Vec<_> = all.iter().filter(|i| i.is_live() && i.bill_date < date(2015, 3, 1)).collect();
        assert_eq!(kept.len(), 1);

        let stored = fx.store.find_policy(fx.policy.id).await.unwrap();
        assert_eq!(stored.billing_schedule, BillingSchedule::Monthly);
    }

    #[tokio::test]
    async fn test_balance_after_change() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let mut session = fx.open().await;
        session.make_payment(None, Some(date(2015, 1, 1)), 400).await.unwrap();
        session.change_policy(BillingSchedule::Monthly, date(2015, 3, 1)).await.unwrap();

        assert_eq!(session.return_account_balance(Some(date(2015, 3, 1))).await.unwrap(), 120);
        assert_eq!(session.return_account_balance(Some(date(2015, 12, 1))).await.unwrap(), 1200);
    }

    #[tokio::test]
    async fn test_change_on_effective_date_replaces_everything() {
        let fx = Fixture::new(1200, BillingSchedule::Annual).await;
        let mut session = fx.open().await;

        session.change_policy(BillingSchedule::Quarterly, date(2015, 1, 1)).await.unwrap();

        let live = fx.store.list_invoices(fx.policy.id, InvoiceQuery::live()).await.unwrap();
        assert_eq!(live.len(), 4);
        assert!(live.iter().all(|i| i.amount_due == 300));
    }

    #[tokio::test]
    async fn test_overpaid_policy_bills_zero() {
        let fx = Fixture::new(1200, BillingSchedule::Monthly).await;
        let mut session = fx.open().await;
        session.make_payment(None, Some(date(2015, 2, 1)), 1500).await.unwrap();

        session.change_policy(BillingSchedule::TwoPay, date(2015, 6, 1)).await.unwrap();

        let new = fx
            .store
            .list_invoices(fx.policy.id, InvoiceQuery::live().billed_from(date(2015, 6, 1)))
            .await
            .unwrap();
        assert_eq!(new.len(), 2);
        assert!(new.iter().all(|i| i.amount_due == 0));
    }

    #[tokio::test]
    async fn test_monthly_change_on_march_first_bills_march_through_december() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let mut session = fx.open().await;
        session.make_payment(None, Some(date(2015, 1, 1)), 400).await.unwrap();

        session.change_policy(BillingSchedule::Monthly, date(2015, 3, 1)).await.unwrap();

        let new = fx
            .store
            .list_invoices(fx.policy.id, InvoiceQuery::live().billed_from(date(2015, 3, 1)))
            .await
            .unwrap();
        let bill_dates: Vec<_> = new.iter().map(|i| i.bill_date).collect();
        let expected: Vec<_> = (3..=12).map(|m| date(2015, m, 1)).collect();
        assert_eq!(bill_dates, expected);
        assert_eq!(new.iter().map(|i| i.amount_due).sum::<i64>(), 1200);
    }

    #[tokio::test]
    async fn test_unpaid_kept_invoice_is_not_billed_twice() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let mut session = fx.open().await;

        session.change_policy(BillingSchedule::Monthly, date(2015, 3, 1)).await.unwrap();

        let live = fx.store.list_invoices(fx.policy.id, InvoiceQuery::live()).await.unwrap();
        assert_eq!(live.iter().map(|i| i.amount_due).sum::<i64>(), 1600);
        assert_eq!(live[0].bill_date, date(2015, 1, 1));
        assert_eq!(live[0].amount_due, 400);
        assert!(live[1..].iter().all(|i| i.amount_due == 120));
        assert_eq!(session.return_account_balance(Some(date(2015, 12, 31))).await.unwrap(), 1600);
    }

    #[tokio::test]
    async fn test_partially_paid_kept_invoices() {
        let fx = Fixture::new(1200, BillingSchedule::Monthly).await;
        let mut session = fx.open().await;
        session.make_payment(None, Some(date(2015, 2, 1)), 300).await.unwrap();

        session.change_policy(BillingSchedule::TwoPay, date(2015, 6, 1)).await.unwrap();

        let live = fx.store.list_invoices(fx.policy.id, InvoiceQuery::live()).await.unwrap();
        assert_eq!(live.len(), 7);
        assert_eq!(live.iter().map(|i| i.amount_due).sum::<i64>(), 1200);

        let new: Vec<_> = live.iter().filter(|i| i.bill_date >= date(2015, 6, 1)).collect();
        assert_eq!(new.len(), 2);
        assert!(new.iter().all(|i| i.amount_due == 350));
        assert_eq!(new[1].bill_date, date(2015, 12, 1));

        assert_eq!(session.return_account_balance(Some(date(2015, 6, 1))).await.unwrap(), 550);
        assert_eq!(session.return_account_balance(Some(date(2015, 12, 1))).await.unwrap(), 900);
    }

    #[tokio::test]
    async fn test_change_outside_term() {
        let fx = Fixture::new(1200, BillingSchedule::Quarterly).await;
        let mut session = fx.open().await;

        let before = session.change_policy(BillingSchedule::Monthly, date(2014, 12, 31)).await;
        assert!(matches!(before, Err(BillingError::ChangeOutsideTerm { .. })));

        let after = session.change_policy(BillingSchedule::Monthly, date(2016, 1, 1)).await;
        assert!(matches!(
            after,
            Err(BillingError::ChangeOutsideTerm { term_end, .. }) if term_end == date(2016, 1, 1)
        ));
        assert_eq!(fx.bill_dates().await.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_commit_changes_nothing() {
        let fx = Fixture::new(1600, BillingSchedule::Quarterly).await;
        let mut session = fx.open().await;
        let before = fx.store.all_invoices(fx.policy.id).await;

        fx.store.fail_next_commit();
        let result = session.change_policy(BillingSchedule::Monthly, date(2015, 3, 1)).await;

        assert!(matches!(result, Err(BillingError::Store(_))));
        assert_eq!(fx.store.all_invoices(fx.policy.id).await, before);
        assert_eq!(session.policy().billing_schedule, BillingSchedule::Quarterly);
        assert_eq!(
            fx.store.find_policy(fx.policy.id).await.unwrap().billing_schedule,
            BillingSchedule::Quarterly
        );
    }
}
