//! Pre-built Test Fixtures
//!
//! Provides ready-to-use dates, contacts and a populated in-memory store.
//! These fixtures are designed to be consistent and predictable for unit tests.

use std::sync::Arc;

use chrono::{Days, NaiveDate};

use domain_billing::{AccountingSession, AccountingStore, InMemoryAccountingStore, InvoiceQuery};
use domain_party::{Contact, ContactRole};
use domain_policy::{BillingSchedule, Policy};

use crate::builders::TestPolicyBuilder;

/// Builds a calendar date, panicking on an impossible one
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Returns the date `n` days after `d`
pub fn days_after(d: NaiveDate, n: u64) -> NaiveDate {
    d.checked_add_days(Days::new(n)).unwrap()
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard effective date (Jan 1, 2015)
    pub fn effective_date() -> NaiveDate {
        date(2015, 1, 1)
    }

    /// Effective date that does not start a calendar quarter
    pub fn off_cycle_effective_date() -> NaiveDate {
        date(2015, 2, 1)
    }

    /// Effective date on a month end, for clamping tests
    pub fn month_end_effective_date() -> NaiveDate {
        date(2015, 1, 31)
    }
}

/// Fixture for contact test data
pub struct ContactFixtures;

impl ContactFixtures {
    /// A named insured
    pub fn insured() -> Contact {
        Contact::new("Ryan Bucket", ContactRole::NamedInsured)
    }

    /// An agent
    pub fn agent() -> Contact {
        Contact::new("Joe Lee", ContactRole::Agent)
    }
}

/// In-memory store holding one policy with its insured and agent
pub struct AccountingFixture {
    pub store: InMemoryAccountingStore,
    pub policy: Policy,
    pub insured: Contact,
    pub agent: Contact,
}

impl AccountingFixture {
    /// Policy effective Jan 1, 2015 with the given premium and schedule
    pub async fn new(premium: i64, schedule: BillingSchedule) -> Self {
        Self::effective(TemporalFixtures::effective_date(), premium, schedule).await
    }

    /// Policy with an explicit effective date
    pub async fn effective(effective_date: NaiveDate, premium: i64, schedule: BillingSchedule) -> Self {
        let store = InMemoryAccountingStore::new();
        let insured = ContactFixtures::insured();
        let agent = ContactFixtures::agent();
        store.insert_contact(insured.clone()).await;
        store.insert_contact(agent.clone()).await;

        let policy = TestPolicyBuilder::new()
            .with_effective_date(effective_date)
            .with_annual_premium(premium)
            .with_schedule(schedule)
            .with_named_insured(insured.id)
            .with_agent(agent.id)
            .build();
        store.insert_policy(policy.clone()).await;

        Self { store, policy, insured, agent }
    }

    /// The store as the session sees it
    pub fn shared(&self) -> Arc<dyn AccountingStore> {
        Arc::new(self.store.clone())
    }

    /// Opens a session, generating invoices on first use
    pub async fn open(&self) -> AccountingSession {
        AccountingSession::open(self.shared(), self.policy.id).await.unwrap()
    }

    /// Bill dates of the live invoices, oldest first
    pub async fn bill_dates(&self) -> Vec<NaiveDate> {
        self.store
            .list_invoices(self.policy.id, InvoiceQuery::live())
            .await
            .unwrap()
            .iter()
            .map(|i| i.bill_date)
            .collect()
    }

    /// Amounts of the live invoices, oldest first
    pub async fn amounts(&self) -> Vec<i64> {
        self.store
            .list_invoices(self.policy.id, InvoiceQuery::live())
            .await
            .unwrap()
            .iter()
            .map(|i| i.amount_due)
            .collect()
    }
}
