//! Demo dataset
//!
//! Three policies with their contacts, used by the in-memory deployment and
//! by tests. Loading goes through the accounting session so the invoices and
//! payments are produced exactly as in normal operation.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use core_kernel::{ContactId, PolicyId};
use domain_billing::{AccountingSession, BillingError, InMemoryAccountingStore};
use domain_party::{Contact, ContactRole};
use domain_policy::{BillingSchedule, Policy, PolicyBuilder, PolicyError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Invalid demo date {0}-{1}-{2}")]
    Date(i32, u32, u32),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Billing(#[from] BillingError),
}

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, SeedError> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or(SeedError::Date(y, m, d))
}

/// A payment to record once invoices exist
#[derive(Debug, Clone)]
pub struct DemoPayment {
    pub policy_id: PolicyId,
    pub contact_id: ContactId,
    pub amount: i64,
    pub on: NaiveDate,
}

/// Contacts, policies and payments of the demo dataset
#[derive(Debug, Clone)]
pub struct DemoDataset {
    pub contacts: Vec<Contact>,
    pub policies: Vec<Policy>,
    pub payments: Vec<DemoPayment>,
}

impl DemoDataset {
    /// Builds the dataset with fresh identifiers
    pub fn build() -> Result<Self, SeedError> {
        let john_agent = Contact::new("John Doe", ContactRole::Agent);
        let john_insured = Contact::new("John Doe", ContactRole::NamedInsured);
        let bob = Contact::new("Bob Smith", ContactRole::Agent);
        let anna = Contact::new("Anna White", ContactRole::NamedInsured);
        let joe = Contact::new("Joe Lee", ContactRole::Agent);
        let ryan = Contact::new("Ryan Bucket", ContactRole::NamedInsured);

        let policy_one = PolicyBuilder::new()
            .name("Policy One")
            .effective_date(date(2015, 1, 1)?)
            .annual_premium(365)
            .billing_schedule(BillingSchedule::Annual)
            .agent(bob.id)
            .build()?;

        let policy_two = PolicyBuilder::new()
            .name("Policy Two")
            .effective_date(date(2015, 2, 1)?)
            .annual_premium(1600)
            .billing_schedule(BillingSchedule::Quarterly)
            .named_insured(anna.id)
            .agent(joe.id)
            .build()?;

        let policy_three = PolicyBuilder::new()
            .name("Policy Three")
            .effective_date(date(2015, 1, 1)?)
            .annual_premium(1200)
            .billing_schedule(BillingSchedule::Monthly)
            .named_insured(ryan.id)
            .agent(john_agent.id)
            .build()?;

        let payments = vec![DemoPayment {
            policy_id: policy_two.id,
            contact_id: anna.id,
            amount: 400,
            on: date(2015, 2, 1)?,
        }];

        Ok(Self {
            contacts: vec![john_agent, john_insured, bob, anna, joe, ryan],
            policies: vec![policy_one, policy_two, policy_three],
            payments,
        })
    }

    /// Looks up a policy by name
    pub fn policy(&self, name: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.name == name)
    }

    /// Looks up a contact by name and role
    pub fn contact(&self, name: &str, role: ContactRole) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.name == name && c.role == role)
    }

    /// Writes the dataset into a store, generating invoices and recording payments
    pub async fn load(&self, store: &InMemoryAccountingStore) -> Result<(), SeedError> {
        for contact in &self.contacts {
            store.insert_contact(contact.clone()).await;
        }

        let shared: Arc<InMemoryAccountingStore> = Arc::new(store.clone());
        let mut sessions = Vec::with_capacity(self.policies.len());
        for policy in &self.policies {
            store.insert_policy(policy.clone()).await;
            sessions.push(AccountingSession::open(shared.clone(), policy.id).await?);
        }

        for payment in &self.payments {
            let session = sessions
                .iter()
                .find(|s| s.policy().id == payment.policy_id)
                .ok_or(BillingError::PolicyNotFound(payment.policy_id))?;
            session
                .make_payment(Some(payment.contact_id), Some(payment.on), payment.amount)
                .await?;
        }

        info!(
            contacts = self.contacts.len(),
            policies = self.policies.len(),
            payments = self.payments.len(),
            "Loaded demo dataset"
        );
        Ok(())
    }
}
