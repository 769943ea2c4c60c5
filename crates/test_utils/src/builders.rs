//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;

use core_kernel::{ContactId, PolicyId};
use domain_party::{Contact, ContactRole};
use domain_policy::{BillingSchedule, Policy, PolicyBuilder};

use crate::fixtures::TemporalFixtures;

/// Builder for constructing test policies
pub struct TestPolicyBuilder {
    policy_id: PolicyId,
    name: String,
    effective_date: NaiveDate,
    annual_premium: i64,
    schedule: BillingSchedule,
    named_insured: Option<ContactId>,
    agent: Option<ContactId>,
}

impl Default for TestPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPolicyBuilder {
    /// Creates a new builder with default values
    ///
    /// Defaults to a 1200 premium billed quarterly from Jan 1, 2015, with a
    /// generated name and no contacts.
    pub fn new() -> Self {
        Self {
            policy_id: PolicyId::new(),
            name: format!("{} Policy", CompanyName().fake::<String>()),
            effective_date: TemporalFixtures::effective_date(),
            annual_premium: 1200,
            schedule: BillingSchedule::Quarterly,
            named_insured: None,
            agent: None,
        }
    }

    /// Sets the policy ID
    pub fn with_policy_id(mut self, id: PolicyId) -> Self {
        self.policy_id = id;
        self
    }

    /// Sets the policy name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the effective date
    pub fn with_effective_date(mut self, date: NaiveDate) -> Self {
        self.effective_date = date;
        self
    }

    /// Sets the annual premium
    pub fn with_annual_premium(mut self, premium: i64) -> Self {
        self.annual_premium = premium;
        self
    }

    /// Sets the billing schedule
    pub fn with_schedule(mut self, schedule: BillingSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets the named insured
    pub fn with_named_insured(mut self, contact: ContactId) -> Self {
        self.named_insured = Some(contact);
        self
    }

    /// Sets the agent
    pub fn with_agent(mut self, contact: ContactId) -> Self {
        self.agent = Some(contact);
        self
    }

    /// Builds the policy
    ///
    /// # Panics
    ///
    /// Panics if the policy is rejected by [`PolicyBuilder`]
    pub fn build(self) -> Policy {
        let mut builder = PolicyBuilder::new()
            .id(self.policy_id)
            .name(self.name)
            .effective_date(self.effective_date)
            .annual_premium(self.annual_premium)
            .billing_schedule(self.schedule);

        if let Some(insured) = self.named_insured {
            builder = builder.named_insured(insured);
        }
        if let Some(agent) = self.agent {
            builder = builder.agent(agent);
        }

        builder.build().expect("Test policy should be valid")
    }
}

/// Builds a contact with a generated name
pub fn fake_contact(role: ContactRole) -> Contact {
    Contact::new(Name().fake::<String>(), role)
}
