//! Policy record
//!
//! The policy is created outside the accounting engine and mutated by it in
//! exactly two ways: cancellation and a change of billing schedule.
//!
//! # Invariants
//!
//! - The annual premium is never negative
//! - A canceled policy always carries a reason and a status-change date
//! - Named insured and agent references are never touched by accounting

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{ContactId, PolicyId, PolicyTerm, TemporalError};

use crate::error::PolicyError;
use crate::schedule::BillingSchedule;

/// Policy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyStatus {
    /// Policy is in force and billing
    Active,
    /// Policy has been canceled
    Canceled,
}

impl PolicyStatus {
    /// Returns the stored form of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Active => "Active",
            PolicyStatus::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PolicyStatus {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(PolicyStatus::Active),
            "Canceled" => Ok(PolicyStatus::Canceled),
            other => Err(PolicyError::validation(format!("Unknown policy status: {}", other))),
        }
    }
}

/// An insurance policy as seen by accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Unique identifier
    pub id: PolicyId,
    /// Policy name
    pub name: String,
    /// First day of coverage
    pub effective_date: NaiveDate,
    /// Annual premium in whole currency units
    pub annual_premium: i64,
    /// How the premium is billed
    pub billing_schedule: BillingSchedule,
    /// Contact billed for the policy
    pub named_insured: Option<ContactId>,
    /// Agent of record
    pub agent: Option<ContactId>,
    /// Current status
    pub status: PolicyStatus,
    /// Why the policy was canceled
    pub cancellation_reason: Option<String>,
    /// Date of the last status change
    pub status_changed_on: Option<NaiveDate>,
}

impl Policy {
    /// Returns the coverage term of the policy
    pub fn term(&self) -> Result<PolicyTerm, TemporalError> {
        PolicyTerm::annual(self.effective_date)
    }

    /// Returns true if the policy has been canceled
    pub fn is_canceled(&self) -> bool {
        self.status == PolicyStatus::Canceled
    }

    /// Cancels the policy
    ///
    /// Applying the same cancellation twice leaves the policy unchanged.
    ///
    /// # Arguments
    ///
    /// * `reason` - Free-text cancellation reason
    /// * `on` - Date recorded as the status change
    pub fn cancel(&mut self, reason: impl Into<String>, on: NaiveDate) {
        let reason = reason.into();
        info!(policy_id = %self.id, reason = %reason, "Canceling policy");

        self.status = PolicyStatus::Canceled;
        self.cancellation_reason = Some(reason);
        self.status_changed_on = Some(on);
    }

    /// Switches the policy to a new billing schedule
    pub fn change_schedule(&mut self, schedule: BillingSchedule) {
        info!(
            policy_id = %self.id,
            from = %self.billing_schedule,
            to = %schedule,
            "Changing billing schedule"
        );
        self.billing_schedule = schedule;
    }
}

/// Builder for policies
pub struct PolicyBuilder {
    id: Option<PolicyId>,
    name: Option<String>,
    effective_date: Option<NaiveDate>,
    annual_premium: Option<i64>,
    billing_schedule: BillingSchedule,
    named_insured: Option<ContactId>,
    agent: Option<ContactId>,
}

impl PolicyBuilder {
    /// Creates a new policy builder with default values
    ///
    /// Policies bill annually unless told otherwise.
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            effective_date: None,
            annual_premium: None,
            billing_schedule: BillingSchedule::Annual,
            named_insured: None,
            agent: None,
        }
    }

    /// Uses a known identifier instead of generating one
    pub fn id(mut self, id: PolicyId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the policy name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the effective date
    pub fn effective_date(mut self, date: NaiveDate) -> Self {
        self.effective_date = Some(date);
        self
    }

    /// Sets the annual premium
    pub fn annual_premium(mut self, premium: i64) -> Self {
        self.annual_premium = Some(premium);
        self
    }

    /// Sets the billing schedule
    pub fn billing_schedule(mut self, schedule: BillingSchedule) -> Self {
        self.billing_schedule = schedule;
        self
    }

    /// Sets the named insured
    pub fn named_insured(mut self, contact: ContactId) -> Self {
        self.named_insured = Some(contact);
        self
    }

    /// Sets the agent
    pub fn agent(mut self, contact: ContactId) -> Self {
        self.agent = Some(contact);
        self
    }

    /// Builds the policy
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or the premium is negative
    pub fn build(self) -> Result<Policy, PolicyError> {
        let name = self.name
            .ok_or(PolicyError::MissingRequiredField("name".to_string()))?;
        let effective_date = self.effective_date
            .ok_or(PolicyError::MissingRequiredField("effective_date".to_string()))?;
        let annual_premium = self.annual_premium
            .ok_or(PolicyError::MissingRequiredField("annual_premium".to_string()))?;

        if annual_premium < 0 {
            return Err(PolicyError::validation(format!(
                "Annual premium cannot be negative: {}",
                annual_premium
            )));
        }

        // Rejects effective dates whose term cannot be represented
        PolicyTerm::annual(effective_date)?;

        Ok(Policy {
            id: self.id.unwrap_or_else(PolicyId::new_v7),
            name,
            effective_date,
            annual_premium,
            billing_schedule: self.billing_schedule,
            named_insured: self.named_insured,
            agent: self.agent,
            status: PolicyStatus::Active,
            cancellation_reason: None,
            status_changed_on: None,
        })
    }
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
