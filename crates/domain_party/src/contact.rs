//! Policy contacts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ContactId, CoreError};

/// Role a contact plays on a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactRole {
    /// Agent who wrote the policy
    Agent,
    /// Person insured by, and billed for, the policy
    #[serde(rename = "Named Insured")]
    NamedInsured,
}

impl ContactRole {
    /// Returns the stored/display form of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactRole::Agent => "Agent",
            ContactRole::NamedInsured => "Named Insured",
        }
    }
}

impl fmt::Display for ContactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Agent" => Ok(ContactRole::Agent),
            "Named Insured" => Ok(ContactRole::NamedInsured),
            other => Err(CoreError::unknown("contact role", other)),
        }
    }
}

/// A person referenced by policies and payments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier
    pub id: ContactId,
    /// Full name
    pub name: String,
    /// Role on the policy
    pub role: ContactRole,
}

impl Contact {
    /// Creates a new contact with a fresh identifier
    pub fn new(name: impl Into<String>, role: ContactRole) -> Self {
        Self {
            id: ContactId::new_v7(),
            name: name.into(),
            role,
        }
    }

    /// Returns true if this contact is a named insured
    pub fn is_named_insured(&self) -> bool {
        self.role == ContactRole::NamedInsured
    }
}
