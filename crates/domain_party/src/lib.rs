//! Party Management Domain
//!
//! Contacts are the people attached to a policy: the agent who wrote it and
//! the named insured who pays for it. The accounting engine only ever refers
//! to a contact by [`ContactId`](core_kernel::ContactId); this crate owns the
//! record itself.
//!
//! # Example
//!
//! ```rust
//! use domain_party::{Contact, ContactRole};
//!
//! let insured = Contact::new("Anna White", ContactRole::NamedInsured);
//! assert!(insured.is_named_insured());
//! assert_eq!(insured.role.to_string(), "Named Insured");
//! ```

pub mod contact;

pub use contact::{Contact, ContactRole};
