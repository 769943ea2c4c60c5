//! Request handlers

pub mod accounting;
pub mod health;
