//! Request and response bodies

pub mod accounting;
