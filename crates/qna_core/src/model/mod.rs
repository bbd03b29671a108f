//! Domain model for questions, answers and their audit trail.
//!
//! # Responsibility
//! - Define the records the workflow and stores exchange.
//! - Own ownership/state checks so mutations cannot bypass them.
//!
//! # Invariants
//! - Questions and answers are never hard-deleted; `deleted` is the tombstone.
//! - Mutating entity methods take the acting user explicitly.

pub mod access;
pub mod answer;
pub mod delete_history;
pub mod question;
pub mod user;
pub mod validation;
