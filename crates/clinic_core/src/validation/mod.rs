//! Form validation for appointment input.
//!
//! # Responsibility
//! - Check field formats and cross-field calendar validity.
//! - Keep validation independent from any UI framework.
//!
//! # Invariants
//! - Validation is pure: no storage access, no clock reads.

pub mod form;
pub mod rules;
