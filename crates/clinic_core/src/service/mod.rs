//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, entity construction and storage into use-case
//!   level APIs.
//! - Keep UI hosts decoupled from storage details.

pub mod appointment_service;
