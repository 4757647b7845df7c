//! Appointment domain model.
//!
//! # Responsibility
//! - Define canonical appointment records shared by validation and storage.
//! - Own identifier generation and creation timestamps.
//!
//! # Invariants
//! - Every appointment is identified by a stable `AppointmentId`.
//! - `created_at` is stamped once and carried through every revision.
//! - Constructors never validate; the write path validates before building.

pub mod appointment;
