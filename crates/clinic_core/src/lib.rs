//! Core domain logic for the dental clinic appointment book.
//! This crate is the single source of truth for validation and persistence
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod validation;

pub use config::{load_config, ConfigError, CookieConfig, StoreConfig, DEFAULT_LIST_KEY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::appointment::{
    Appointment, AppointmentDateTime, AppointmentDraft, AppointmentId, Patient,
};
pub use service::appointment_service::{AppointmentService, ServiceError, SubmitOutcome};
pub use storage::appointment_store::AppointmentStore;
pub use storage::cookie::CookieBackend;
pub use storage::file::FileBackend;
pub use storage::memory::MemoryBackend;
pub use storage::sqlite::SqliteBackend;
pub use storage::{KeyValueBackend, StorageError, StorageResult};
pub use validation::form::{
    validate_form, AppointmentForm, FieldError, FieldName, ValidationOutcome,
};

/// Store over in-process backends, as used by tests and ephemeral sessions.
pub type MemoryAppointmentStore = AppointmentStore<CookieBackend<MemoryBackend>, MemoryBackend>;

/// Creates an empty in-memory appointment store with default configuration.
pub fn memory_store() -> MemoryAppointmentStore {
    AppointmentStore::new(
        CookieBackend::new(MemoryBackend::new(), CookieConfig::default()),
        MemoryBackend::new(),
    )
}

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, memory_store, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn memory_store_starts_empty() {
        assert!(memory_store().load_all().unwrap().is_empty());
    }
}
