//! Appointment use-case service.
//!
//! # Responsibility
//! - Provide list/edit/submit/delete entry points for UI hosts.
//! - Run validation before any entity construction or storage write.
//!
//! # Invariants
//! - Rejected submissions write nothing.
//! - Edits keep the stored `id` and `created_at`.
//! - Reads repair the fast-lookup mirror before serving data.

use crate::model::appointment::{Appointment, AppointmentId};
use crate::storage::appointment_store::AppointmentStore;
use crate::storage::{KeyValueBackend, StorageError, StorageResult};
use crate::validation::form::{validate_form, AppointmentForm, ValidationOutcome};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for appointment use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Target appointment does not exist in either store.
    NotFound(AppointmentId),
    Storage(StorageError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "appointment not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Appointment),
    Updated(Appointment),
    /// Validation failed; carries field errors and the normalized input.
    Rejected(ValidationOutcome),
}

impl SubmitOutcome {
    pub fn appointment(&self) -> Option<&Appointment> {
        match self {
            Self::Created(appointment) | Self::Updated(appointment) => Some(appointment),
            Self::Rejected(_) => None,
        }
    }
}

pub struct AppointmentService<L, F> {
    store: AppointmentStore<L, F>,
}

impl<L: KeyValueBackend, F: KeyValueBackend> AppointmentService<L, F> {
    pub fn new(store: AppointmentStore<L, F>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &AppointmentStore<L, F> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AppointmentStore<L, F> {
        &mut self.store
    }

    pub fn into_store(self) -> AppointmentStore<L, F> {
        self.store
    }

    /// Lists all appointments after repairing the fast-lookup mirror.
    pub fn list(&mut self) -> StorageResult<Vec<Appointment>> {
        self.store.sync_local_from_cookie()?;
        self.store.load_all()
    }

    /// Loads one appointment for the edit form.
    pub fn load_for_edit(&mut self, id: &AppointmentId) -> StorageResult<Option<Appointment>> {
        self.store.sync_local_from_cookie()?;
        self.store.get_by_id(id)
    }

    /// Validates `form` and stores the resulting appointment.
    ///
    /// # Contract
    /// - `editing = None` creates a record with a new id and timestamp.
    /// - `editing = Some(existing)` replaces every editable field of
    ///   `existing`, keeping its id and `created_at`.
    pub fn submit(
        &mut self,
        form: &AppointmentForm,
        editing: Option<&Appointment>,
    ) -> StorageResult<SubmitOutcome> {
        let draft = match validate_form(form).into_draft() {
            Ok(draft) => draft,
            Err(outcome) => {
                info!(
                    "event=appointment_submit module=service status=rejected error_count={}",
                    outcome.errors.len()
                );
                return Ok(SubmitOutcome::Rejected(outcome));
            }
        };

        let outcome = match editing {
            Some(existing) => SubmitOutcome::Updated(existing.revise(draft)),
            None => SubmitOutcome::Created(Appointment::new(draft)),
        };
        if let Some(appointment) = outcome.appointment() {
            self.store.upsert(appointment)?;
        }
        Ok(outcome)
    }

    /// Loads `id` and submits `form` as its new content.
    pub fn edit(
        &mut self,
        id: &AppointmentId,
        form: &AppointmentForm,
    ) -> Result<SubmitOutcome, ServiceError> {
        let existing = self
            .load_for_edit(id)?
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;
        Ok(self.submit(form, Some(&existing))?)
    }

    /// Deletes `id` from both stores. Returns whether anything was removed.
    pub fn delete(&mut self, id: &AppointmentId) -> StorageResult<bool> {
        self.store.remove_by_id(id)
    }
}
