//! Appointment form validation.
//!
//! # Responsibility
//! - Check raw form input and collect every applicable field error.
//! - Partition trimmed input into date/time, patient and notes data.
//!
//! # Invariants
//! - Rules run in a fixed order: required, per-field format, cross-field date,
//!   birth date.
//! - A field flagged by an earlier rule is skipped by later rules.
//! - Validation never fails with `Err`; errors are returned as data.

use super::rules::{is_national_id, is_phone, is_real_date, parse_birth_date, parse_in_range};
use crate::model::appointment::{Appointment, AppointmentDateTime, AppointmentDraft, Patient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw form input, one string per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentForm {
    pub day: String,
    pub month: String,
    pub year: String,
    pub hour: String,
    pub minute: String,
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: String,
    pub notes: String,
}

impl AppointmentForm {
    /// Prefills a form from a stored appointment for editing.
    pub fn from_appointment(appointment: &Appointment) -> Self {
        let when = &appointment.appointment_date_time;
        let patient = &appointment.patient;
        Self {
            day: when.day.to_string(),
            month: when.month.to_string(),
            year: when.year.to_string(),
            hour: when.hour.to_string(),
            minute: when.minute.to_string(),
            national_id: patient.national_id.clone(),
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            phone: patient.phone.clone(),
            birth_date: patient.birth_date.clone(),
            notes: appointment.notes.clone(),
        }
    }

    fn value(&self, field: FieldName) -> &str {
        let raw = match field {
            FieldName::Day => &self.day,
            FieldName::Month => &self.month,
            FieldName::Year => &self.year,
            FieldName::Hour => &self.hour,
            FieldName::Minute => &self.minute,
            FieldName::NationalId => &self.national_id,
            FieldName::FirstName => &self.first_name,
            FieldName::LastName => &self.last_name,
            FieldName::Phone => &self.phone,
            FieldName::BirthDate => &self.birth_date,
        };
        raw.trim()
    }
}

/// Validated form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Day,
    Month,
    Year,
    Hour,
    Minute,
    NationalId,
    FirstName,
    LastName,
    Phone,
    BirthDate,
}

impl FieldName {
    /// Fields that must be non-empty after trimming.
    pub const REQUIRED: [FieldName; 10] = [
        FieldName::Day,
        FieldName::Month,
        FieldName::Year,
        FieldName::Hour,
        FieldName::Minute,
        FieldName::NationalId,
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::Phone,
        FieldName::BirthDate,
    ];

    /// Wire name, matching the persisted camelCase keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::NationalId => "nationalId",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Phone => "phone",
            Self::BirthDate => "birthDate",
        }
    }
}

/// Per-field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    OutOfRange { min: u32, max: u32 },
    InvalidNationalId,
    InvalidPhone,
    /// Day/month/year do not form a real calendar date.
    InvalidDate,
    InvalidBirthDate,
}

impl FieldError {
    /// User-facing message for this error on `field`.
    pub fn message(self, field: FieldName) -> String {
        match self {
            Self::Required => "This field is required.".to_string(),
            Self::OutOfRange { min, max } => {
                format!("Invalid {} ({min}-{max}).", field.as_str())
            }
            Self::InvalidNationalId => "Invalid national ID (7-8 digits + letter).".to_string(),
            Self::InvalidPhone => "Invalid phone number (min. 9 characters).".to_string(),
            Self::InvalidDate => "Invalid appointment date.".to_string(),
            Self::InvalidBirthDate => "Invalid birth date.".to_string(),
        }
    }
}

/// Trimmed date/time strings as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDateTime {
    pub day: String,
    pub month: String,
    pub year: String,
    pub hour: String,
    pub minute: String,
}

impl RawDateTime {
    fn to_typed(&self) -> Option<AppointmentDateTime> {
        Some(AppointmentDateTime {
            day: self.day.parse().ok()?,
            month: self.month.parse().ok()?,
            year: self.year.parse().ok()?,
            hour: self.hour.parse().ok()?,
            minute: self.minute.parse().ok()?,
        })
    }
}

/// Normalized form data, partitioned the way it is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub appointment_date_time: RawDateTime,
    pub patient: Patient,
    pub notes: String,
}

/// Result of `validate_form`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub errors: BTreeMap<FieldName, FieldError>,
    pub data: FormData,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: FieldName) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    /// Field wire name -> user-facing message.
    pub fn error_messages(&self) -> BTreeMap<&'static str, String> {
        self.errors
            .iter()
            .map(|(field, error)| (field.as_str(), error.message(*field)))
            .collect()
    }

    /// Converts a valid outcome into typed draft data.
    ///
    /// Returns `self` unchanged as the error when the outcome is invalid.
    pub fn into_draft(self) -> Result<AppointmentDraft, Self> {
        if !self.is_valid() {
            return Err(self);
        }
        match self.data.appointment_date_time.to_typed() {
            Some(appointment_date_time) => Ok(AppointmentDraft {
                appointment_date_time,
                patient: self.data.patient,
                notes: self.data.notes,
            }),
            None => Err(self),
        }
    }
}

/// Validates raw appointment form input.
pub fn validate_form(form: &AppointmentForm) -> ValidationOutcome {
    let mut errors = BTreeMap::new();

    for field in FieldName::REQUIRED {
        if form.value(field).is_empty() {
            errors.insert(field, FieldError::Required);
        }
    }

    let ranges = [
        (FieldName::Day, 1, 31),
        (FieldName::Month, 1, 12),
        (FieldName::Year, 1900, 2100),
        (FieldName::Hour, 0, 23),
        (FieldName::Minute, 0, 59),
    ];
    let mut parsed = BTreeMap::new();
    for (field, min, max) in ranges {
        if errors.contains_key(&field) {
            continue;
        }
        match parse_in_range(form.value(field), min, max) {
            Some(value) => {
                parsed.insert(field, value);
            }
            None => {
                errors.insert(field, FieldError::OutOfRange { min, max });
            }
        }
    }

    if !errors.contains_key(&FieldName::NationalId)
        && !is_national_id(form.value(FieldName::NationalId))
    {
        errors.insert(FieldName::NationalId, FieldError::InvalidNationalId);
    }
    if !errors.contains_key(&FieldName::Phone) && !is_phone(form.value(FieldName::Phone)) {
        errors.insert(FieldName::Phone, FieldError::InvalidPhone);
    }

    if let (Some(&day), Some(&month), Some(&year)) = (
        parsed.get(&FieldName::Day),
        parsed.get(&FieldName::Month),
        parsed.get(&FieldName::Year),
    ) {
        if !is_real_date(day, month, year) {
            for field in [FieldName::Day, FieldName::Month, FieldName::Year] {
                errors.insert(field, FieldError::InvalidDate);
            }
        }
    }

    if !errors.contains_key(&FieldName::BirthDate)
        && parse_birth_date(form.value(FieldName::BirthDate)).is_none()
    {
        errors.insert(FieldName::BirthDate, FieldError::InvalidBirthDate);
    }

    ValidationOutcome {
        errors,
        data: FormData {
            appointment_date_time: RawDateTime {
                day: form.value(FieldName::Day).to_string(),
                month: form.value(FieldName::Month).to_string(),
                year: form.value(FieldName::Year).to_string(),
                hour: form.value(FieldName::Hour).to_string(),
                minute: form.value(FieldName::Minute).to_string(),
            },
            patient: Patient {
                national_id: form.value(FieldName::NationalId).to_string(),
                first_name: form.value(FieldName::FirstName).to_string(),
                last_name: form.value(FieldName::LastName).to_string(),
                phone: form.value(FieldName::Phone).to_string(),
                birth_date: form.value(FieldName::BirthDate).to_string(),
            },
            notes: form.notes.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_form, AppointmentForm, FieldError, FieldName};

    fn valid_form() -> AppointmentForm {
        AppointmentForm {
            day: "15".to_string(),
            month: "6".to_string(),
            year: "2024".to_string(),
            hour: "10".to_string(),
            minute: "00".to_string(),
            national_id: "12345678A".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            phone: "600123456".to_string(),
            birth_date: "1990-01-01".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn valid_form_has_no_errors() {
        let outcome = validate_form(&valid_form());
        assert!(outcome.is_valid());
        assert!(outcome.error_messages().is_empty());
    }

    #[test]
    fn missing_fields_are_required_and_skip_format_checks() {
        let mut form = valid_form();
        form.day = "   ".to_string();
        form.phone = String::new();

        let outcome = validate_form(&form);
        assert_eq!(outcome.error(FieldName::Day), Some(FieldError::Required));
        assert_eq!(outcome.error(FieldName::Phone), Some(FieldError::Required));
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn range_errors_are_field_specific() {
        let mut form = valid_form();
        form.hour = "24".to_string();
        form.minute = "x".to_string();

        let messages = validate_form(&form).error_messages();
        assert_eq!(messages["hour"], "Invalid hour (0-23).");
        assert_eq!(messages["minute"], "Invalid minute (0-59).");
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn out_of_range_day_skips_calendar_check() {
        let mut form = valid_form();
        form.day = "32".to_string();
        form.month = "4".to_string();

        let outcome = validate_form(&form);
        assert_eq!(
            outcome.error(FieldName::Day),
            Some(FieldError::OutOfRange { min: 1, max: 31 })
        );
        assert_eq!(outcome.error(FieldName::Month), None);
        assert_eq!(outcome.error(FieldName::Year), None);
    }

    #[test]
    fn unparseable_birth_date_is_flagged() {
        let mut form = valid_form();
        form.birth_date = "yesterday".to_string();

        let outcome = validate_form(&form);
        assert_eq!(
            outcome.error(FieldName::BirthDate),
            Some(FieldError::InvalidBirthDate)
        );
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn data_is_trimmed_and_partitioned() {
        let mut form = valid_form();
        form.first_name = "  Ana ".to_string();
        form.notes = " revisión anual ".to_string();

        let outcome = validate_form(&form);
        assert_eq!(outcome.data.patient.first_name, "Ana");
        assert_eq!(outcome.data.notes, "revisión anual");
        assert_eq!(outcome.data.appointment_date_time.minute, "00");
    }

    #[test]
    fn into_draft_returns_typed_components() {
        let draft = validate_form(&valid_form())
            .into_draft()
            .expect("valid form should convert");
        assert_eq!(draft.appointment_date_time.day, 15);
        assert_eq!(draft.appointment_date_time.minute, 0);
        assert_eq!(draft.patient.national_id, "12345678A");
    }

    #[test]
    fn into_draft_rejects_invalid_outcome() {
        let mut form = valid_form();
        form.national_id = "123".to_string();

        let outcome = validate_form(&form)
            .into_draft()
            .expect_err("invalid form must not convert");
        assert_eq!(
            outcome.error(FieldName::NationalId),
            Some(FieldError::InvalidNationalId)
        );
    }
}
