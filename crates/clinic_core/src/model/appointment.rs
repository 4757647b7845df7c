//! Appointment domain model.
//!
//! # Responsibility
//! - Define the record persisted in both the full-list and fast-lookup stores.
//! - Generate `CITA-<epoch_ms>-<suffix>` identifiers.
//!
//! # Invariants
//! - `id` is immutable once assigned.
//! - `created_at` is never replaced by `revise`.
//! - Date/time components serialize as decimal strings but deserialize from
//!   either strings or numbers.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ID_PREFIX: &str = "CITA";
const ID_SUFFIX_LEN: usize = 6;
const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns current Unix epoch time in milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Stable appointment identifier.
///
/// Serialized as a bare string so the persisted shape stays `"id": "CITA-..."`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(String);

impl AppointmentId {
    /// Generates a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        Self::generate_at(now_epoch_ms())
    }

    /// Generates an identifier for the given epoch-millisecond timestamp.
    pub fn generate_at(epoch_ms: i64) -> Self {
        Self(format!("{ID_PREFIX}-{epoch_ms}-{}", random_suffix()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for AppointmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppointmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AppointmentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for AppointmentId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

fn random_suffix() -> String {
    let mut entropy = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(ID_SUFFIX_LEN);
    for _ in 0..ID_SUFFIX_LEN {
        suffix.push(char::from(BASE36_ALPHABET[(entropy % 36) as usize]));
        entropy /= 36;
    }
    suffix
}

/// Scheduled date and time of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDateTime {
    #[serde(with = "decimal_string")]
    pub day: u8,
    #[serde(with = "decimal_string")]
    pub month: u8,
    #[serde(with = "decimal_string")]
    pub year: u16,
    #[serde(with = "decimal_string")]
    pub hour: u8,
    #[serde(with = "decimal_string")]
    pub minute: u8,
}

impl AppointmentDateTime {
    /// Returns the calendar value, or `None` when the components do not form
    /// a real date and 24-hour time.
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
    }

    /// `d/m/yyyy`, unpadded, as shown in the appointment list.
    pub fn date_label(&self) -> String {
        format!("{}/{}/{}", self.day, self.month, self.year)
    }

    /// `HH:MM`, zero-padded.
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Patient details captured with each appointment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated field data ready to become an `Appointment`.
///
/// Produced by `ValidationOutcome::into_draft`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub appointment_date_time: AppointmentDateTime,
    pub patient: Patient,
    pub notes: String,
}

/// Canonical appointment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub appointment_date_time: AppointmentDateTime,
    pub patient: Patient,
    #[serde(default)]
    pub notes: String,
    /// Unix epoch milliseconds, stamped at creation.
    pub created_at: i64,
}

impl Appointment {
    /// Creates a new appointment with a generated ID and current timestamp.
    pub fn new(draft: AppointmentDraft) -> Self {
        Self::with_identity(None, None, draft)
    }

    /// Creates an appointment, generating only the identity parts not supplied.
    ///
    /// # Invariants
    /// - A supplied `id` / `created_at` is kept verbatim.
    /// - No field validation happens here.
    pub fn with_identity(
        id: Option<AppointmentId>,
        created_at: Option<i64>,
        draft: AppointmentDraft,
    ) -> Self {
        Self {
            id: id.unwrap_or_else(AppointmentId::generate),
            appointment_date_time: draft.appointment_date_time,
            patient: draft.patient,
            notes: draft.notes,
            created_at: created_at.unwrap_or_else(now_epoch_ms),
        }
    }

    /// Returns a copy with every editable field replaced by `draft`.
    ///
    /// `id` and `created_at` are carried over from `self`.
    pub fn revise(&self, draft: AppointmentDraft) -> Self {
        Self::with_identity(Some(self.id.clone()), Some(self.created_at), draft)
    }
}

/// Serde adapter writing integers as decimal strings.
mod decimal_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.trim().parse::<T>().map_err(de::Error::custom),
            Repr::Number(number) => number.to_string().parse::<T>().map_err(de::Error::custom),
        }
    }
}
