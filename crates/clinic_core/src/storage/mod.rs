//! Durable key-value backends and the appointment store built on them.
//!
//! # Responsibility
//! - Define one string key-value contract shared by the full-list store and
//!   the per-id fast-lookup store.
//! - Keep medium details (memory, files, SQLite, cookie encoding) out of
//!   `AppointmentStore`.
//!
//! # Invariants
//! - Backends store values verbatim; parsing belongs to `AppointmentStore`.
//! - Transport failures surface as `StorageError`; malformed payloads do not.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod appointment_store;
pub mod cookie;
pub mod file;
pub mod memory;
pub mod sqlite;

pub type StorageResult<T> = Result<T, StorageError>;

/// Transport-level storage failure.
#[derive(Debug)]
pub enum StorageError {
    Io {
        context: String,
        source: std::io::Error,
    },
    Db(DbError),
    Serialize(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize appointment data: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// String key-value storage medium.
///
/// Mirrors the browser storage surface: whole values are read and written
/// per key, with no partial updates.
pub trait KeyValueBackend {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;
    /// Returns whether an entry was removed. Missing keys are not an error.
    fn remove_item(&mut self, key: &str) -> StorageResult<bool>;
    /// All keys currently stored, in ascending order.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for Box<B> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<bool> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }
}
