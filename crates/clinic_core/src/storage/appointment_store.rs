//! Appointment persistence over two key-value stores.
//!
//! # Responsibility
//! - Keep the full appointment list in one entry of the list store.
//! - Mirror each appointment into the fast-lookup store keyed by id.
//! - Repair the fast-lookup mirror from the list when entries are missing.
//!
//! # Invariants
//! - Ids are unique within the list; writes upsert by id.
//! - Malformed persisted payloads read as empty/absent, never as errors.
//! - `upsert` writes the list first, then the lookup entry. The two writes are
//!   not atomic.
//! - `sync_local_from_cookie` never overwrites an existing lookup entry.

use super::{KeyValueBackend, StorageResult};
use crate::config::DEFAULT_LIST_KEY;
use crate::model::appointment::{Appointment, AppointmentId};
use log::{debug, info, warn};
use serde_json::Value;

/// Appointment store combining a full-list backend `L` and a per-id
/// fast-lookup backend `F`.
pub struct AppointmentStore<L, F> {
    list: L,
    lookup: F,
    list_key: String,
}

impl<L: KeyValueBackend, F: KeyValueBackend> AppointmentStore<L, F> {
    /// Creates a store using the default list entry name.
    pub fn new(list: L, lookup: F) -> Self {
        Self::with_list_key(list, lookup, DEFAULT_LIST_KEY)
    }

    pub fn with_list_key(list: L, lookup: F, list_key: impl Into<String>) -> Self {
        Self {
            list,
            lookup,
            list_key: list_key.into(),
        }
    }

    pub fn list_key(&self) -> &str {
        self.list_key.as_str()
    }

    pub fn list_backend(&self) -> &L {
        &self.list
    }

    pub fn lookup_backend(&self) -> &F {
        &self.lookup
    }

    /// Direct access to the fast-lookup medium, e.g. to clear it.
    pub fn lookup_backend_mut(&mut self) -> &mut F {
        &mut self.lookup
    }

    /// Loads every appointment in stored order.
    ///
    /// Missing or malformed list data yields an empty list.
    pub fn load_all(&self) -> StorageResult<Vec<Appointment>> {
        let Some(raw) = self.list.get_item(&self.list_key)? else {
            return Ok(Vec::new());
        };
        Ok(parse_appointment_list(&raw).unwrap_or_else(|| {
            warn!(
                "event=store_load module=storage status=degraded reason=malformed_list key={}",
                self.list_key
            );
            Vec::new()
        }))
    }

    /// Replaces the whole stored list.
    pub fn save_all(&mut self, records: &[Appointment]) -> StorageResult<()> {
        let serialized = serde_json::to_string(records)?;
        self.list.set_item(&self.list_key, &serialized)?;
        debug!(
            "event=store_save_all module=storage status=ok count={}",
            records.len()
        );
        Ok(())
    }

    /// Inserts or replaces `record` by id in the list, then mirrors it into
    /// the fast-lookup store.
    pub fn upsert(&mut self, record: &Appointment) -> StorageResult<()> {
        let mut records = self.load_all()?;
        let action = match records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                "replace"
            }
            None => {
                records.push(record.clone());
                "append"
            }
        };
        self.save_all(&records)?;

        let serialized = serde_json::to_string(record)?;
        self.lookup.set_item(record.id.as_str(), &serialized)?;

        info!(
            "event=store_upsert module=storage status=ok action={action} id={} count={}",
            record.id,
            records.len()
        );
        Ok(())
    }

    /// Removes `id` from both stores.
    ///
    /// Returns whether anything was removed; a missing id is a no-op.
    pub fn remove_by_id(&mut self, id: &AppointmentId) -> StorageResult<bool> {
        let mut records = self.load_all()?;
        let before = records.len();
        records.retain(|record| record.id != *id);
        let removed_from_list = records.len() != before;
        if removed_from_list {
            self.save_all(&records)?;
        }

        let removed_from_lookup = self.lookup.remove_item(id.as_str())?;

        info!(
            "event=store_remove module=storage status=ok id={id} list_removed={removed_from_list} lookup_removed={removed_from_lookup}"
        );
        Ok(removed_from_list || removed_from_lookup)
    }

    /// Writes a fast-lookup entry for every listed appointment lacking one.
    ///
    /// Returns the number of entries written. Existing entries are left as is,
    /// even when they differ from the list.
    pub fn sync_local_from_cookie(&mut self) -> StorageResult<usize> {
        let records = self.load_all()?;
        let mut repaired = 0;
        for record in &records {
            let present = self
                .lookup
                .get_item(record.id.as_str())?
                .is_some_and(|raw| !raw.is_empty());
            if present {
                continue;
            }
            let serialized = serde_json::to_string(record)?;
            self.lookup.set_item(record.id.as_str(), &serialized)?;
            repaired += 1;
        }

        if repaired > 0 {
            info!(
                "event=store_sync module=storage status=ok repaired={repaired} total={}",
                records.len()
            );
        }
        Ok(repaired)
    }

    /// Looks up one appointment, preferring the fast-lookup store.
    ///
    /// Falls back to scanning the full list when the lookup entry is absent
    /// or corrupt. Returns `Ok(None)` when neither store has it.
    pub fn get_by_id(&self, id: &AppointmentId) -> StorageResult<Option<Appointment>> {
        if let Some(raw) = self.lookup.get_item(id.as_str())? {
            if !raw.is_empty() {
                match parse_appointment(&raw) {
                    Some(record) => return Ok(Some(record)),
                    None => warn!(
                        "event=store_get module=storage status=degraded reason=malformed_entry id={id}"
                    ),
                }
            }
        }

        Ok(self
            .load_all()?
            .into_iter()
            .find(|record| record.id == *id))
    }
}

/// Parses a serialized appointment list.
///
/// Returns `None` unless the payload is a JSON array. Array elements that are
/// not valid appointments are skipped.
pub fn parse_appointment_list(raw: &str) -> Option<Vec<Appointment>> {
    let Value::Array(items) = serde_json::from_str::<Value>(raw).ok()? else {
        return None;
    };

    let total = items.len();
    let records: Vec<Appointment> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if records.len() != total {
        warn!(
            "event=store_parse module=storage status=degraded skipped={} total={total}",
            total - records.len()
        );
    }
    Some(records)
}

/// Parses one serialized appointment, `None` when malformed.
pub fn parse_appointment(raw: &str) -> Option<Appointment> {
    serde_json::from_str(raw).ok()
}
