use clinic_core::db::open_db_in_memory;
use clinic_core::storage::sqlite::{COOKIE_NAMESPACE, LOCAL_NAMESPACE};
use clinic_core::{
    memory_store, Appointment, AppointmentDateTime, AppointmentDraft, AppointmentId,
    AppointmentStore, CookieBackend, CookieConfig, FileBackend, KeyValueBackend, MemoryBackend,
    Patient, SqliteBackend, DEFAULT_LIST_KEY,
};

fn draft(first_name: &str, day: u8) -> AppointmentDraft {
    AppointmentDraft {
        appointment_date_time: AppointmentDateTime {
            day,
            month: 6,
            year: 2024,
            hour: 10,
            minute: 30,
        },
        patient: Patient {
            national_id: "12345678A".to_string(),
            first_name: first_name.to_string(),
            last_name: "Ruiz".to_string(),
            phone: "600123456".to_string(),
            birth_date: "1990-01-01".to_string(),
        },
        notes: String::new(),
    }
}

#[test]
fn upsert_then_get_by_id_returns_equal_record() {
    let mut store = memory_store();
    let appointment = Appointment::new(draft("Ana", 15));

    store.upsert(&appointment).unwrap();

    assert_eq!(store.get_by_id(&appointment.id).unwrap(), Some(appointment));
}

#[test]
fn remove_then_get_by_id_returns_none() {
    let mut store = memory_store();
    let appointment = Appointment::new(draft("Ana", 15));
    store.upsert(&appointment).unwrap();

    assert!(store.remove_by_id(&appointment.id).unwrap());

    assert_eq!(store.get_by_id(&appointment.id).unwrap(), None);
    assert!(store.load_all().unwrap().is_empty());
    assert_eq!(
        store.lookup_backend().get_item(appointment.id.as_str()).unwrap(),
        None
    );
}

#[test]
fn removing_unknown_id_is_a_noop() {
    let mut store = memory_store();
    let appointment = Appointment::new(draft("Ana", 15));
    store.upsert(&appointment).unwrap();

    let removed = store
        .remove_by_id(&AppointmentId::from("CITA-0-missing"))
        .unwrap();

    assert!(!removed);
    assert_eq!(store.load_all().unwrap(), vec![appointment]);
}

#[test]
fn repeated_upsert_keeps_single_entry_with_latest_fields_and_original_created_at() {
    let mut store = memory_store();
    let original = Appointment::with_identity(None, Some(1_000), draft("Ana", 15));
    store.upsert(&original).unwrap();

    let revised = original.revise(draft("Anabel", 20));
    store.upsert(&revised).unwrap();

    let all = store.load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].patient.first_name, "Anabel");
    assert_eq!(all[0].appointment_date_time.day, 20);
    assert_eq!(all[0].created_at, 1_000);
    assert_eq!(all[0].id, original.id);
}

#[test]
fn load_all_preserves_insertion_order() {
    let mut store = memory_store();
    let first = Appointment::new(draft("Ana", 1));
    let second = Appointment::new(draft("Luis", 2));
    let third = Appointment::new(draft("Marta", 3));
    for appointment in [&first, &second, &third] {
        store.upsert(appointment).unwrap();
    }
    store.upsert(&second.revise(draft("Luis", 9))).unwrap();

    let ids: Vec<AppointmentId> = store
        .load_all()
        .unwrap()
        .into_iter()
        .map(|appointment| appointment.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[test]
fn malformed_list_reads_as_empty() {
    for payload in ["not json", "{\"id\": 1}", "42", ""] {
        let mut list = MemoryBackend::new();
        list.set_item(DEFAULT_LIST_KEY, payload).unwrap();
        let store = AppointmentStore::new(list, MemoryBackend::new());

        assert!(store.load_all().unwrap().is_empty(), "payload {payload:?}");
    }
}

#[test]
fn corrupt_lookup_entry_falls_back_to_list() {
    let mut store = memory_store();
    let appointment = Appointment::new(draft("Ana", 15));
    store.upsert(&appointment).unwrap();

    store
        .lookup_backend_mut()
        .set_item(appointment.id.as_str(), "{broken")
        .unwrap();

    assert_eq!(store.get_by_id(&appointment.id).unwrap(), Some(appointment));
}

#[test]
fn get_by_id_prefers_lookup_entry_over_list() {
    let mut store = memory_store();
    let appointment = Appointment::new(draft("Ana", 15));
    store.upsert(&appointment).unwrap();

    let mut divergent = appointment.clone();
    divergent.notes = "lookup copy".to_string();
    store
        .lookup_backend_mut()
        .set_item(
            appointment.id.as_str(),
            &serde_json::to_string(&divergent).unwrap(),
        )
        .unwrap();

    let loaded = store.get_by_id(&appointment.id).unwrap().unwrap();
    assert_eq!(loaded.notes, "lookup copy");
}

#[test]
fn sync_repairs_missing_lookup_entries_without_overwriting() {
    let mut store = memory_store();
    let kept = Appointment::new(draft("Ana", 1));
    let lost = Appointment::new(draft("Luis", 2));
    store.upsert(&kept).unwrap();
    store.upsert(&lost).unwrap();

    store
        .lookup_backend_mut()
        .set_item(kept.id.as_str(), "sentinel")
        .unwrap();
    store.lookup_backend_mut().remove_item(lost.id.as_str()).unwrap();

    assert_eq!(store.sync_local_from_cookie().unwrap(), 1);
    assert_eq!(
        store
            .lookup_backend()
            .get_item(kept.id.as_str())
            .unwrap()
            .as_deref(),
        Some("sentinel")
    );
    let repaired = store
        .lookup_backend()
        .get_item(lost.id.as_str())
        .unwrap()
        .unwrap();
    assert_eq!(
        serde_json::from_str::<Appointment>(&repaired).unwrap(),
        lost
    );

    assert_eq!(store.sync_local_from_cookie().unwrap(), 0);
}

#[test]
fn sync_treats_empty_lookup_value_as_missing() {
    let mut store = memory_store();
    let appointment = Appointment::new(draft("Ana", 1));
    store.upsert(&appointment).unwrap();
    store
        .lookup_backend_mut()
        .set_item(appointment.id.as_str(), "")
        .unwrap();

    assert_eq!(store.sync_local_from_cookie().unwrap(), 1);
}

#[test]
fn sqlite_backends_share_one_database() {
    let conn = open_db_in_memory().unwrap();
    let mut store = AppointmentStore::new(
        CookieBackend::new(
            SqliteBackend::new(&conn, COOKIE_NAMESPACE),
            CookieConfig::default(),
        ),
        SqliteBackend::new(&conn, LOCAL_NAMESPACE),
    );
    let appointment = Appointment::new(draft("Ana", 15));

    store.upsert(&appointment).unwrap();

    let reopened = AppointmentStore::new(
        CookieBackend::new(
            SqliteBackend::new(&conn, COOKIE_NAMESPACE),
            CookieConfig::default(),
        ),
        SqliteBackend::new(&conn, LOCAL_NAMESPACE),
    );
    assert_eq!(reopened.load_all().unwrap(), vec![appointment.clone()]);
    assert_eq!(reopened.get_by_id(&appointment.id).unwrap(), Some(appointment));
}

#[test]
fn file_backends_survive_store_recreation() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        AppointmentStore::new(
            CookieBackend::new(
                FileBackend::new(dir.path().join("cookie")),
                CookieConfig::default(),
            ),
            FileBackend::new(dir.path().join("local")),
        )
    };
    let appointment = Appointment::new(draft("Ana", 15));

    let mut store = open();
    store.upsert(&appointment).unwrap();
    drop(store);

    std::fs::remove_dir_all(dir.path().join("local")).unwrap();
    let mut store = open();
    assert_eq!(store.sync_local_from_cookie().unwrap(), 1);
    assert_eq!(store.get_by_id(&appointment.id).unwrap(), Some(appointment));
}

#[test]
fn file_lookup_store_handles_ids_with_path_separators() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = AppointmentStore::new(
        CookieBackend::new(
            FileBackend::new(dir.path().join("cookie")),
            CookieConfig::default(),
        ),
        FileBackend::new(dir.path().join("local")),
    );
    let slashed = Appointment::with_identity(
        Some(AppointmentId::from("CITA-1/x")),
        Some(1),
        draft("Ana", 15),
    );
    let blank = Appointment::with_identity(Some(AppointmentId::from("")), Some(2), draft("Luis", 16));
    store.save_all(&[slashed.clone(), blank.clone()]).unwrap();

    assert_eq!(store.sync_local_from_cookie().unwrap(), 2);
    assert_eq!(store.get_by_id(&slashed.id).unwrap(), Some(slashed.clone()));
    assert_eq!(store.get_by_id(&blank.id).unwrap(), Some(blank));

    let missing = AppointmentId::from("a/b");
    assert_eq!(store.get_by_id(&missing).unwrap(), None);
    assert!(!store.remove_by_id(&missing).unwrap());
    assert_eq!(store.load_all().unwrap().len(), 2);

    assert!(store.remove_by_id(&slashed.id).unwrap());
    assert_eq!(store.get_by_id(&slashed.id).unwrap(), None);
    assert!(!dir.path().join("local").join("CITA-1").exists());
}

#[test]
fn custom_list_key_is_used_for_the_full_list() {
    let mut store = AppointmentStore::with_list_key(
        MemoryBackend::new(),
        MemoryBackend::new(),
        "clinic_test_list",
    );
    store.upsert(&Appointment::new(draft("Ana", 15))).unwrap();

    assert_eq!(store.list_backend().keys().unwrap(), vec!["clinic_test_list"]);
}
