//! File-backed persistence across store sessions.

use rand::SeedableRng;
use rand::rngs::StdRng;
use siren_core::Store;
use siren_core::ids::SequenceIds;
use siren_core::model::{IncidentDraft, IncidentKind, IncidentPatch, InvolvedParty, Status};
use siren_core::seed::seed_incidents;
use siren_core::storage::{
    FileStorage, INCIDENTS_KEY, LoadPolicy, LoadSource, PersistError, Storage, encode_incidents,
    load_incidents, save_incidents,
};
use std::fs;
use tempfile::TempDir;

fn open(dir: &TempDir, policy: LoadPolicy) -> Result<Store, PersistError> {
    Store::builder(FileStorage::new(dir.path()))
        .load_policy(policy)
        .ids(SequenceIds::starting_at(500))
        .rng(StdRng::seed_from_u64(9))
        .open()
}

#[test]
fn collection_roundtrips_through_file() {
    let dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(dir.path());
    let incidents = seed_incidents();

    save_incidents(&mut storage, INCIDENTS_KEY, &incidents).unwrap();
    let (loaded, source) = load_incidents(&storage, INCIDENTS_KEY, LoadPolicy::Fail).unwrap();

    assert_eq!(source, LoadSource::Stored);
    assert_eq!(loaded, incidents);

    let on_disk = fs::read_to_string(dir.path().join("emergency-incidents.json")).unwrap();
    assert_eq!(on_disk, encode_incidents(&loaded).unwrap());
}

#[test]
fn changes_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir, LoadPolicy::Fail).unwrap();
        store.login("admin", "admin123");
        store.add_incident(
            IncidentDraft::new(IncidentKind::NaturalDisaster, "Cerros orientales")
                .with_description("Deslizamiento")
                .with_party(InvolvedParty {
                    name: "Marta".into(),
                    document_id: "52.111.222".into(),
                    contact: "3101234567".into(),
                }),
        );
        store.update_incident("002", IncidentPatch::status(Status::Resolved));
    }

    let store = open(&dir, LoadPolicy::Fail).unwrap();
    assert_eq!(store.load_source(), LoadSource::Stored);
    assert_eq!(store.state().incidents.len(), 6);
    assert_eq!(store.incident("002").unwrap().status, Status::Resolved);

    let added = store.incident("500").unwrap();
    assert_eq!(added.involved_parties[0].name, "Marta");
    assert_eq!(added.history.len(), 1);
    assert!(added.coordinates.is_some());
}

#[test]
fn opening_does_not_write() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir, LoadPolicy::Seed).unwrap();
    assert_eq!(store.load_source(), LoadSource::Seed);
    assert!(!FileStorage::new(dir.path()).path_for(INCIDENTS_KEY).exists());
}

#[test]
fn corrupt_file_follows_load_policy() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path());
    fs::write(storage.path_for(INCIDENTS_KEY), "[{\"id\":").unwrap();

    let err = open(&dir, LoadPolicy::Fail).unwrap_err();
    assert!(matches!(err, PersistError::Corrupt { .. }));

    let store = open(&dir, LoadPolicy::Seed).unwrap();
    assert_eq!(store.load_source(), LoadSource::RecoveredFromCorrupt);
    assert_eq!(store.state().incidents.len(), 5);
    // Left untouched until the next mutation.
    assert_eq!(
        storage.get(INCIDENTS_KEY).unwrap().as_deref(),
        Some("[{\"id\":")
    );
}

#[test]
fn hand_written_legacy_record_loads() {
    let dir = TempDir::new().unwrap();
    let raw = r#"[{
        "id": "1705312200000",
        "tipo": "Emergencia Médica",
        "ubicacion": "Calle 80",
        "estado": "En progreso",
        "fechaHora": "2024-01-15T10:30:00.000Z",
        "recursos": ["Ambulancia"],
        "operador": "Administrador",
        "historial": [
            {"fecha": "2024-01-15T10:30:00.000Z", "accion": "Incidente registrado", "operador": "Administrador"}
        ],
        "lat": 4.66,
        "lng": -74.05
    }]"#;
    fs::write(dir.path().join("emergency-incidents.json"), raw).unwrap();

    let store = open(&dir, LoadPolicy::Fail).unwrap();
    let incident = store.incident("1705312200000").unwrap();
    assert_eq!(incident.kind, IncidentKind::MedicalEmergency);
    assert_eq!(incident.status, Status::InProgress);
    assert_eq!(incident.timestamp.year(), 2024);
    assert!(incident.involved_parties.is_empty());
    assert_eq!(incident.history.len(), 1);
}

#[test]
fn rewrite_keeps_stored_timestamp_text() {
    let dir = TempDir::new().unwrap();
    let raw = r#"[
        {"id":"a","tipo":"Robo","ubicacion":"Chapinero","estado":"Pendiente",
         "fechaHora":"2024-02-01T08:00:00+00:00","recursos":[],"operador":"Administrador",
         "historial":[{"fecha":"2024-02-01T08:00:00.000Z","accion":"Incidente registrado","operador":"Administrador"}]},
        {"id":"b","tipo":"Otro","ubicacion":"Suba","estado":"Pendiente",
         "fechaHora":"2024-02-01T08:00:00","recursos":[],"operador":"Administrador"}
    ]"#;
    fs::write(dir.path().join("emergency-incidents.json"), raw).unwrap();

    let mut store = open(&dir, LoadPolicy::Fail).unwrap();
    store.login("admin", "admin123");
    store.update_incident("b", IncidentPatch::status(Status::InProgress));

    let rewritten: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("emergency-incidents.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(rewritten[0]["fechaHora"], "2024-02-01T08:00:00+00:00");
    assert_eq!(rewritten[0]["historial"][0]["fecha"], "2024-02-01T08:00:00.000Z");
    assert_eq!(rewritten[1]["fechaHora"], "2024-02-01T08:00:00");
}
