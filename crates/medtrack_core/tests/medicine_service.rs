use medtrack_core::db::{open_db, open_db_in_memory};
use medtrack_core::{
    InMemoryMedicineRepository, IntakeFrequency, MedicineDraft, MedicineRepository,
    MedicineService, MedicineType, MedicineUpdate, RepoError, SqliteMedicineRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn draft(name: &str, dosage_per_take: i32, user_id: &str) -> MedicineDraft {
    MedicineDraft::new(
        name,
        dosage_per_take,
        MedicineType::Tablet,
        IntakeFrequency::OnceDaily,
        user_id,
    )
}

fn aspirin_lifecycle<R: MedicineRepository>(service: &MedicineService<R>) {
    let id = service.create_medicine(draft("Aspirin", 2, "U1")).unwrap();

    let fetched = service.get_medicine_by_id(id).unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.name, "Aspirin");
    assert_eq!(fetched.dosage_per_take, 2);
    assert_eq!(fetched.user_id, "U1");

    assert_eq!(service.delete_medicine(id).unwrap(), id);
    let err = service.get_medicine_by_id(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

fn user_filter_is_subset_of_all<R: MedicineRepository>(service: &MedicineService<R>) {
    for (name, user) in [("a", "U1"), ("b", "U2"), ("c", "U1"), ("d", "U3")] {
        service.create_medicine(draft(name, 1, user)).unwrap();
    }

    let all = service.get_all_medicines().unwrap();
    assert_eq!(all.len(), 4);
    for user in ["U1", "U2", "U3", "unknown"] {
        let expected: Vec<_> = all
            .iter()
            .filter(|medicine| medicine.user_id == user)
            .cloned()
            .collect();
        assert_eq!(service.get_medicines_by_user_id(user).unwrap(), expected);
    }
}

fn invalid_create_leaves_store_unchanged<R: MedicineRepository>(service: &MedicineService<R>) {
    service.create_medicine(draft("Aspirin", 1, "U1")).unwrap();

    for dosage in [0, -1] {
        let err = service
            .create_medicine(draft("Broken", dosage, "U1"))
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
    let err = service.create_medicine(draft("", 1, "U1")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert_eq!(service.count_medicines().unwrap(), 1);
}

fn missing_update_and_delete_are_not_found<R: MedicineRepository>(service: &MedicineService<R>) {
    let id = service.create_medicine(draft("Aspirin", 1, "U1")).unwrap();
    let before = service.get_all_medicines().unwrap();

    let missing = Uuid::new_v4();
    let update = MedicineUpdate {
        id: missing,
        name: "Renamed".to_string(),
        description: String::new(),
        dosage_per_take: 3,
        storage_conditions: String::new(),
        medicine_type: MedicineType::Syrup,
        user_id: "U1".to_string(),
        intake_frequency: None,
    };
    let err = service.update_medicine(&update).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(found) if found == missing));
    assert_eq!(service.get_all_medicines().unwrap(), before);

    let err = service.delete_medicine(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let updated = service
        .update_medicine(&MedicineUpdate { id, ..update })
        .unwrap();
    assert_eq!(updated, id);
    let fetched = service.get_medicine_by_id(id).unwrap();
    assert_eq!(fetched.name, "Renamed");
    assert_eq!(fetched.medicine_type, MedicineType::Syrup);
    assert_eq!(fetched.intake_frequency, IntakeFrequency::OnceDaily);
}

fn empty_store_reads<R: MedicineRepository>(service: &MedicineService<R>) {
    assert!(service.get_all_medicines().unwrap().is_empty());
    assert!(service.get_medicines_by_user_id("U1").unwrap().is_empty());
    assert_eq!(service.count_medicines().unwrap(), 0);
}

fn update_request(id: Uuid, name: &str, dosage_per_take: i32, user_id: &str) -> MedicineUpdate {
    MedicineUpdate {
        id,
        name: name.to_string(),
        description: String::new(),
        dosage_per_take,
        storage_conditions: String::new(),
        medicine_type: MedicineType::Capsule,
        user_id: user_id.to_string(),
        intake_frequency: None,
    }
}

fn non_owner_update_is_not_found<R: MedicineRepository>(service: &MedicineService<R>) {
    let id = service.create_medicine(draft("Aspirin", 1, "U1")).unwrap();
    let before = service.get_medicine_by_id(id).unwrap();

    let err = service
        .update_medicine(&update_request(id, "Hijacked", 1, "U2"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(found) if found == id));
    assert_eq!(service.get_medicine_by_id(id).unwrap(), before);
}

fn invalid_update_leaves_record_unchanged<R: MedicineRepository>(service: &MedicineService<R>) {
    let id = service.create_medicine(draft("Aspirin", 2, "U1")).unwrap();
    let before = service.get_medicine_by_id(id).unwrap();

    for update in [
        update_request(id, "Aspirin", 0, "U1"),
        update_request(id, "Aspirin", -4, "U1"),
        update_request(id, "  ", 1, "U1"),
    ] {
        let err = service.update_medicine(&update).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
    assert_eq!(service.get_medicine_by_id(id).unwrap(), before);
}

fn memory_service() -> MedicineService<InMemoryMedicineRepository> {
    MedicineService::new(InMemoryMedicineRepository::new())
}

fn sqlite_service(conn: &Connection) -> MedicineService<SqliteMedicineRepository<'_>> {
    MedicineService::new(SqliteMedicineRepository::try_new(conn).unwrap())
}

#[test]
fn aspirin_lifecycle_in_memory() {
    aspirin_lifecycle(&memory_service());
}

#[test]
fn aspirin_lifecycle_sqlite() {
    let conn = open_db_in_memory().unwrap();
    aspirin_lifecycle(&sqlite_service(&conn));
}

#[test]
fn user_filter_matches_all_in_memory() {
    user_filter_is_subset_of_all(&memory_service());
}

#[test]
fn user_filter_matches_all_sqlite() {
    let conn = open_db_in_memory().unwrap();
    user_filter_is_subset_of_all(&sqlite_service(&conn));
}

#[test]
fn invalid_create_in_memory() {
    invalid_create_leaves_store_unchanged(&memory_service());
}

#[test]
fn invalid_create_sqlite() {
    let conn = open_db_in_memory().unwrap();
    invalid_create_leaves_store_unchanged(&sqlite_service(&conn));
}

#[test]
fn missing_ids_in_memory() {
    missing_update_and_delete_are_not_found(&memory_service());
}

#[test]
fn missing_ids_sqlite() {
    let conn = open_db_in_memory().unwrap();
    missing_update_and_delete_are_not_found(&sqlite_service(&conn));
}

#[test]
fn empty_store_in_memory() {
    empty_store_reads(&memory_service());
}

#[test]
fn empty_store_sqlite() {
    let conn = open_db_in_memory().unwrap();
    empty_store_reads(&sqlite_service(&conn));
}

#[test]
fn non_owner_update_in_memory() {
    non_owner_update_is_not_found(&memory_service());
}

#[test]
fn non_owner_update_sqlite() {
    let conn = open_db_in_memory().unwrap();
    non_owner_update_is_not_found(&sqlite_service(&conn));
}

#[test]
fn invalid_update_in_memory() {
    invalid_update_leaves_record_unchanged(&memory_service());
}

#[test]
fn invalid_update_sqlite() {
    let conn = open_db_in_memory().unwrap();
    invalid_update_leaves_record_unchanged(&sqlite_service(&conn));
}

#[test]
fn created_ids_are_unique() {
    let service = memory_service();
    let first = service.create_medicine(draft("Aspirin", 1, "U1")).unwrap();
    let second = service.create_medicine(draft("Aspirin", 1, "U1")).unwrap();
    assert_ne!(first, second);
}

#[test]
fn service_data_survives_reopening_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medtrack.db");

    let conn = open_db(&path).unwrap();
    let id = sqlite_service(&conn)
        .create_medicine(draft("Aspirin", 2, "U1"))
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let fetched = sqlite_service(&conn).get_medicine_by_id(id).unwrap();
    assert_eq!(fetched.name, "Aspirin");
}
