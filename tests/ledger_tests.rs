//! Transaction ledger integration tests

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use equiptrack::{
    error::{AppError, AppResult},
    models::UpdateStudent,
    repository::Repository,
    storage::{MemoryStorage, Storage},
};

#[test]
fn checkout_then_checkin_roundtrip() {
    let repository = common::repository();
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let now = Utc::now();

    assert!(!repository.is_checked_out("Rode Mic 1").unwrap());

    let transaction = repository
        .record_checkout(&sara, &mic, "field trip", None, now)
        .unwrap();
    assert!(transaction.is_open());
    assert!(transaction.checkin_time.is_none());
    assert_eq!(transaction.student_name, "Sara Garrett");
    assert!(repository.is_checked_out("Rode Mic 1").unwrap());

    let closed = repository
        .record_checkin("Rode Mic 1", "all good", now + Duration::hours(2))
        .unwrap();
    assert!(!closed.is_open());
    assert_eq!(closed.checkin_time, Some(now + Duration::hours(2)));
    assert_eq!(closed.checkin_notes, "all good");
    assert!(!repository.is_checked_out("Rode Mic 1").unwrap());
}

#[test]
fn double_checkout_is_refused_naming_the_holder() {
    let repository = common::repository();
    let sara = common::add_student(&repository, "Sara Garrett");
    let jack = common::add_student(&repository, "Jack Kolarich");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let now = Utc::now();

    repository
        .record_checkout(&sara, &mic, "", None, now)
        .unwrap();

    let err = repository
        .record_checkout(&jack, &mic, "", None, now)
        .unwrap_err();
    match err {
        AppError::BusinessRule(msg) => {
            assert_eq!(msg, "Equipment is already checked out to Sara Garrett")
        }
        other => panic!("expected business rule error, got {:?}", other),
    }

    // The failed attempt must not have touched the ledger
    let open = repository.open_transactions(Some("Rode Mic 1")).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].student_barcode, "Sara Garrett");
}

#[test]
fn at_most_one_open_transaction_per_equipment() {
    let repository = common::repository();
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let now = Utc::now();

    for round in 0..3 {
        let at = now + Duration::days(round);
        repository.record_checkout(&sara, &mic, "", None, at).unwrap();
        assert_eq!(
            repository.open_transactions(Some("Rode Mic 1")).unwrap().len(),
            1
        );
        repository
            .record_checkin("Rode Mic 1", "", at + Duration::hours(1))
            .unwrap();
    }

    // History keeps every record; nothing is ever deleted
    assert_eq!(repository.transactions_list().unwrap().len(), 3);
    assert_eq!(repository.open_transactions(Some("Rode Mic 1")).unwrap().len(), 0);
}

#[test]
fn checkin_without_open_checkout_is_not_found() {
    let repository = common::repository();
    common::add_equipment(&repository, "Tripod", "WACS TRIPOD 1");

    let err = repository
        .record_checkin("WACS TRIPOD 1", "", Utc::now())
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn checkin_all_closes_each_of_the_students_items() {
    let repository = common::repository();
    let sara = common::add_student(&repository, "Sara Garrett");
    let jack = common::add_student(&repository, "Jack Kolarich");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let tripod = common::add_equipment(&repository, "Tripod", "WACS TRIPOD 1");
    let mount = common::add_equipment(&repository, "Phone Mount", "Phone Mount 3");
    let now = Utc::now();

    repository.record_checkout(&sara, &mic, "", None, now).unwrap();
    repository.record_checkout(&sara, &tripod, "", None, now).unwrap();
    repository.record_checkout(&jack, &mount, "", None, now).unwrap();

    let closed = repository
        .record_checkin_all("Sara Garrett", "Batch check-in (all items)", now)
        .unwrap();
    assert_eq!(closed, 2);

    assert!(repository.open_transactions_for("Sara Garrett").unwrap().is_empty());
    // The other student's checkout is untouched
    assert_eq!(repository.open_transactions_for("Jack Kolarich").unwrap().len(), 1);

    for transaction in repository.transactions_list().unwrap() {
        if transaction.student_barcode == "Sara Garrett" {
            assert_eq!(transaction.checkin_notes, "Batch check-in (all items)");
        }
    }
}

#[test]
fn student_barcode_rename_cascades_without_rewriting_names() {
    let repository = common::repository();
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let tripod = common::add_equipment(&repository, "Tripod", "WACS TRIPOD 1");
    let now = Utc::now();

    // One closed and one open transaction
    repository.record_checkout(&sara, &mic, "", None, now).unwrap();
    repository.record_checkin("Rode Mic 1", "", now).unwrap();
    repository.record_checkout(&sara, &tripod, "", None, now).unwrap();

    repository
        .students_update(
            "Sara Garrett",
            &UpdateStudent {
                barcode: Some("ID-0042".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    for transaction in repository.transactions_list().unwrap() {
        assert_eq!(transaction.student_barcode, "ID-0042");
        // Denormalized display name keeps its point-in-time value
        assert_eq!(transaction.student_name, "Sara Garrett");
    }

    // The renamed pass now drives lookups
    assert_eq!(repository.open_transactions_for("ID-0042").unwrap().len(), 1);
    assert!(repository.open_transactions_for("Sara Garrett").unwrap().is_empty());
}

#[test]
fn equipment_barcode_rename_cascades_over_all_statuses() {
    let repository = common::repository();
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let now = Utc::now();

    repository.record_checkout(&sara, &mic, "", None, now).unwrap();
    repository.record_checkin("Rode Mic 1", "", now).unwrap();
    repository.record_checkout(&sara, &mic, "", None, now).unwrap();

    let rewritten = repository
        .rename_equipment_barcode("Rode Mic 1", "MIC-001")
        .unwrap();
    assert_eq!(rewritten, 2);

    assert!(repository.is_checked_out("MIC-001").unwrap());
    assert!(!repository.is_checked_out("Rode Mic 1").unwrap());
}

#[test]
fn deleting_a_student_leaves_the_ledger_alone() {
    let repository = common::repository();
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    repository
        .record_checkout(&sara, &mic, "", None, Utc::now())
        .unwrap();

    repository.students_delete("Sara Garrett").unwrap();

    assert_eq!(repository.transactions_list().unwrap().len(), 1);
    assert!(repository.is_checked_out("Rode Mic 1").unwrap());
}

#[test]
fn overdue_counting_uses_wall_clock() {
    let repository = common::repository();
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let tripod = common::add_equipment(&repository, "Tripod", "WACS TRIPOD 1");
    let now = Utc::now();

    repository
        .record_checkout(&sara, &mic, "", Some(now + Duration::hours(1)), now)
        .unwrap();
    // No expected return: can never be overdue
    repository
        .record_checkout(&sara, &tripod, "", None, now)
        .unwrap();

    assert_eq!(repository.count_overdue(now).unwrap(), 0);
    assert_eq!(repository.count_overdue(now + Duration::hours(2)).unwrap(), 1);
    assert_eq!(repository.count_active().unwrap(), 2);
}

#[test]
fn ledger_survives_a_reload_from_the_same_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let repository = Repository::open(storage.clone()).unwrap();
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    repository
        .record_checkout(&sara, &mic, "overnight", None, Utc::now())
        .unwrap();

    let reloaded = Repository::open(storage).unwrap();
    assert!(reloaded.is_checked_out("Rode Mic 1").unwrap());
    assert_eq!(reloaded.students_list().unwrap().len(), 1);
    let transactions = reloaded.transactions_list().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].checkout_notes, "overnight");
}

mockall::mock! {
    pub Store {}

    impl Storage for Store {
        fn load(&self, collection: &str) -> AppResult<Option<String>>;
        fn save(&self, collection: &str, document: &str) -> AppResult<()>;
    }
}

#[test]
fn every_ledger_mutation_writes_the_transactions_document() {
    let mut store = MockStore::new();
    store.expect_load().returning(|_| Ok(None));
    store
        .expect_save()
        .withf(|collection, _| collection == "transactions")
        .times(2)
        .returning(|_, _| Ok(()));

    let repository = Repository::open(Arc::new(store)).unwrap();
    let now = Utc::now();
    let sara = equiptrack::models::Student {
        name: "Sara Garrett".into(),
        barcode: "Sara Garrett".into(),
        email: None,
        photo: None,
        added_date: now,
    };
    let mic = equiptrack::models::EquipmentItem {
        equipment_type: "Microphone".into(),
        barcode: "Rode Mic 1".into(),
        description: None,
        added_date: now,
    };

    repository.record_checkout(&sara, &mic, "", None, now).unwrap();
    repository.record_checkin("Rode Mic 1", "", now).unwrap();
}
