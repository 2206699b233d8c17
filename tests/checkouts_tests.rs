//! Checkout service, history and stats integration tests

mod common;

use chrono::{Duration, Utc};
use equiptrack::{
    events::EventBus,
    services::checkouts::HistoryFilter,
};

#[test]
fn history_is_newest_first_and_filterable() {
    let repository = common::repository();
    let services = common::services(&repository, &EventBus::new());
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let tripod = common::add_equipment(&repository, "Tripod", "WACS TRIPOD 1");
    let now = Utc::now();

    repository
        .record_checkout(&sara, &mic, "", None, now - Duration::days(2))
        .unwrap();
    repository
        .record_checkin("Rode Mic 1", "", now - Duration::days(1))
        .unwrap();
    repository
        .record_checkout(&sara, &tripod, "", Some(now - Duration::hours(1)), now - Duration::hours(5))
        .unwrap();

    let all = services.checkouts.history(HistoryFilter::All, now).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].equipment_barcode, "WACS TRIPOD 1");
    assert_eq!(all[1].equipment_barcode, "Rode Mic 1");

    let out = services.checkouts.history(HistoryFilter::Out, now).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].equipment_barcode, "WACS TRIPOD 1");

    let returned = services.checkouts.history(HistoryFilter::In, now).unwrap();
    assert_eq!(returned.len(), 1);
    assert_eq!(returned[0].equipment_barcode, "Rode Mic 1");

    // The tripod's expected return is an hour in the past
    let overdue = services.checkouts.history(HistoryFilter::Overdue, now).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].equipment_barcode, "WACS TRIPOD 1");
}

#[test]
fn check_out_rejects_unknown_parties() {
    let repository = common::repository();
    let services = common::services(&repository, &EventBus::new());
    common::add_student(&repository, "Sara Garrett");

    assert!(services
        .checkouts
        .check_out("Sara Garrett", "No Such Mic", "", None)
        .is_err());
    assert!(services
        .checkouts
        .check_out("No Such Student", "No Such Mic", "", None)
        .is_err());
    assert!(repository.transactions_list().unwrap().is_empty());
}

#[test]
fn summary_counts_cover_all_four_cards() {
    let repository = common::repository();
    let services = common::services(&repository, &EventBus::new());
    let sara = common::add_student(&repository, "Sara Garrett");
    common::add_student(&repository, "Jack Kolarich");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let tripod = common::add_equipment(&repository, "Tripod", "WACS TRIPOD 1");
    common::add_equipment(&repository, "Phone Mount", "Phone Mount 1");
    let now = Utc::now();

    repository
        .record_checkout(&sara, &mic, "", Some(now - Duration::hours(1)), now - Duration::hours(4))
        .unwrap();
    repository
        .record_checkout(&sara, &tripod, "", None, now)
        .unwrap();

    let stats = services.stats.summary(now).unwrap();
    assert_eq!(stats.total_students, 2);
    assert_eq!(stats.total_equipment, 3);
    assert_eq!(stats.currently_out, 2);
    assert_eq!(stats.overdue, 1);
}

#[test]
fn checked_out_report_renders_duration_and_overdue() {
    let repository = common::repository();
    let services = common::services(&repository, &EventBus::new());
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let now = Utc::now();

    repository
        .record_checkout(
            &sara,
            &mic,
            "",
            Some(now - Duration::minutes(10)),
            now - Duration::minutes(42),
        )
        .unwrap();

    let rows = services.stats.checked_out_report(now).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].student_name, "Sara Garrett");
    assert_eq!(rows[0].equipment, "Microphone - Rode Mic 1");
    assert_eq!(rows[0].checked_out_for, "42 min");
    assert!(rows[0].overdue);
}

#[test]
fn check_in_all_through_the_service_reports_the_count() {
    let repository = common::repository();
    let services = common::services(&repository, &EventBus::new());
    let sara = common::add_student(&repository, "Sara Garrett");
    let mic = common::add_equipment(&repository, "Microphone", "Rode Mic 1");
    let tripod = common::add_equipment(&repository, "Tripod", "WACS TRIPOD 1");
    let now = Utc::now();
    repository.record_checkout(&sara, &mic, "", None, now).unwrap();
    repository.record_checkout(&sara, &tripod, "", None, now).unwrap();

    let closed = services
        .checkouts
        .check_in_all("Sara Garrett", "end of day sweep")
        .unwrap();
    assert_eq!(closed, 2);
    assert_eq!(services.checkouts.count_active().unwrap(), 0);
}
