mod common;

use assert_matches::assert_matches;
use common::{staff, station, FakeDirectory};
use stationdesk_console::bus::{ConsoleEvent, EventBus, Notice};
use stationdesk_console::picker::{AssignmentPicker, CommitError, MSG_STATIONS_LOAD_FAILED};

fn directory() -> FakeDirectory {
    FakeDirectory::new().with_stations(vec![
        station("s1", "CS", "Central Station"),
        station("s2", "NS", "North Station"),
        station("s3", "CD", "Central Depot"),
    ])
}

#[tokio::test]
async fn search_ranks_loaded_stations() {
    let directory = directory();
    let mut picker = AssignmentPicker::new();
    picker.open(staff("u1", "Lan", None));
    assert!(picker.load_stations(&directory).await);

    picker.set_query("central");
    let names: Vec<&str> = picker
        .visible_stations()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["Central Station", "Central Depot"]);
}

#[tokio::test]
async fn successful_commit_notifies_and_closes() {
    let directory = directory();
    let bus = EventBus::default();
    let mut rx = bus.subscribe();

    let mut picker = AssignmentPicker::new();
    picker.open(staff("u1", "Lan", None));
    picker.load_stations(&directory).await;
    picker.select_station("s2");

    picker.commit(&directory, &bus).await.unwrap();

    assert_eq!(directory.calls(), vec!["assign:u1->s2"]);
    assert!(!picker.is_open());
    assert_eq!(
        rx.recv().await.unwrap(),
        ConsoleEvent::Notice(Notice::success("Assigned Lan to NS - North Station"))
    );
    assert_eq!(rx.recv().await.unwrap(), ConsoleEvent::StaffAssignmentsChanged);
}

#[tokio::test]
async fn failed_commit_stays_open_with_server_message() {
    let directory = directory().failing_assign("u1");
    let bus = EventBus::default();

    let mut picker = AssignmentPicker::new();
    picker.open(staff("u1", "Lan", None));
    picker.load_stations(&directory).await;
    picker.select_station("s1");

    let err = picker.commit(&directory, &bus).await.unwrap_err();

    assert_matches!(err, CommitError::Remote(_));
    assert!(picker.is_open());
    assert!(!picker.is_committing());
    assert_eq!(picker.error(), Some("Station is full"));

    // Retry is possible once the failure is recorded.
    *directory.fail_assign.lock().unwrap() = Default::default();
    picker.commit(&directory, &bus).await.unwrap();
    assert!(!picker.is_open());
}

#[tokio::test]
async fn commit_without_station_makes_no_call() {
    let directory = directory();
    let bus = EventBus::default();
    let mut picker = AssignmentPicker::new();
    picker.open(staff("u1", "Lan", None));

    let err = picker.commit(&directory, &bus).await.unwrap_err();
    assert_matches!(err, CommitError::Invalid(_));
    assert!(directory.calls().is_empty());
}

#[tokio::test]
async fn close_cancels_an_in_flight_fetch() {
    let directory = directory();
    let mut picker = AssignmentPicker::new();
    let session = picker.open(staff("u1", "Lan", None));

    let fetch = AssignmentPicker::fetch_stations(&directory, session);
    assert!(picker.close());
    let loaded = fetch.await;

    assert!(!picker.apply_stations(loaded));
    assert!(picker.stations().is_empty());
}

#[tokio::test]
async fn reopen_ignores_the_previous_session() {
    let directory = directory();
    let mut picker = AssignmentPicker::new();
    let first = picker.open(staff("u1", "Lan", None));
    let stale = AssignmentPicker::fetch_stations(&directory, first);

    let second = picker.open(staff("u2", "Minh", None));
    assert!(!picker.apply_stations(stale.await));

    let fresh = AssignmentPicker::fetch_stations(&directory, second).await;
    assert!(picker.apply_stations(fresh));
    assert_eq!(picker.stations().len(), 3);
    assert_eq!(picker.staff().map(|s| s.id.as_str()), Some("u2"));
}

#[tokio::test]
async fn close_is_refused_during_commit() {
    let directory = directory();
    let bus = EventBus::default();
    let mut picker = AssignmentPicker::new();
    picker.open(staff("u1", "Lan", None));
    picker.load_stations(&directory).await;
    picker.select_station("s1");

    let ticket = picker.begin_commit().unwrap();
    assert!(!picker.close());

    let result = AssignmentPicker::send_commit(&directory, ticket).await;
    picker.finish_commit(result, &bus).unwrap();
    assert!(!picker.is_open());
}

#[tokio::test]
async fn station_load_failure_is_surfaced() {
    let directory = directory();
    *directory.fail_stations.lock().unwrap() = true;
    let mut picker = AssignmentPicker::new();
    picker.open(staff("u1", "Lan", None));

    assert!(picker.load_stations(&directory).await);
    assert_eq!(picker.error(), Some(MSG_STATIONS_LOAD_FAILED));
    assert!(!picker.is_loading());
}
