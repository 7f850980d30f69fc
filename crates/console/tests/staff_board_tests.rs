mod common;

use std::time::Duration;

use common::{staff, FakeDirectory};
use stationdesk_console::bus::{ConsoleEvent, EventBus, Notice};
use stationdesk_console::staff_board::{StaffBoard, StaffStats, MSG_STAFF_LOAD_FAILED};
use stationdesk_core::table::RowKey;

fn directory() -> FakeDirectory {
    let directory = FakeDirectory::new();
    *directory.unassigned.lock().unwrap() = vec![staff("u4", "Lan", None), staff("u5", "Tuan", None)];
    *directory.users.lock().unwrap() = vec![
        staff("u1", "Minh", Some("s1")),
        staff("u2", "Hoa", Some("s1")),
        staff("u3", "An", Some("s2")),
        staff("u4", "Lan", None),
        staff("u5", "Tuan", None),
    ];
    directory
}

#[tokio::test]
async fn refresh_loads_lists_and_statistics() {
    let directory = directory();
    let mut board = StaffBoard::new(10, Duration::from_millis(1500)).unwrap();

    let stats = board.refresh(&directory, &EventBus::default()).await.unwrap();

    assert_eq!(
        stats,
        StaffStats {
            total: 5,
            assigned: 3,
            unassigned: 2,
        }
    );
    assert_eq!(board.assigned().len(), 3);
    assert_eq!(board.unassigned().rows().len(), 2);
    assert_eq!(board.unassigned_pagination().total, 2);
}

#[tokio::test]
async fn assignment_change_event_triggers_refresh() {
    let directory = directory();
    let bus = EventBus::default();
    let mut board = StaffBoard::new(10, Duration::from_millis(1500)).unwrap();

    let refreshed = board
        .handle_event(&ConsoleEvent::StaffAssignmentsChanged, &directory, &bus)
        .await
        .unwrap();
    assert!(refreshed);
    assert_eq!(board.stats().total, 5);

    let ignored = board
        .handle_event(&ConsoleEvent::Notice(Notice::info("hi")), &directory, &bus)
        .await
        .unwrap();
    assert!(!ignored);
}

#[tokio::test]
async fn refresh_clears_table_selection() {
    let directory = directory();
    let mut board = StaffBoard::new(10, Duration::from_millis(1500)).unwrap();
    board.refresh(&directory, &EventBus::default()).await.unwrap();

    board.unassigned_mut().toggle_row(RowKey::Id("u4".into()));
    assert_eq!(board.unassigned().selected_rows().len(), 1);

    board.refresh(&directory, &EventBus::default()).await.unwrap();
    assert!(board.unassigned().selected_rows().is_empty());
}

#[tokio::test(start_paused = true)]
async fn search_is_debounced_before_querying() {
    let directory = directory();
    let mut board = StaffBoard::new(10, Duration::from_millis(1500)).unwrap();
    board.set_page(3);

    board.input_search("t");
    tokio::time::sleep(Duration::from_millis(200)).await;
    board.input_search("tu");

    assert_eq!(board.settled_search().await.as_deref(), Some("tu"));
    assert_eq!(board.page().page, 1);

    board.refresh(&directory, &EventBus::default()).await.unwrap();
    let query = directory.last_unassigned_query.lock().unwrap().clone().unwrap();
    assert_eq!(query.search.as_deref(), Some("tu"));
    assert_eq!(query.page.page, 1);

    let names: Vec<&str> = board
        .unassigned()
        .rows()
        .iter()
        .map(|s| s.full_name.as_str())
        .collect();
    assert_eq!(names, vec!["Tuan"]);
}

#[tokio::test]
async fn failed_refresh_keeps_stats_and_notifies() {
    let directory = directory();
    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    let mut board = StaffBoard::new(10, Duration::from_millis(1500)).unwrap();
    board.refresh(&directory, &bus).await.unwrap();

    *directory.fail_users.lock().unwrap() = true;
    assert!(board.refresh(&directory, &bus).await.is_err());

    assert_eq!(board.stats().total, 5);
    assert_eq!(
        rx.try_recv().unwrap(),
        ConsoleEvent::Notice(Notice::error(MSG_STAFF_LOAD_FAILED))
    );
}
