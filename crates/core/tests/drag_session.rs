//! Drag-and-drop column transition tests

mod support;

use std::sync::Arc;

use support::{completed, full_board, ids, open, signed_in_board, Call, MemorySnapshotStore, MockCalendarFeed, MockTaskStore, Op};
use taskboard_core::{BoardError, BoardOptions, BroadcastBus};
use taskboard_domain::{CalendarEvent, ColumnId, ItemId, TaskStatus, TaskboardError};

async fn synced(tasks: Vec<taskboard_domain::Task>) -> (Arc<MockTaskStore>, taskboard_core::TaskBoard) {
    let store = MockTaskStore::shared(tasks);
    let board = signed_in_board(&store);
    board.sync().await.unwrap();
    store.clear_calls();
    (store, board)
}

#[tokio::test]
async fn todo_and_in_progress_moves_stay_local() {
    let (store, board) = synced(vec![open("1")]).await;
    let id = ItemId::for_task("1");

    board.begin_drag(id.clone(), ColumnId::Todo).unwrap();
    board.drop_on(ColumnId::InProgress).await.unwrap();
    assert_eq!(ids(&board.board().in_progress), vec!["task-1"]);

    board.begin_drag(id, ColumnId::InProgress).unwrap();
    board.drop_on(ColumnId::Todo).await.unwrap();
    assert_eq!(ids(&board.board().todo), vec!["task-1"]);

    assert!(store.calls().is_empty());
    assert!(!board.is_dragging());
}

#[tokio::test]
async fn drop_into_done_completes_once() {
    for source in [ColumnId::Todo, ColumnId::InProgress] {
        let (store, board) = synced(vec![open("7")]).await;
        let id = ItemId::for_task("7");
        if source == ColumnId::InProgress {
            board.move_item(ColumnId::Todo, ColumnId::InProgress, &id).await.unwrap();
        }

        board.begin_drag(id, source).unwrap();
        board.drop_on(ColumnId::Done).await.unwrap();

        assert_eq!(store.calls(), vec![Call::Complete("7".into())]);
        let snapshot = board.board();
        assert_eq!(ids(&snapshot.done), vec!["task-7"]);
        assert_eq!(snapshot.done[0].status, TaskStatus::Completed);
    }
}

#[tokio::test]
async fn drop_out_of_done_uncompletes_once() {
    for target in [ColumnId::Todo, ColumnId::InProgress] {
        let (store, board) = synced(vec![completed("7")]).await;

        board.begin_drag(ItemId::for_task("7"), ColumnId::Done).unwrap();
        board.drop_on(target).await.unwrap();

        assert_eq!(store.calls(), vec![Call::Uncomplete("7".into())]);
        let snapshot = board.board();
        assert_eq!(ids(snapshot.column(target)), vec!["task-7"]);
        assert_eq!(snapshot.column(target)[0].status, TaskStatus::NeedsAction);
    }
}

#[tokio::test]
async fn drop_on_source_column_is_a_no_op() {
    let (store, board) = synced(vec![open("1"), open("2")]).await;
    let before = board.board();

    board.begin_drag(ItemId::for_task("1"), ColumnId::Todo).unwrap();
    assert!(!board.hover(ColumnId::Todo));
    board.drop_on(ColumnId::Todo).await.unwrap();

    assert_eq!(board.board(), before);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn cancelled_drag_changes_nothing() {
    let (store, board) = synced(vec![open("1")]).await;
    let before = board.board();

    board.begin_drag(ItemId::for_task("1"), ColumnId::Todo).unwrap();
    assert!(board.hover(ColumnId::Done));
    assert!(board.cancel_drag());

    assert_eq!(board.board(), before);
    assert!(store.calls().is_empty());
    assert_eq!(board.drop_on(ColumnId::Done).await, Err(BoardError::NoActiveDrag));
}

#[tokio::test]
async fn second_drag_is_rejected() {
    let (_store, board) = synced(vec![open("1"), open("2")]).await;

    board.begin_drag(ItemId::for_task("1"), ColumnId::Todo).unwrap();
    let err = board.begin_drag(ItemId::for_task("2"), ColumnId::Todo).unwrap_err();

    assert_eq!(err, BoardError::DragInProgress);
}

#[tokio::test]
async fn failed_drop_rolls_back() {
    let (store, board) = synced(vec![open("1"), completed("2")]).await;
    let before = board.board();
    store.fail_next(Op::Complete, TaskboardError::Internal("502 Bad Gateway".into()));

    board.begin_drag(ItemId::for_task("1"), ColumnId::Todo).unwrap();
    let err = board.drop_on(ColumnId::Done).await.unwrap_err();

    assert!(matches!(err, BoardError::Transient(_)));
    assert_eq!(board.board(), before);
    assert!(!board.is_dragging());
}

#[tokio::test]
async fn calendar_items_move_locally() {
    let store = MockTaskStore::shared(vec![]);
    let calendar = MockCalendarFeed::shared(vec![CalendarEvent {
        id: "evt".into(),
        summary: "Planning".into(),
    }]);
    let snapshots = MemorySnapshotStore::shared();
    let bus = Arc::new(BroadcastBus::new());
    let options = BoardOptions { include_calendar_events: true, ..BoardOptions::default() };
    let board = full_board(&store, &calendar, &snapshots, &bus, options);
    board.set_authenticated(true);
    board.sync().await.unwrap();
    store.clear_calls();

    board.begin_drag(ItemId::for_event("evt"), ColumnId::Todo).unwrap();
    board.drop_on(ColumnId::Done).await.unwrap();
    board.delete(ColumnId::Done, &ItemId::for_event("evt")).await.unwrap();

    assert!(store.calls().is_empty());
    assert!(board.board().is_empty());

    // The next sync brings the event back.
    board.sync().await.unwrap();
    assert_eq!(ids(&board.board().todo), vec!["cal-evt"]);
}
