use kanban_core::{
    open_board, BoardConfig, BoardError, BoardService, CardFooter, Column, KvNoteStore,
    ManualClock, MemoryKvStore, NewNote, NoteEdit, NoteValidationError, Priority, SaveStatus,
    TimerState,
};
use std::collections::HashSet;

const T0: i64 = 1_700_000_000_000;

type MemoryBoard = BoardService<KvNoteStore<MemoryKvStore>, ManualClock>;

#[test]
fn create_defaults_to_todo_with_medium_priority() {
    let (mut board, _clock) = new_board();

    let created = board.create(NewNote::new("Buy milk")).unwrap();
    assert_eq!(created.save, SaveStatus::Saved);

    let note = created.value;
    assert_eq!(board.notes().len(), 1);
    assert_eq!(note.text, "Buy milk");
    assert_eq!(note.column, Column::Todo);
    assert_eq!(note.priority, Priority::Medium);
    assert_eq!(note.created_at, T0);
    assert_eq!(note.started_at, None);
    assert_eq!(note.completed_at, None);
    assert_eq!(note.time_spent, 0);
    assert_eq!(note.timer_state(), TimerState::Idle);
}

#[test]
fn create_trims_text_and_rejects_blank_input() {
    let (mut board, _clock) = new_board();

    let note = board
        .create(NewNote::new("  Call mom  ").with_description("  weekly  "))
        .unwrap()
        .value;
    assert_eq!(note.text, "Call mom");
    assert_eq!(note.description, "weekly");

    let err = board.create(NewNote::new("   \n\t")).unwrap_err();
    assert_eq!(err, BoardError::Validation(NoteValidationError::EmptyText));
    assert_eq!(board.notes().len(), 1);
}

#[test]
fn in_progress_then_done_records_time_spent() {
    let (mut board, clock) = new_board();
    let id = board.create(NewNote::new("Write report")).unwrap().value.id;

    let moved = board.move_column(id, Column::InProgress).unwrap().value;
    assert_eq!(moved.started_at, Some(T0));
    assert!(board.timers().is_active(id));

    clock.advance(5_000);
    assert_eq!(board.timers().elapsed_ms(id), Some(5_000));
    assert_eq!(board.live_elapsed_ms(id), Some(5_000));

    clock.set(T0 + 65_000);
    let done = board.move_column(id, Column::Done).unwrap().value;
    assert_eq!(done.time_spent, 65_000);
    assert_eq!(done.completed_at, Some(T0 + 65_000));
    assert!(!board.timers().is_active(id));
    assert_eq!(board.timers().elapsed_ms(id), None);
    assert_eq!(
        done.timer_state(),
        TimerState::Completed {
            time_spent_ms: 65_000
        }
    );
}

#[test]
fn done_notes_stay_frozen_while_the_clock_runs() {
    let (mut board, clock) = new_board();
    let id = board.create(NewNote::new("Close ticket")).unwrap().value.id;
    board.move_column(id, Column::InProgress).unwrap();
    clock.advance(65_000);
    board.move_column(id, Column::Done).unwrap();

    for _ in 0..3 {
        clock.advance(3_600_000);
        assert!(board.timer_readings().is_empty());
    }

    let note = board.get(id).unwrap();
    assert_eq!(note.time_spent, 65_000);
    assert_eq!(note.completed_at, Some(T0 + 65_000));
    assert_eq!(board.live_elapsed_ms(id), None);
    match &board.snapshot().column(Column::Done).unwrap().cards[0].footer {
        CardFooter::Completed { duration, .. } => assert_eq!(duration, "Completed in 1m 5s"),
        other => panic!("unexpected footer: {other:?}"),
    }
}

#[test]
fn re_entering_in_progress_accumulates_runs() {
    let (mut board, clock) = new_board();
    let id = board.create(NewNote::new("Refactor")).unwrap().value.id;

    board.move_column(id, Column::InProgress).unwrap();
    clock.advance(10_000);
    board.move_column(id, Column::Todo).unwrap();
    assert!(!board.timers().is_active(id));
    assert_eq!(board.get(id).unwrap().time_spent, 10_000);

    clock.advance(60_000);
    let resumed = board.move_column(id, Column::InProgress).unwrap().value;
    assert_eq!(resumed.started_at, Some(T0));
    assert_eq!(resumed.resumed_at, Some(T0 + 70_000));

    clock.advance(3_000);
    assert_eq!(board.live_elapsed_ms(id), Some(13_000));

    let done = board.move_column(id, Column::Done).unwrap().value;
    assert_eq!(done.time_spent, 13_000);
    assert_eq!(done.started_at, Some(T0));
}

#[test]
fn moving_out_of_done_and_back_refreshes_completed_at() {
    let (mut board, clock) = new_board();
    let id = board
        .create(NewNote::new("Ship").in_column(Column::Done))
        .unwrap()
        .value
        .id;
    assert_eq!(board.get(id).unwrap().completed_at, Some(T0));

    clock.advance(1_000);
    board.move_column(id, Column::Todo).unwrap();
    assert_eq!(board.get(id).unwrap().completed_at, Some(T0));

    clock.advance(1_000);
    let done = board.move_column(id, Column::Done).unwrap().value;
    assert_eq!(done.completed_at, Some(T0 + 2_000));
    assert_eq!(done.time_spent, 0);
}

#[test]
fn moving_to_same_column_is_unchanged() {
    let (mut board, clock) = new_board();
    let id = board
        .create(NewNote::new("Stay").in_column(Column::InProgress))
        .unwrap()
        .value
        .id;

    clock.advance(2_000);
    let same = board.move_column(id, Column::InProgress).unwrap();
    assert_eq!(same.save, SaveStatus::Unchanged);
    assert_eq!(same.value.started_at, Some(T0));
    assert_eq!(same.value.resumed_at, Some(T0));
    assert_eq!(board.live_elapsed_ms(id), Some(2_000));
}

#[test]
fn operations_on_unknown_ids_are_rejected_without_changes() {
    let (mut board, _clock) = new_board();
    board.create(NewNote::new("Keep")).unwrap();

    assert_eq!(
        board.move_column(42, Column::Done).unwrap_err(),
        BoardError::NotFound(42)
    );
    assert_eq!(
        board.edit(42, NoteEdit::default()).unwrap_err(),
        BoardError::NotFound(42)
    );

    let deleted = board.delete(42);
    assert_eq!(deleted.value, None);
    assert_eq!(deleted.save, SaveStatus::Unchanged);
    assert_eq!(board.notes().len(), 1);
}

#[test]
fn edit_updates_fields_and_last_edited_at() {
    let (mut board, clock) = new_board();
    let id = board.create(NewNote::new("Draft")).unwrap().value.id;

    clock.advance(30_000);
    let edited = board
        .edit(
            id,
            NoteEdit {
                text: Some(" Final ".to_string()),
                description: Some("with notes".to_string()),
                priority: Some(Priority::High),
            },
        )
        .unwrap()
        .value;
    assert_eq!(edited.text, "Final");
    assert_eq!(edited.description, "with notes");
    assert_eq!(edited.priority, Priority::High);
    assert_eq!(edited.created_at, T0);
    assert_eq!(edited.last_edited_at, Some(T0 + 30_000));

    let err = board
        .edit(
            id,
            NoteEdit {
                text: Some("  ".to_string()),
                ..NoteEdit::default()
            },
        )
        .unwrap_err();
    assert_eq!(err, BoardError::Validation(NoteValidationError::EmptyText));
    assert_eq!(board.get(id).unwrap().text, "Final");
}

#[test]
fn delete_cancels_running_timer() {
    let (mut board, _clock) = new_board();
    let id = board
        .create(NewNote::new("Gone").in_column(Column::InProgress))
        .unwrap()
        .value
        .id;
    assert!(board.timers().is_active(id));

    let deleted = board.delete(id);
    assert_eq!(deleted.value.map(|note| note.id), Some(id));
    assert!(!board.timers().is_active(id));
    assert!(board.timer_readings().is_empty());
    assert!(board.get(id).is_none());
}

#[test]
fn display_order_is_priority_then_insertion() {
    let (mut board, _clock) = new_board();
    let low = create_with(&mut board, "low", Priority::Low);
    let medium_first = create_with(&mut board, "medium first", Priority::Medium);
    let high = create_with(&mut board, "high", Priority::High);
    let medium_second = create_with(&mut board, "medium second", Priority::Medium);

    let ids: Vec<_> = board
        .column_notes(Column::Todo)
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(ids, vec![high, medium_first, medium_second, low]);

    let insertion: Vec<_> = board.notes().iter().map(|note| note.id).collect();
    assert_eq!(insertion, vec![low, medium_first, high, medium_second]);
}

#[test]
fn snapshot_projects_columns_and_footers() {
    let (mut board, clock) = new_board();
    assert!(board.snapshot().is_empty);

    board.create(NewNote::new("todo")).unwrap();
    let running = board
        .create(NewNote::new("running").in_column(Column::InProgress))
        .unwrap()
        .value
        .id;
    let finished = board.create(NewNote::new("finished")).unwrap().value.id;
    board.move_column(finished, Column::InProgress).unwrap();
    clock.advance(90_000);
    board.move_column(finished, Column::Done).unwrap();

    let snapshot = board.snapshot();
    assert!(!snapshot.is_empty);
    assert_eq!(snapshot.card_count(), 3);
    assert_eq!(snapshot.storage_warning, None);

    let todo = snapshot.column(Column::Todo).unwrap();
    assert!(matches!(todo.cards[0].footer, CardFooter::Created { .. }));

    let in_progress = snapshot.column(Column::InProgress).unwrap();
    assert_eq!(in_progress.cards[0].id, running);
    assert_eq!(
        in_progress.cards[0].footer,
        CardFooter::Timer {
            elapsed: "⏱ 01:30".to_string()
        }
    );

    let done = snapshot.column(Column::Done).unwrap();
    match &done.cards[0].footer {
        CardFooter::Completed { duration, on } => {
            assert_eq!(duration, "Completed in 1m 30s");
            assert!(on.as_deref().is_some_and(|on| on.starts_with("on ")));
        }
        other => panic!("unexpected footer: {other:?}"),
    }
}

#[test]
fn timer_readings_cover_running_notes_only() {
    let (mut board, clock) = new_board();
    let first = board
        .create(NewNote::new("one").in_column(Column::InProgress))
        .unwrap()
        .value
        .id;
    clock.advance(1_000);
    let second = board
        .create(NewNote::new("two").in_column(Column::InProgress))
        .unwrap()
        .value
        .id;
    board.create(NewNote::new("idle")).unwrap();

    clock.advance(3_600_000);
    let readings = board.timer_readings();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].note_id, first);
    assert_eq!(readings[0].display, "⏱ 1:00:01");
    assert_eq!(readings[1].note_id, second);
    assert_eq!(readings[1].elapsed_ms, 3_600_000);
}

#[test]
fn ids_stay_unique_across_mixed_edits_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = BoardConfig {
        store_path: dir.path().join("board.sqlite3"),
        ..BoardConfig::default()
    };
    // A frozen clock forces every id past the previous one.
    let clock = ManualClock::new(T0);

    let mut board = open_board(&config, clock.clone());
    let mut created = Vec::new();
    for round in 0..6 {
        let id = board
            .create(NewNote::new(format!("note {round}")))
            .unwrap()
            .value
            .id;
        created.push(id);
        match round % 3 {
            0 => {
                board.move_column(id, Column::InProgress).unwrap();
            }
            1 => {
                board.move_column(id, Column::Done).unwrap();
            }
            _ => {
                board.delete(created[round - 1]);
            }
        }
    }
    assert_unique_ids(&board.notes().iter().map(|note| note.id).collect::<Vec<_>>());
    drop(board);

    clock.set(T0 - 60_000);
    let mut reopened = open_board(&config, clock.clone());
    assert_eq!(reopened.notes().len(), 4);
    let highest = reopened.notes().iter().map(|note| note.id).max().unwrap();
    for round in 0..4 {
        let id = reopened
            .create(NewNote::new(format!("after reopen {round}")))
            .unwrap()
            .value
            .id;
        assert!(id > highest);
        if round == 1 {
            reopened.delete(id);
        }
    }

    let ids: Vec<_> = reopened.notes().iter().map(|note| note.id).collect();
    assert_eq!(ids.len(), 7);
    assert_unique_ids(&ids);
    assert_unique_ids(&created);
}

fn assert_unique_ids(ids: &[i64]) {
    let distinct: HashSet<_> = ids.iter().collect();
    assert_eq!(distinct.len(), ids.len(), "duplicate ids in {ids:?}");
}

fn new_board() -> (MemoryBoard, ManualClock) {
    let clock = ManualClock::new(T0);
    let board = BoardService::open(KvNoteStore::new(MemoryKvStore::new()), clock.clone());
    (board, clock)
}

fn create_with(board: &mut MemoryBoard, text: &str, priority: Priority) -> i64 {
    board
        .create(NewNote::new(text).with_priority(priority))
        .unwrap()
        .value
        .id
}
