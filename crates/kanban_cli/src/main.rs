//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `kanban_core` linkage.
//! - Print a one-line summary of the configured board.

use kanban_core::{open_board, BoardConfig, Column, SystemClock};

fn main() {
    println!("kanban_core ping={}", kanban_core::ping());
    println!("kanban_core version={}", kanban_core::core_version());

    let config = BoardConfig::from_env();
    let board = open_board(&config, SystemClock);
    let counts = Column::ALL
        .iter()
        .map(|column| format!("{column}={}", board.column_notes(*column).len()))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "board store={} available={} running={} {counts}",
        config.store_path.display(),
        board.is_storage_available(),
        board.timers().active_timer_ids().len()
    );
}
