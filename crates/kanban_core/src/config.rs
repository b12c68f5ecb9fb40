//! Runtime configuration for board hosts.
//!
//! # Responsibility
//! - Resolve the board database path and refresh interval.
//!
//! # Invariants
//! - Resolution never fails; invalid overrides fall back to defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Overrides the board database location.
pub const STORE_PATH_ENV: &str = "KANBAN_STORE_PATH";
/// Overrides the timer refresh interval, in milliseconds.
pub const REFRESH_MS_ENV: &str = "KANBAN_REFRESH_MS";

const STORE_FILE_NAME: &str = "kanban_board.sqlite3";
const DEFAULT_REFRESH_MS: u64 = 1_000;
const MAX_REFRESH_MS: u64 = 60_000;

/// Host configuration for one board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub store_path: PathBuf,
    pub refresh_interval: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            store_path: std::env::temp_dir().join(STORE_FILE_NAME),
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_MS),
        }
    }
}

impl BoardConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, e.g. a fixed map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let store_path = lookup(STORE_PATH_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        let refresh_interval = lookup(REFRESH_MS_ENV)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|ms| (1..=MAX_REFRESH_MS).contains(ms))
            .map(Duration::from_millis)
            .unwrap_or(defaults.refresh_interval);

        Self {
            store_path,
            refresh_interval,
        }
    }
}
