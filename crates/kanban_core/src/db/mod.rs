//! SQLite file behind the board's key-value store.
//!
//! The notes list and the theme preference both live in one `kv_entries`
//! table. This module only owns getting that table ready; the stores in
//! `repo` own what goes into it.
//!
//! # Invariants
//! - `PRAGMA user_version` records the last applied migration.
//! - No key is read or written through a connection that failed bootstrap.
//! - A file written by a newer build is refused, never downgraded. Callers
//!   treat that refusal like any other open failure and run the board
//!   without persistence.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Why the kv store file could not be made ready.
#[derive(Debug)]
pub enum DbError {
    /// The file could not be opened, configured, or migrated.
    Sqlite(rusqlite::Error),
    /// The file carries a schema this build does not know.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "kv store sqlite error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "kv store schema version {db_version} is newer than this build supports ({latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
