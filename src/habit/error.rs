//! Error kinds surfaced by the habit engine.

use rusqlite::ErrorCode;

/// Errors returned by the record store and the streak engine.
#[derive(Debug, thiserror::Error)]
pub enum HabitError {
    /// Unknown habit id, or a habit owned by someone else. The two are never distinguished.
    #[error("Habit not found")]
    NotFound,

    /// The habit already has a check-in for today.
    #[error("Already checked in today")]
    AlreadyCheckedIn,

    /// Malformed input (empty name, unknown frequency, bad date range, ...).
    #[error("{0}")]
    Validation(String),

    /// A write would break `longest_streak >= current_streak` or lower `longest_streak`.
    #[error("streak invariant violated: {0}")]
    Invariant(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HabitError {
    /// Whether retrying the whole transaction may succeed (database busy or locked).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
