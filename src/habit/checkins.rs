//! Check-in log: an append-only set of `(habit_id, date)` events.
//!
//! [`append`] is the only write path. Uniqueness of the pair is enforced by the
//! `idx_check_ins_habit_date` unique index inside the caller's transaction, so a
//! second append for the same day fails with [`LogError::Duplicate`] instead of
//! inserting a row. Rows are only ever removed through [`delete_by_habit`].

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::HashSet;

use super::types::{CheckIn, DateRange};

/// Failure modes of [`append`].
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("check-in already recorded for this habit and date")]
    Duplicate,
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Insert a check-in for `habit_id` on `date`.
pub fn append(
    conn: &Connection,
    habit_id: &str,
    date: NaiveDate,
    note: Option<&str>,
) -> Result<CheckIn, LogError> {
    let id = uuid::Uuid::now_v7().to_string();
    let note = note.map(str::trim).filter(|n| !n.is_empty());

    conn.execute(
        "INSERT INTO habit_check_ins (id, habit_id, completed_at, note) VALUES (?1, ?2, ?3, ?4)",
        params![id, habit_id, date, note],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LogError::Duplicate
        } else {
            LogError::Storage(e)
        }
    })?;

    Ok(CheckIn {
        id,
        habit_id: habit_id.to_string(),
        date,
        note: note.map(str::to_string),
    })
}

fn row_to_check_in(row: &rusqlite::Row<'_>) -> rusqlite::Result<CheckIn> {
    Ok(CheckIn {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        date: row.get(2)?,
        note: row.get(3)?,
    })
}

/// All check-ins of a habit, newest first, optionally limited to an inclusive range.
pub fn list_by_habit(
    conn: &Connection,
    habit_id: &str,
    range: Option<DateRange>,
) -> rusqlite::Result<Vec<CheckIn>> {
    match range {
        Some(range) => {
            let mut stmt = conn.prepare(
                "SELECT id, habit_id, completed_at, note FROM habit_check_ins \
                 WHERE habit_id = ?1 AND completed_at >= ?2 AND completed_at <= ?3 \
                 ORDER BY completed_at DESC",
            )?;
            let rows = stmt
                .query_map(params![habit_id, range.start, range.end], row_to_check_in)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, habit_id, completed_at, note FROM habit_check_ins \
                 WHERE habit_id = ?1 ORDER BY completed_at DESC",
            )?;
            let rows = stmt
                .query_map(params![habit_id], row_to_check_in)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }
    }
}

/// Every check-in in the database, oldest first. Used by export.
pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<CheckIn>> {
    let mut stmt = conn.prepare(
        "SELECT id, habit_id, completed_at, note FROM habit_check_ins \
         ORDER BY completed_at, habit_id",
    )?;
    let rows = stmt
        .query_map([], row_to_check_in)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Whether the habit has at least one check-in inside `range`.
pub fn exists_in_range(
    conn: &Connection,
    habit_id: &str,
    range: DateRange,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM habit_check_ins \
         WHERE habit_id = ?1 AND completed_at >= ?2 AND completed_at <= ?3)",
        params![habit_id, range.start, range.end],
        |row| row.get(0),
    )
}

/// Date of the most recent check-in, or `None` for a habit never checked in.
pub fn latest(conn: &Connection, habit_id: &str) -> rusqlite::Result<Option<NaiveDate>> {
    conn.query_row(
        "SELECT MAX(completed_at) FROM habit_check_ins WHERE habit_id = ?1",
        params![habit_id],
        |row| row.get::<_, Option<NaiveDate>>(0),
    )
}

/// Ids of the owner's habits that have a check-in on `date`, in one query.
pub fn completed_on(
    conn: &Connection,
    owner_id: &str,
    date: NaiveDate,
) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT c.habit_id FROM habit_check_ins c \
         JOIN habits h ON h.id = c.habit_id \
         WHERE h.owner_id = ?1 AND c.completed_at = ?2",
    )?;
    let ids = stmt
        .query_map(params![owner_id, date], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(ids)
}

/// Remove every check-in of a habit. Only called while deleting the habit itself.
pub(crate) fn delete_by_habit(conn: &Connection, habit_id: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM habit_check_ins WHERE habit_id = ?1",
        params![habit_id],
    )
}
