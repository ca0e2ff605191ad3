//! Habit record store: identity, ownership, and the cached streak counters.
//!
//! Owner-facing lookups go through [`get_owned`], which answers
//! [`HabitError::NotFound`] both for unknown ids and for habits of another owner.
//! Owners edit only the [`HabitPatch`] fields; the streak counters are written
//! exclusively by the streak engine through [`write_streak`], which rejects any
//! write that would invert or lower them.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::checkins;
use super::error::HabitError;
use super::types::{Frequency, Habit, HabitPatch, StreakCounters};

const HABIT_COLUMNS: &str =
    "id, owner_id, name, frequency, is_active, current_streak, longest_streak, created_at";

fn row_to_habit(row: &rusqlite::Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        frequency: row.get(3)?,
        is_active: row.get(4)?,
        current_streak: row.get(5)?,
        longest_streak: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Trim and check a habit name.
pub fn validate_name(name: &str) -> Result<String, HabitError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HabitError::Validation("name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Create a habit with both counters at zero and `is_active = true`.
pub fn create(
    conn: &Connection,
    owner_id: &str,
    name: &str,
    frequency: Frequency,
) -> Result<Habit, HabitError> {
    let name = validate_name(name)?;
    let habit = Habit {
        id: uuid::Uuid::now_v7().to_string(),
        owner_id: owner_id.to_string(),
        name,
        frequency,
        is_active: true,
        current_streak: 0,
        longest_streak: 0,
        created_at: chrono::Utc::now(),
    };

    conn.execute(
        "INSERT INTO habits (id, owner_id, name, frequency, is_active, current_streak, longest_streak, created_at) \
         VALUES (?1, ?2, ?3, ?4, 1, 0, 0, ?5)",
        params![habit.id, habit.owner_id, habit.name, habit.frequency, habit.created_at],
    )?;

    Ok(habit)
}

/// Unscoped lookup for administrative tooling. Request paths use [`get_owned`].
pub fn get(conn: &Connection, id: &str) -> Result<Option<Habit>, HabitError> {
    let habit = conn
        .query_row(
            &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
            params![id],
            row_to_habit,
        )
        .optional()?;
    Ok(habit)
}

/// Ownership-checked lookup. A foreign habit is reported exactly like a missing one.
pub fn get_owned(conn: &Connection, id: &str, owner_id: &str) -> Result<Habit, HabitError> {
    conn.query_row(
        &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1 AND owner_id = ?2"),
        params![id, owner_id],
        row_to_habit,
    )
    .optional()?
    .ok_or(HabitError::NotFound)
}

/// All habits of an owner, newest first.
pub fn list_by_owner(conn: &Connection, owner_id: &str) -> Result<Vec<Habit>, HabitError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {HABIT_COLUMNS} FROM habits WHERE owner_id = ?1 \
         ORDER BY created_at DESC, id DESC"
    ))?;
    let habits = stmt
        .query_map(params![owner_id], row_to_habit)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(habits)
}

/// Every habit in the database, oldest first. Used by export.
pub fn list_all(conn: &Connection) -> Result<Vec<Habit>, HabitError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {HABIT_COLUMNS} FROM habits ORDER BY created_at, id"
    ))?;
    let habits = stmt
        .query_map([], row_to_habit)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(habits)
}

/// Apply an owner patch to `name`, `frequency`, and `is_active`. `created_at`
/// and the streak counters are never touched here.
pub fn update(conn: &Connection, id: &str, patch: &HabitPatch) -> Result<Habit, HabitError> {
    let name = patch.name.as_deref().map(validate_name).transpose()?;

    let rows = conn.execute(
        "UPDATE habits SET \
           name = COALESCE(?2, name), \
           frequency = COALESCE(?3, frequency), \
           is_active = COALESCE(?4, is_active) \
         WHERE id = ?1",
        params![id, name, patch.frequency, patch.is_active],
    )?;
    if rows == 0 {
        return Err(HabitError::NotFound);
    }

    get(conn, id)?.ok_or(HabitError::NotFound)
}

/// Ownership-checked [`update`] in its own transaction.
pub fn update_owned(
    conn: &mut Connection,
    id: &str,
    owner_id: &str,
    patch: &HabitPatch,
) -> Result<Habit, HabitError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let before = get_owned(&tx, id, owner_id)?;
    let habit = if patch.is_empty() {
        before
    } else {
        update(&tx, id, patch)?
    };
    tx.commit()?;

    tracing::info!(habit_id = %id, owner = %owner_id, "habit updated");
    Ok(habit)
}

/// Write new streak counters. Reserved for the streak engine and the rollover pass.
///
/// Rejects `longest < current` and any decrease of `longest` as
/// [`HabitError::Invariant`]; neither can happen unless the caller is wrong.
pub(crate) fn write_streak(
    conn: &Connection,
    id: &str,
    counters: StreakCounters,
) -> Result<(), HabitError> {
    if counters.longest < counters.current {
        return Err(HabitError::Invariant(format!(
            "longest streak {} below current streak {}",
            counters.longest, counters.current
        )));
    }

    let stored_longest: u32 = conn
        .query_row(
            "SELECT longest_streak FROM habits WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(HabitError::NotFound)?;
    if counters.longest < stored_longest {
        return Err(HabitError::Invariant(format!(
            "longest streak may not decrease ({stored_longest} -> {})",
            counters.longest
        )));
    }

    conn.execute(
        "UPDATE habits SET current_streak = ?2, longest_streak = ?3 WHERE id = ?1",
        params![id, counters.current, counters.longest],
    )?;
    Ok(())
}

/// Remove a habit and, with it, all of its check-ins. Returns the number of
/// check-ins removed. Run inside the caller's transaction.
pub fn delete(conn: &Connection, id: &str) -> Result<usize, HabitError> {
    let removed = checkins::delete_by_habit(conn, id)?;
    let rows = conn.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(HabitError::NotFound);
    }
    Ok(removed)
}

/// Ownership-checked [`delete`]; the habit and its log go in one transaction.
pub fn delete_owned(conn: &mut Connection, id: &str, owner_id: &str) -> Result<usize, HabitError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    get_owned(&tx, id, owner_id)?;
    let removed = delete(&tx, id)?;
    tx.commit()?;

    tracing::info!(habit_id = %id, owner = %owner_id, check_ins = removed, "habit deleted");
    Ok(removed)
}
