use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;

use super::error::HabitError;

/// Habit summary behind the analytics endpoint and `cadence stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub total: i64,
    pub active: i64,
    pub completed_today: i64,
    /// Highest `longest_streak` across the habits counted.
    pub longest_streak: u32,
    pub total_check_ins: i64,
}

/// Compute habit statistics.
///
/// If `owner` is provided, counts are limited to that owner's habits;
/// otherwise they cover the whole database.
pub fn habit_stats(
    conn: &mut Connection,
    owner: Option<&str>,
    today: NaiveDate,
) -> Result<HabitStats, HabitError> {
    let tx = conn.transaction()?;

    // `?1 IS NULL` turns the owner filter off.
    let (total, active, longest_streak): (i64, i64, u32) = tx.query_row(
        "SELECT COUNT(*), COALESCE(SUM(is_active), 0), COALESCE(MAX(longest_streak), 0) \
         FROM habits WHERE ?1 IS NULL OR owner_id = ?1",
        params![owner],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    let (total_check_ins, completed_today): (i64, i64) = tx.query_row(
        "SELECT COUNT(*), COALESCE(SUM(c.completed_at = ?2), 0) \
         FROM habit_check_ins c JOIN habits h ON h.id = c.habit_id \
         WHERE ?1 IS NULL OR h.owner_id = ?1",
        params![owner, today],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    tx.commit()?;

    Ok(HabitStats {
        total,
        active,
        completed_today,
        longest_streak,
        total_check_ins,
    })
}
