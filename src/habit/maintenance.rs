use chrono::NaiveDate;
use rusqlite::{params, Connection, TransactionBehavior};
use serde::Serialize;
use std::collections::BTreeMap;

use super::calendar::preceding_period;
use super::error::HabitError;
use super::types::Frequency;
use crate::db::migrations;

#[derive(Debug, Serialize)]
pub struct RolloverResult {
    pub date: NaiveDate,
    pub reset: usize,
    pub by_frequency: BTreeMap<String, usize>,
}

/// Day-rollover pass: zero `current_streak` on every habit whose most recent
/// check-in is older than the period preceding `today`'s.
///
/// Such a habit is `Stale`; its next check-in restarts at 1 regardless, so the
/// reset only brings the cached counter in line with the log. `longest_streak`
/// is left alone. Idempotent for a given `today`.
pub fn rollover(conn: &mut Connection, today: NaiveDate) -> Result<RolloverResult, HabitError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut by_frequency = BTreeMap::new();

    for frequency in Frequency::ALL {
        let cutoff = preceding_period(frequency, today).start;
        let reset = tx.execute(
            "UPDATE habits SET current_streak = 0 \
             WHERE frequency = ?1 AND current_streak > 0 \
               AND NOT EXISTS (SELECT 1 FROM habit_check_ins c \
                               WHERE c.habit_id = habits.id AND c.completed_at >= ?2)",
            params![frequency, cutoff],
        )?;
        by_frequency.insert(frequency.to_string(), reset);
    }

    migrations::set_last_rollover(&tx, today)?;
    tx.commit()?;

    let reset = by_frequency.values().sum();
    tracing::info!(date = %today, reset, "streak rollover complete");

    Ok(RolloverResult {
        date: today,
        reset,
        by_frequency,
    })
}
