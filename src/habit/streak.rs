//! Streak engine: per-day idempotent check-ins and the cached streak counters.
//!
//! Every function here is synchronous and takes the connection directly; the
//! async [`HabitService`](super::service::HabitService) moves them onto the
//! blocking pool. [`check_in`] runs as one `BEGIN IMMEDIATE` transaction, which
//! holds the database write lock from the ownership read until the counter
//! write commits. Two requests for the same habit and day therefore serialize:
//! the loser sees the winner's row through the unique index and rolls back
//! without touching the counters.

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};

use super::calendar::{period_containing, preceding_period};
use super::checkins::{self, LogError};
use super::error::HabitError;
use super::store;
use super::types::{
    CheckIn, DateRange, Frequency, Habit, HabitStatus, StreakCounters, StreakState,
};

/// Record that the owner performed the habit on `today`.
///
/// Fails with [`HabitError::NotFound`] when the habit is missing or foreign, and
/// with [`HabitError::AlreadyCheckedIn`] when `today` already has a check-in.
/// Neither failure changes any state.
pub fn check_in(
    conn: &mut Connection,
    habit_id: &str,
    owner_id: &str,
    today: NaiveDate,
    note: Option<&str>,
) -> Result<CheckIn, HabitError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let habit = store::get_owned(&tx, habit_id, owner_id)?;

    // Must be read before the append, which would otherwise always find itself.
    let period_already_done =
        checkins::exists_in_range(&tx, habit_id, period_containing(habit.frequency, today))?;

    let check_in = checkins::append(&tx, habit_id, today, note).map_err(|e| match e {
        LogError::Duplicate => HabitError::AlreadyCheckedIn,
        LogError::Storage(e) => HabitError::Storage(e),
    })?;

    let counters = if period_already_done {
        hold(habit.counters())
    } else {
        let previous_done =
            checkins::exists_in_range(&tx, habit_id, preceding_period(habit.frequency, today))?;
        advance(habit.counters(), previous_done)
    };
    store::write_streak(&tx, habit_id, counters)?;

    tx.commit()?;

    tracing::info!(
        habit_id = %habit_id,
        owner = %owner_id,
        date = %today,
        frequency = %habit.frequency,
        current_streak = counters.current,
        longest_streak = counters.longest,
        "check-in recorded"
    );

    Ok(check_in)
}

/// Counters after the first check-in of a period.
pub fn advance(counters: StreakCounters, previous_period_done: bool) -> StreakCounters {
    let current = if previous_period_done {
        counters.current.saturating_add(1)
    } else {
        1
    };
    StreakCounters {
        current,
        longest: counters.longest.max(current),
    }
}

/// Counters after a further check-in inside an already completed weekly period.
fn hold(counters: StreakCounters) -> StreakCounters {
    let current = counters.current.max(1);
    StreakCounters {
        current,
        longest: counters.longest.max(current),
    }
}

/// Whether the habit has a check-in on `date`.
pub fn is_completed_on(
    conn: &Connection,
    habit_id: &str,
    date: NaiveDate,
) -> Result<bool, HabitError> {
    Ok(checkins::exists_in_range(conn, habit_id, DateRange::day(date))?)
}

/// One owned habit with today's completion flag.
pub fn status_for_habit(
    conn: &mut Connection,
    habit_id: &str,
    owner_id: &str,
    today: NaiveDate,
) -> Result<HabitStatus, HabitError> {
    let tx = conn.transaction()?;
    let habit = store::get_owned(&tx, habit_id, owner_id)?;
    let completed = is_completed_on(&tx, habit_id, today)?;
    tx.commit()?;
    Ok(HabitStatus { habit, completed })
}

/// All of the owner's habits, newest first, each with today's completion flag.
///
/// Both reads share one transaction so a concurrent check-in is seen either
/// entirely or not at all.
pub fn status_for_list(
    conn: &mut Connection,
    owner_id: &str,
    today: NaiveDate,
) -> Result<Vec<HabitStatus>, HabitError> {
    let tx = conn.transaction()?;
    let habits = store::list_by_owner(&tx, owner_id)?;
    let completed = checkins::completed_on(&tx, owner_id, today)?;
    tx.commit()?;

    Ok(habits
        .into_iter()
        .map(|habit| {
            let completed = completed.contains(&habit.id);
            HabitStatus { habit, completed }
        })
        .collect())
}

/// Place a habit in the `Fresh` / `Live` / `Stale` state machine.
///
/// `Live` covers a most recent check-in in the current or the immediately
/// preceding period; anything older is `Stale`, and the next check-in restarts at 1.
pub fn classify(
    frequency: Frequency,
    last_check_in: Option<NaiveDate>,
    current_streak: u32,
    today: NaiveDate,
) -> StreakState {
    match last_check_in {
        None => StreakState::Fresh,
        Some(last) if last >= preceding_period(frequency, today).start => {
            StreakState::Live(current_streak)
        }
        Some(_) => StreakState::Stale(current_streak),
    }
}

/// [`classify`] a stored habit against its log.
pub fn live_state(
    conn: &Connection,
    habit: &Habit,
    today: NaiveDate,
) -> Result<StreakState, HabitError> {
    let last = checkins::latest(conn, &habit.id)?;
    Ok(classify(habit.frequency, last, habit.current_streak, today))
}
