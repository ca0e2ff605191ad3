//! Async facade over the habit engine.
//!
//! [`HabitService`] owns the shared connection and the [`Calendar`]. Each call
//! resolves "today" once, then runs the synchronous core on tokio's blocking
//! pool. Transient storage errors (`SQLITE_BUSY`, `SQLITE_LOCKED`) re-run the
//! whole unit of work a bounded number of times; anything else is returned as is.

use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::calendar::Calendar;
use super::error::HabitError;
use super::maintenance::{self, RolloverResult};
use super::stats::{self, HabitStats};
use super::types::{CheckIn, DateRange, Frequency, Habit, HabitPatch, HabitStatus};
use super::{checkins, store, streak};

const MAX_RETRIES: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

#[derive(Clone, Debug)]
pub struct HabitService {
    db: Arc<Mutex<Connection>>,
    calendar: Calendar,
}

impl HabitService {
    pub fn new(db: Arc<Mutex<Connection>>, calendar: Calendar) -> Self {
        Self { db, calendar }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.today()
    }

    /// Run `f` against the connection on the blocking pool, retrying transient failures.
    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T, HabitError>
    where
        F: Fn(&mut Connection) -> Result<T, HabitError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || -> Result<T, HabitError> {
            let mut retries = 0;
            loop {
                let result = {
                    let mut conn = db
                        .lock()
                        .map_err(|e| HabitError::Internal(format!("db lock poisoned: {e}")))?;
                    f(&mut *conn)
                };
                match result {
                    Err(err) if err.is_transient() && retries < MAX_RETRIES => {
                        retries += 1;
                        tracing::warn!(op, retries, error = %err, "transient storage error, retrying");
                        std::thread::sleep(RETRY_BACKOFF * retries);
                    }
                    other => return other,
                }
            }
        })
        .await
        .map_err(|e| HabitError::Internal(format!("{op} task failed: {e}")))?
    }

    pub async fn create_habit(
        &self,
        owner_id: &str,
        name: &str,
        frequency: Frequency,
    ) -> Result<Habit, HabitError> {
        let owner_id = owner_id.to_string();
        let name = name.to_string();
        let habit = self
            .run("create_habit", move |conn| {
                store::create(conn, &owner_id, &name, frequency)
            })
            .await?;

        tracing::info!(habit_id = %habit.id, owner = %habit.owner_id, frequency = %habit.frequency, "habit created");
        Ok(habit)
    }

    /// One owned habit with today's completion flag.
    pub async fn get_habit(&self, habit_id: &str, owner_id: &str) -> Result<HabitStatus, HabitError> {
        let (habit_id, owner_id) = (habit_id.to_string(), owner_id.to_string());
        let today = self.today();
        self.run("get_habit", move |conn| {
            streak::status_for_habit(conn, &habit_id, &owner_id, today)
        })
        .await
    }

    pub async fn status_for_list(&self, owner_id: &str) -> Result<Vec<HabitStatus>, HabitError> {
        let owner_id = owner_id.to_string();
        let today = self.today();
        self.run("status_for_list", move |conn| {
            streak::status_for_list(conn, &owner_id, today)
        })
        .await
    }

    pub async fn update_habit(
        &self,
        habit_id: &str,
        owner_id: &str,
        patch: HabitPatch,
    ) -> Result<Habit, HabitError> {
        let (habit_id, owner_id) = (habit_id.to_string(), owner_id.to_string());
        self.run("update_habit", move |conn| {
            store::update_owned(conn, &habit_id, &owner_id, &patch)
        })
        .await
    }

    /// Delete an owned habit and its log. Returns the number of check-ins removed.
    pub async fn delete_habit(&self, habit_id: &str, owner_id: &str) -> Result<usize, HabitError> {
        let (habit_id, owner_id) = (habit_id.to_string(), owner_id.to_string());
        self.run("delete_habit", move |conn| {
            store::delete_owned(conn, &habit_id, &owner_id)
        })
        .await
    }

    pub async fn check_in(
        &self,
        habit_id: &str,
        owner_id: &str,
        note: Option<String>,
    ) -> Result<CheckIn, HabitError> {
        let (habit_id, owner_id) = (habit_id.to_string(), owner_id.to_string());
        let today = self.today();
        self.run("check_in", move |conn| {
            streak::check_in(conn, &habit_id, &owner_id, today, note.as_deref())
        })
        .await
    }

    pub async fn is_completed_today(&self, habit_id: &str, owner_id: &str) -> Result<bool, HabitError> {
        Ok(self.get_habit(habit_id, owner_id).await?.completed)
    }

    /// The owner's check-ins for one habit, newest first.
    pub async fn check_ins(
        &self,
        habit_id: &str,
        owner_id: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<CheckIn>, HabitError> {
        let (habit_id, owner_id) = (habit_id.to_string(), owner_id.to_string());
        self.run("check_ins", move |conn| {
            let tx = conn.transaction()?;
            store::get_owned(&tx, &habit_id, &owner_id)?;
            let rows = checkins::list_by_habit(&tx, &habit_id, range)?;
            tx.commit()?;
            Ok(rows)
        })
        .await
    }

    pub async fn stats(&self, owner_id: Option<&str>) -> Result<HabitStats, HabitError> {
        let owner_id = owner_id.map(str::to_string);
        let today = self.today();
        self.run("stats", move |conn| {
            stats::habit_stats(conn, owner_id.as_deref(), today)
        })
        .await
    }

    /// Run the day-rollover pass for today.
    pub async fn rollover(&self) -> Result<RolloverResult, HabitError> {
        let today = self.today();
        self.run("rollover", move |conn| maintenance::rollover(conn, today))
            .await
    }
}
