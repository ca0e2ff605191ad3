//! Core habit type definitions.
//!
//! Defines [`Frequency`] (the streak period), [`Habit`] (a full record with its
//! cached streak counters), [`CheckIn`] (one row of the log), and the small value
//! types passed between the log, the record store, and the streak engine.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// How often a habit is expected to be performed. Also the unit a streak is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One period per calendar day.
    Daily,
    /// One period per ISO week (Monday through Sunday).
    Weekly,
}

impl Frequency {
    pub const ALL: [Frequency; 2] = [Frequency::Daily, Frequency::Weekly];

    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            _ => Err(format!("unknown frequency: {s} (expected daily or weekly)")),
        }
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Frequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// A habit record, matching the `habits` table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    /// Principal that owns the habit. Nobody else may see or touch it.
    pub owner_id: String,
    pub name: String,
    pub frequency: Frequency,
    pub is_active: bool,
    /// Cached length of the streak ending in the current or previous period.
    pub current_streak: u32,
    /// Highest value `current_streak` has ever reached. Never decreases.
    pub longest_streak: u32,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn counters(&self) -> StreakCounters {
        StreakCounters {
            current: self.current_streak,
            longest: self.longest_streak,
        }
    }
}

/// One entry in the check-in log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: String,
    pub habit_id: String,
    /// Calendar date in the configured zone, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// The pair of cached streak counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakCounters {
    pub current: u32,
    pub longest: u32,
}

/// Owner-editable subset of a habit. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    pub is_active: Option<bool>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.frequency.is_none() && self.is_active.is_none()
    }
}

/// A habit together with whether it has a check-in for today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStatus {
    #[serde(flatten)]
    pub habit: Habit,
    pub completed: bool,
}

/// Conceptual per-habit streak state, derived from the most recent check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "streak", rename_all = "snake_case")]
pub enum StreakState {
    /// Never checked in.
    Fresh,
    /// Most recent check-in is in the current or the immediately preceding period.
    Live(u32),
    /// Most recent check-in is older than the preceding period; the next
    /// check-in starts over at 1.
    Stale(u32),
}

/// Inclusive `[start, end]` date window over the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start > end {
            return Err(format!("start {start} is after end {end}"));
        }
        Ok(Self { start, end })
    }

    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
