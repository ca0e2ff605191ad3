//! Day boundaries and streak periods.
//!
//! [`Calendar`] turns the injectable [`Clock`] into a calendar date in the single
//! configured zone. The free functions map a date to the period that contains it
//! (the day itself, or its ISO week) and to the period immediately before that.

use chrono::{Datelike, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use mockable::Clock;
use std::sync::Arc;

use super::types::{DateRange, Frequency};

/// Source of "today" for the streak engine.
#[derive(Clone)]
pub struct Calendar {
    zone: Tz,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl std::fmt::Debug for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calendar").field("zone", &self.zone).finish()
    }
}

impl Calendar {
    pub fn new(zone: Tz, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { zone, clock }
    }

    /// Calendar backed by the system clock.
    pub fn system(zone: Tz) -> Self {
        Self::new(zone, Arc::new(mockable::DefaultClock))
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// The current date in the configured zone.
    pub fn today(&self) -> NaiveDate {
        self.clock.utc().with_timezone(&self.zone).date_naive()
    }

    /// Time left until the next local midnight.
    pub fn until_next_day(&self) -> std::time::Duration {
        let now = self.clock.utc();
        let tomorrow = self.today() + Duration::days(1);
        let next_midnight = tomorrow
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| self.zone.from_local_datetime(&naive).earliest());

        match next_midnight {
            Some(at) => (at.with_timezone(&chrono::Utc) - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO),
            // Midnight skipped by a DST jump: try again in an hour.
            None => std::time::Duration::from_secs(3600),
        }
    }
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The period of `frequency` that contains `date`.
pub fn period_containing(frequency: Frequency, date: NaiveDate) -> DateRange {
    match frequency {
        Frequency::Daily => DateRange::day(date),
        Frequency::Weekly => {
            let start = week_start(date);
            DateRange {
                start,
                end: start + Duration::days(6),
            }
        }
    }
}

/// The period immediately before the one containing `date`:
/// yesterday for daily habits, the previous ISO week for weekly ones.
pub fn preceding_period(frequency: Frequency, date: NaiveDate) -> DateRange {
    let current = period_containing(frequency, date);
    period_containing(frequency, current.start - Duration::days(1))
}
