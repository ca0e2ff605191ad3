//! Administrative commands run against the database directly, without the HTTP server.

pub mod doctor;
pub mod export;
pub mod inspect;
pub mod rollover;
pub mod stats;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

use cadence::config::CadenceConfig;
use cadence::db;
use cadence::habit::Calendar;

/// Open the configured database and compute "today" in the configured zone.
fn open(config: &CadenceConfig) -> Result<(Connection, NaiveDate)> {
    let today = Calendar::system(config.time_zone()?).today();
    let conn = db::open_database(config.resolved_db_path())?;
    Ok((conn, today))
}
