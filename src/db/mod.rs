pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// How long a connection waits on a locked database before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open (or create) the cadence database at the given path with the schema
/// initialized and migrations applied.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    conn.busy_timeout(BUSY_TIMEOUT)?;
    // WAL lets list reads proceed while a check-in transaction is open
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // ON DELETE CASCADE from habits to habit_check_ins depends on this
    conn.pragma_update(None, "foreign_keys", "ON")?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&mut conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open a fresh in-memory database with schema and migrations applied.
pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&mut conn).context("failed to run migrations")?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub schema_version: u32,
    pub time_zone: Option<String>,
    pub last_rollover: Option<NaiveDate>,
    pub habit_count: i64,
    pub check_in_count: i64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Collect schema metadata, row counts, and the result of `PRAGMA integrity_check`.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;
    let time_zone = migrations::get_time_zone(conn)?;
    let last_rollover = migrations::get_last_rollover(conn)?;

    let habit_count: i64 = conn.query_row("SELECT COUNT(*) FROM habits", [], |row| row.get(0))?;
    let check_in_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM habit_check_ins", [], |row| row.get(0))?;

    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    Ok(HealthReport {
        schema_version,
        time_zone,
        last_rollover,
        habit_count,
        check_in_count,
        integrity_ok: integrity_details == "ok",
        integrity_details,
    })
}

/// Reconcile the zone recorded in the database with the configured one.
///
/// A database without check-ins adopts the configured zone. Otherwise the
/// recorded dates stay as they are and a mismatch is only reported.
pub fn reconcile_time_zone(conn: &Connection, configured: &str) -> Result<()> {
    let stored = migrations::get_time_zone(conn)?;
    if stored.as_deref() == Some(configured) {
        return Ok(());
    }

    let check_ins: i64 =
        conn.query_row("SELECT COUNT(*) FROM habit_check_ins", [], |row| row.get(0))?;
    if check_ins == 0 {
        migrations::set_time_zone(conn, configured)?;
        tracing::info!(zone = configured, "recorded calendar zone");
    } else {
        tracing::warn!(
            stored = stored.as_deref().unwrap_or("(unset)"),
            configured,
            "calendar zone changed; existing check-in dates were recorded under the stored zone"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_report_on_fresh_db() {
        let conn = open_in_memory().unwrap();
        let report = check_database_health(&conn).unwrap();
        assert!(report.integrity_ok);
        assert_eq!(report.schema_version, migrations::CURRENT_SCHEMA_VERSION);
        assert_eq!(report.time_zone.as_deref(), Some("UTC"));
        assert_eq!(report.habit_count, 0);
        assert_eq!(report.check_in_count, 0);
        assert!(report.last_rollover.is_none());
    }

    #[test]
    fn empty_db_adopts_configured_zone() {
        let conn = open_in_memory().unwrap();
        reconcile_time_zone(&conn, "Europe/Paris").unwrap();
        assert_eq!(
            migrations::get_time_zone(&conn).unwrap().as_deref(),
            Some("Europe/Paris")
        );
    }

    #[test]
    fn populated_db_keeps_recorded_zone() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO habits (id, owner_id, name, frequency, created_at) \
               VALUES ('h1', 'alice', 'Read', 'daily', '2025-01-10 00:00:00+00:00');
             INSERT INTO habit_check_ins (id, habit_id, completed_at) VALUES ('c1', 'h1', '2025-01-10');",
        )
        .unwrap();

        reconcile_time_zone(&conn, "Europe/Paris").unwrap();
        assert_eq!(
            migrations::get_time_zone(&conn).unwrap().as_deref(),
            Some("UTC")
        );
    }
}
