//! SQL DDL for all cadence tables.
//!
//! Defines the `habits`, `habit_check_ins`, and `schema_meta` tables. All DDL
//! uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements for the habit engine.
const SCHEMA_SQL: &str = r#"
-- Habit records with the cached streak projection
CREATE TABLE IF NOT EXISTS habits (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL CHECK(length(trim(name)) > 0),
    frequency TEXT NOT NULL CHECK(frequency IN ('daily','weekly')),
    current_streak INTEGER NOT NULL DEFAULT 0 CHECK(current_streak >= 0),
    longest_streak INTEGER NOT NULL DEFAULT 0 CHECK(longest_streak >= current_streak),
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_habits_owner ON habits(owner_id, created_at);
CREATE INDEX IF NOT EXISTS idx_habits_frequency ON habits(frequency);

-- Append-only check-in log, one row per habit per calendar day
CREATE TABLE IF NOT EXISTS habit_check_ins (
    id TEXT PRIMARY KEY,
    habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
    completed_at TEXT NOT NULL,
    note TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_check_ins_habit_date ON habit_check_ins(habit_id, completed_at);
CREATE INDEX IF NOT EXISTS idx_check_ins_date ON habit_check_ins(completed_at);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
