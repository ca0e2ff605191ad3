//! Habit streaks and daily check-ins over HTTP.
//!
//! Cadence tracks habits for authenticated principals. Each habit has a
//! frequency, and its streak counts consecutive periods (days or ISO weeks)
//! that hold at least one check-in:
//!
//! | Frequency | Period | Streak continues when |
//! |-----------|--------|-----------------------|
//! | **daily** | Calendar day | Yesterday was checked in |
//! | **weekly** | ISO week (Mon-Sun) | Last week was checked in |
//!
//! A habit gets at most one check-in per calendar day, where "today" is taken
//! in a single configured zone. The streak counters are a cache of the check-in
//! log, updated in the same transaction as the check-in itself, and reset once a
//! period lapses by a rollover pass that runs after each local midnight.
//!
//! # Architecture
//!
//! - **Storage**: SQLite (WAL) with a unique `(habit_id, completed_at)` index
//! - **Concurrency**: one `BEGIN IMMEDIATE` transaction per check-in
//! - **Transport**: JSON over HTTP via axum
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, migrations, and health checks
//! - [`habit`]: Core engine: check-in log, habit store, streaks, rollover, stats
//! - [`api`]: HTTP routes, principal extraction, and error responses
//! - [`server`]: Startup wiring and the scheduled rollover task

pub mod api;
pub mod config;
pub mod db;
pub mod habit;
pub mod server;
