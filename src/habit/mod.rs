//! The habit streak and check-in engine.
//!
//! Leaves first: [`checkins`] is the append-only log, [`store`] holds habit
//! records and their cached counters, and [`streak`] composes the two under one
//! transaction per check-in. [`maintenance`] decays stale counters at day
//! rollover, [`stats`] is the read model for analytics, and [`service`] is the
//! async entry point used by the HTTP layer and the server.

pub mod calendar;
pub mod checkins;
pub mod error;
pub mod maintenance;
pub mod service;
pub mod stats;
pub mod store;
pub mod streak;
pub mod types;

pub use calendar::Calendar;
pub use error::HabitError;
pub use service::HabitService;
