//! HTTP server initialization.
//!
//! Provides [`serve`], which wires the database, the calendar, and the habit
//! service into a running axum server, and the rollover task that decays stale
//! streaks after each local midnight.

use crate::api::{self, AppState};
use crate::config::CadenceConfig;
use crate::db;
use crate::habit::{Calendar, HabitService};
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Delay past midnight before the rollover pass, so `today()` has moved on.
const ROLLOVER_GRACE: Duration = Duration::from_secs(5);

/// Shared setup: open DB, reconcile the calendar zone, build the service.
pub fn setup_service(config: &CadenceConfig) -> Result<HabitService> {
    let zone = config.time_zone()?;

    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    db::reconcile_time_zone(&conn, zone.name())?;

    let db = Arc::new(Mutex::new(conn));
    Ok(HabitService::new(db, Calendar::system(zone)))
}

/// Run the rollover pass now, then again just after every local midnight.
pub async fn rollover_loop(habits: HabitService) {
    loop {
        match habits.rollover().await {
            Ok(result) => tracing::debug!(reset = result.reset, date = %result.date, "rollover pass done"),
            Err(e) => tracing::error!(error = %e, "rollover pass failed"),
        }

        let wait = habits.calendar().until_next_day() + ROLLOVER_GRACE;
        tracing::debug!(secs = wait.as_secs(), "next rollover scheduled");
        tokio::time::sleep(wait).await;
    }
}

/// Start the HTTP server.
pub async fn serve(config: CadenceConfig) -> Result<()> {
    let bind_addr = config.bind_addr();
    let habits = setup_service(&config)?;
    tracing::info!(zone = %habits.calendar().zone(), today = %habits.today(), "calendar ready");

    let rollover = config
        .maintenance
        .rollover_enabled
        .then(|| tokio::spawn(rollover_loop(habits.clone())));

    let state = AppState::new(habits, &config.server.auth_header)?;
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "cadence listening at http://{bind_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    if let Some(task) = rollover {
        task.abort();
    }

    Ok(())
}
