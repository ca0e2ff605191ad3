//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use cadence::config::CadenceConfig;
use cadence::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &CadenceConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `cadence serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path)
        .map(|m| m.len())
        .unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn)
        .context("failed to run health check")?;

    println!("Cadence Health Report");
    println!("=====================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Calendar zone:");
    println!("  Stored:          {}", report.time_zone.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", config.calendar.time_zone);
    if let Some(ref stored) = report.time_zone {
        if stored != &config.calendar.time_zone {
            println!("  WARNING: zone mismatch! Existing check-in dates use the stored zone.");
        } else {
            println!("  Status:          OK (match)");
        }
    }
    println!();
    println!("Row counts:");
    println!("  Habits:          {}", report.habit_count);
    println!("  Check-ins:       {}", report.check_in_count);
    println!();
    match report.last_rollover {
        Some(date) => println!("Last rollover:     {date}"),
        None => println!("Last rollover:     never"),
    }
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.cadence/cadence.db");
        println!("  2. Or keep a JSON copy of what is readable: cadence export > backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
