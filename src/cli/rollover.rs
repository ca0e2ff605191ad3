//! CLI `rollover` command: reset streaks that lapsed without waiting for the server.

use anyhow::Result;
use chrono::NaiveDate;

use cadence::config::CadenceConfig;
use cadence::habit::maintenance;

/// Run the day-rollover pass for `date` (default: today in the configured zone).
pub fn rollover(config: &CadenceConfig, date: Option<NaiveDate>) -> Result<()> {
    let (mut conn, today) = super::open(config)?;
    let date = date.unwrap_or(today);

    println!("Running streak rollover for {date}...");
    let result = maintenance::rollover(&mut conn, date)?;

    if result.reset > 0 {
        println!("  Reset {} lapsed streaks:", result.reset);
        for (frequency, count) in &result.by_frequency {
            if *count > 0 {
                println!("    {frequency}: {count}");
            }
        }
    } else {
        println!("  No lapsed streaks.");
    }

    println!("Rollover complete.");
    Ok(())
}
