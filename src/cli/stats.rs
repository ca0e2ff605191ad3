use anyhow::Result;

use cadence::config::CadenceConfig;
use cadence::habit::stats::habit_stats;

/// Display habit statistics in the terminal.
pub fn stats(config: &CadenceConfig, owner: Option<&str>) -> Result<()> {
    let (mut conn, today) = super::open(config)?;

    let stats = habit_stats(&mut conn, owner, today)?;

    println!("Habit Statistics ({})", owner.unwrap_or("all owners"));
    println!("{}", "=".repeat(40));
    println!("  Habits:              {}", stats.total);
    println!("  Active:              {}", stats.active);
    println!("  Completed {today}:  {}", stats.completed_today);
    println!("  Longest streak:      {}", stats.longest_streak);
    println!("  Check-ins recorded:  {}", stats.total_check_ins);

    Ok(())
}
