//! CLI `inspect` command: full details for a single habit.

use anyhow::{Context, Result};

use cadence::config::CadenceConfig;
use cadence::habit::types::StreakState;
use cadence::habit::{checkins, store, streak};

const RECENT_CHECK_INS: usize = 10;

/// Inspect a single habit by ID, regardless of owner.
pub fn inspect(config: &CadenceConfig, id: &str) -> Result<()> {
    let (conn, today) = super::open(config)?;

    let habit = store::get(&conn, id)?.with_context(|| format!("habit not found: {id}"))?;
    let state = streak::live_state(&conn, &habit, today)?;
    let check_ins = checkins::list_by_habit(&conn, id, None)?;

    println!("Habit: {}", habit.id);
    println!("{}", "=".repeat(50));
    println!("  Name:           {}", habit.name);
    println!("  Owner:          {}", habit.owner_id);
    println!("  Frequency:      {}", habit.frequency);
    println!("  Active:         {}", habit.is_active);
    println!("  Created:        {}", habit.created_at.to_rfc3339());
    println!("  Current streak: {}", habit.current_streak);
    println!("  Longest streak: {}", habit.longest_streak);
    let state = match state {
        StreakState::Fresh => "fresh (never checked in)".to_string(),
        StreakState::Live(n) => format!("live ({n})"),
        StreakState::Stale(n) => format!("stale ({n}, next check-in restarts at 1)"),
    };
    println!("  State on {today}: {state}");

    println!();
    if check_ins.is_empty() {
        println!("No check-ins.");
    } else {
        println!("Check-ins ({} total, newest first):", check_ins.len());
        for c in check_ins.iter().take(RECENT_CHECK_INS) {
            match &c.note {
                Some(note) => println!("  {}  {note}", c.date),
                None => println!("  {}", c.date),
            }
        }
    }

    Ok(())
}
