use anyhow::Result;
use serde::Serialize;

use cadence::config::CadenceConfig;
use cadence::habit::types::{CheckIn, Habit};
use cadence::habit::{checkins, store};

/// Export format: every habit and every check-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportData {
    habits: Vec<Habit>,
    check_ins: Vec<CheckIn>,
}

/// Export all habits and check-ins as JSON to stdout.
pub fn export(config: &CadenceConfig) -> Result<()> {
    let conn = cadence::db::open_database(config.resolved_db_path())?;

    let data = ExportData {
        habits: store::list_all(&conn)?,
        check_ins: checkins::list_all(&conn)?,
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!(
        "Exported {} habits and {} check-ins.",
        data.habits.len(),
        data.check_ins.len()
    );

    Ok(())
}
