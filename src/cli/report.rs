use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use crate::{report::generate, storage::interval_store::IntervalStore};

/// Command to process `report`. Prints one line per application per day, days
/// ascending, with the most used application first within each day.
///
/// Grouping uses the machine's local timezone, matching the convention under
/// which the intervals were recorded.
pub async fn process_report_command(data_dir: PathBuf) -> Result<()> {
    let store = IntervalStore::new(data_dir)?;

    let report = generate(&store, &Local)
        .await
        .context("Failed to generate the daily report")?;

    println!("Daily Report:");
    for row in report {
        println!(
            "Date: {}, App: {}, Total Duration: {} seconds",
            row.date.format("%Y-%m-%d"),
            row.app_name,
            row.total_seconds
        );
    }
    Ok(())
}
