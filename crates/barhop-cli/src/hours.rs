//! `hours` command: open/closed status for every seeded bar.

use std::path::Path;

use barhop_core::{NewBar, OpenStatus};
use chrono::NaiveDateTime;

/// One output line per bar: name padded to the longest name, then the
/// status message.
pub(crate) fn status_lines(bars: &[NewBar], now: &NaiveDateTime) -> Vec<String> {
    let width = bars.iter().map(|b| b.name.chars().count()).max().unwrap_or(0);
    bars.iter()
        .map(|bar| {
            let status = OpenStatus::evaluate(bar.hours.as_ref(), now);
            format!("{:<width$}  {}", bar.name, status.message)
        })
        .collect()
}

/// # Errors
///
/// Returns an error if the seed file cannot be loaded.
pub(crate) fn run_hours(seed_path: Option<&Path>, now: &NaiveDateTime) -> anyhow::Result<()> {
    let seed = barhop_core::load_seed(seed_path)?;
    tracing::debug!(bars = seed.bars.len(), at = %now, "evaluating bar hours");

    println!("Status at {}", now.format("%A %Y-%m-%d %H:%M"));
    for line in status_lines(&seed.bars, now) {
        println!("{line}");
    }
    Ok(())
}
