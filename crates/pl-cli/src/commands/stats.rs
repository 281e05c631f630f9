//! Stats command for range-clipped playtime per application.

use std::io::Write;

use anyhow::Result;
use pl_core::{AccountId, PlayLog, RecentStatistics, TimeRange};
use serde::Serialize;

use super::util::{format_duration, format_wall};

/// JSON output shape.
#[derive(Debug, Serialize)]
struct StatsReport {
    account: AccountId,
    range: TimeRange,
    total_playtime_secs: u64,
    total_launches: u32,
    applications: Vec<RecentStatistics>,
}

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Most played first, ties broken by application id.
fn sorted(stats: impl IntoIterator<Item = RecentStatistics>) -> Vec<RecentStatistics> {
    let mut rows: Vec<_> = stats.into_iter().collect();
    rows.sort_by(|a, b| {
        b.playtime_secs
            .cmp(&a.playtime_secs)
            .then(a.application_id.cmp(&b.application_id))
    });
    rows
}

pub fn run<W: Write>(
    writer: &mut W,
    log: &PlayLog,
    account: AccountId,
    range: TimeRange,
    json: bool,
) -> Result<()> {
    let rows = sorted(
        log.recent_statistics_for(account, range.start, range.end)
            .into_values(),
    );
    let total_playtime_secs: u64 = rows.iter().map(|r| r.playtime_secs).sum();
    let total_launches: u32 = rows.iter().map(|r| r.launch_count).sum();

    if json {
        let report = StatsReport {
            account,
            range,
            total_playtime_secs,
            total_launches,
            applications: rows,
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Playtime for account {account}")?;
    writeln!(
        writer,
        "{} to {} (UTC)",
        format_wall(range.start),
        format_wall(range.end)
    )?;
    writeln!(writer)?;

    if rows.is_empty() {
        writeln!(writer, "No play activity in range.")?;
        return Ok(());
    }

    let max = rows.first().map_or(0, |r| r.playtime_secs);
    for row in &rows {
        let launches = if row.launch_count == 1 {
            "launch"
        } else {
            "launches"
        };
        writeln!(
            writer,
            "{}  {}  {:>7}  {} {launches}",
            row.application_id,
            progress_bar(row.playtime_secs, max),
            format_duration(row.playtime_secs),
            row.launch_count
        )?;
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "Total: {} across {total_launches} launches",
        format_duration(total_playtime_secs)
    )?;

    Ok(())
}
