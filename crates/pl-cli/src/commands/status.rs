//! Status command summarising the loaded play log.

use std::io::Write;

use anyhow::Result;
use pl_core::PlayLog;

use crate::Config;

use super::util::format_wall;

pub fn run<W: Write>(writer: &mut W, config: &Config, log: &PlayLog) -> Result<()> {
    writeln!(writer, "Play log status")?;
    writeln!(writer, "Log: {}", config.log_path.display())?;

    if log.is_empty() {
        writeln!(writer, "No events recorded.")?;
        return Ok(());
    }

    let events = log.events();
    writeln!(writer, "Events: {}", events.len())?;
    writeln!(
        writer,
        "Applications: {}",
        log.logged_application_ids().len()
    )?;
    if let (Some(first), Some(last)) = (events.first(), events.last()) {
        writeln!(
            writer,
            "Span: {} to {} (UTC)",
            format_wall(first.wall_timestamp),
            format_wall(last.wall_timestamp)
        )?;
    }

    Ok(())
}
