//! Titles command listing every application id in the play log.

use std::io::Write;

use anyhow::Result;
use pl_core::PlayLog;

pub fn run<W: Write>(writer: &mut W, log: &PlayLog, json: bool) -> Result<()> {
    let ids = log.logged_application_ids();

    if json {
        serde_json::to_writer(&mut *writer, &ids)?;
        writeln!(writer)?;
        return Ok(());
    }

    if ids.is_empty() {
        writeln!(writer, "No applications logged.")?;
        return Ok(());
    }

    for id in ids {
        writeln!(writer, "{id}")?;
    }
    Ok(())
}
