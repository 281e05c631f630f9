//! Sessions command listing reconstructed play sessions.

use std::io::Write;

use anyhow::Result;
use pl_core::{AccountId, ApplicationId, PlayLog, Session};

use super::util::{format_duration, format_wall};

/// Renders one session as a table row.
fn format_row(session: &Session) -> String {
    let end = if session.is_open() {
        "-".to_string()
    } else {
        format_wall(session.end_timestamp)
    };
    format!(
        "{:<16}  {:<16}  {:>7}  {}",
        format_wall(session.start_timestamp),
        end,
        format_duration(session.playtime_secs),
        session.status
    )
}

pub fn run<W: Write>(
    writer: &mut W,
    log: &PlayLog,
    application_id: ApplicationId,
    account: AccountId,
    json: bool,
) -> Result<()> {
    let sessions = log.sessions_for(application_id, account);
    tracing::debug!(
        application = %application_id,
        account = %account,
        count = sessions.len(),
        "reconstructed sessions"
    );

    if json {
        serde_json::to_writer_pretty(&mut *writer, &sessions)?;
        writeln!(writer)?;
        return Ok(());
    }

    if sessions.is_empty() {
        writeln!(
            writer,
            "No sessions for {application_id} on account {account}."
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "Sessions for {application_id}, account {account} (UTC)"
    )?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{:<16}  {:<16}  {:>7}  Status",
        "Start", "End", "Played"
    )?;
    for session in &sessions {
        writeln!(writer, "{}", format_row(session))?;
    }

    let total: u64 = sessions.iter().map(|s| s.playtime_secs).sum();
    let noun = if sessions.len() == 1 {
        "session"
    } else {
        "sessions"
    };
    writeln!(writer)?;
    writeln!(
        writer,
        "{} {noun}, {} played",
        sessions.len(),
        format_duration(total)
    )?;

    Ok(())
}
