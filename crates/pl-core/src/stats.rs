//! Playtime statistics over reconstructed sessions.
//!
//! Statistics are clipped to the caller's range pro-rata: each retained focus
//! interval is anchored to wall time at `start_timestamp + offset` and only its
//! in-range part counts. Launches count when the session starts in range.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::session::{Session, reconstruct_sessions};
use crate::types::{AccountId, ApplicationId, TimeRange};

/// Playtime and launches for one application within a time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentStatistics {
    pub application_id: ApplicationId,
    /// Focused seconds inside the range.
    pub playtime_secs: u64,
    /// Sessions launched inside the range.
    pub launch_count: u32,
}

/// All-time totals for one application and account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStatistics {
    pub application_id: ApplicationId,
    pub playtime_secs: u64,
    pub launch_count: u32,
    /// Wall time of the first launch.
    pub first_played: u64,
    /// Wall time the most recent session ended (or started, if still open).
    pub last_played: u64,
}

/// Every application id that appears in an application event.
pub fn logged_application_ids(events: &[Event]) -> BTreeSet<ApplicationId> {
    events.iter().filter_map(Event::application_id).collect()
}

/// Application ids that appear in `account`'s application events.
pub fn application_ids_for(events: &[Event], account: AccountId) -> BTreeSet<ApplicationId> {
    events
        .iter()
        .filter(|e| e.account == account)
        .filter_map(Event::application_id)
        .collect()
}

/// In-range focused seconds of one session.
fn playtime_in_range(session: &Session, range: TimeRange) -> u64 {
    session
        .focus
        .iter()
        .map(|span| {
            let from = session.start_timestamp.saturating_add(span.start_offset_secs);
            let to = session.start_timestamp.saturating_add(span.end_offset_secs);
            range.overlap_secs(from, to)
        })
        .sum()
}

/// Folds sessions into range-clipped totals; `None` when nothing is in range.
fn summarize(
    application_id: ApplicationId,
    sessions: &[Session],
    range: TimeRange,
) -> Option<RecentStatistics> {
    let mut stats = RecentStatistics {
        application_id,
        playtime_secs: 0,
        launch_count: 0,
    };

    for session in sessions {
        if range.contains(session.start_timestamp) {
            stats.launch_count = stats.launch_count.saturating_add(1);
        }
        stats.playtime_secs = stats
            .playtime_secs
            .saturating_add(playtime_in_range(session, range));
    }

    (stats.launch_count > 0 || stats.playtime_secs > 0).then_some(stats)
}

/// Range-clipped statistics for every application `account` has used.
///
/// Applications without any in-range launch or playtime are omitted.
pub fn recent_statistics(
    events: &[Event],
    account: AccountId,
    range: TimeRange,
) -> BTreeMap<ApplicationId, RecentStatistics> {
    if range.start > range.end {
        tracing::debug!(start = range.start, end = range.end, "inverted statistics range");
        return BTreeMap::new();
    }

    application_ids_for(events, account)
        .into_iter()
        .filter_map(|application_id| {
            let sessions = reconstruct_sessions(events, application_id, account, None);
            summarize(application_id, &sessions, range).map(|stats| (application_id, stats))
        })
        .collect()
}

/// Range-clipped statistics for a single application.
pub fn recent_statistics_for(
    events: &[Event],
    application_id: ApplicationId,
    account: AccountId,
    range: TimeRange,
) -> Option<RecentStatistics> {
    let sessions = reconstruct_sessions(events, application_id, account, None);
    summarize(application_id, &sessions, range)
}

/// All-time statistics for one application; `None` if it was never launched.
pub fn lifetime_statistics(
    events: &[Event],
    application_id: ApplicationId,
    account: AccountId,
) -> Option<PlayStatistics> {
    let sessions = reconstruct_sessions(events, application_id, account, None);
    let first = sessions.first()?;

    let mut stats = PlayStatistics {
        application_id,
        playtime_secs: 0,
        launch_count: 0,
        first_played: first.start_timestamp,
        last_played: first.end_timestamp,
    };
    for session in &sessions {
        stats.playtime_secs = stats.playtime_secs.saturating_add(session.playtime_secs);
        stats.launch_count = stats.launch_count.saturating_add(1);
        stats.first_played = stats.first_played.min(session.start_timestamp);
        stats.last_played = stats.last_played.max(session.end_timestamp);
    }
    Some(stats)
}
