//! Play session reconstruction.
//!
//! Sessions are rebuilt on demand from the flat event sequence.
//!
//! # Algorithm Summary
//!
//! 1. Select the events of one account that concern one application (account
//!    lifecycle events of that account are kept too).
//! 2. Split the selection into runs: each run starts at a `Launch` and ends at
//!    its `Exit`, at the next `Launch`, or at the end of the log.
//! 3. Walk each run through the focus state machine, summing the steady-time
//!    length of every focus interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::event_type::SubKind;
use crate::types::{AccountId, ApplicationId, TimeRange};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Closed by its `Exit` event.
    #[default]
    Completed,
    /// Another `Launch` arrived before any `Exit`.
    Interrupted,
    /// The log ends while the session is still open, usually because the
    /// application is running right now.
    OpenAtEndOfLog,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::OpenAtEndOfLog => "open",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One focus interval, as steady-clock offsets from the session's launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSpan {
    pub start_offset_secs: u64,
    pub end_offset_secs: u64,
}

impl FocusSpan {
    pub const fn duration_secs(&self) -> u64 {
        self.end_offset_secs.saturating_sub(self.start_offset_secs)
    }
}

/// A single launch-to-exit lifetime of an application for one account.
///
/// `end_timestamp - start_timestamp` is usually larger than `playtime_secs`,
/// since time spent out of focus does not count as play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Focused time in seconds, from steady timestamps.
    pub playtime_secs: u64,
    /// Wall time of the `Launch`.
    pub start_timestamp: u64,
    /// Wall time of the `Exit`; equal to `start_timestamp` while open.
    pub end_timestamp: u64,
    #[serde(default)]
    pub status: SessionStatus,
    /// Closed focus intervals making up `playtime_secs`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus: Vec<FocusSpan>,
}

impl Session {
    /// Whether the log ended before this session exited.
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::OpenAtEndOfLog
    }

    /// Launch time as a calendar instant.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        wall_time(self.start_timestamp)
    }

    /// Exit time as a calendar instant.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        wall_time(self.end_timestamp)
    }

    /// Wall-clock seconds between launch and exit.
    pub const fn wall_span_secs(&self) -> u64 {
        self.end_timestamp.saturating_sub(self.start_timestamp)
    }
}

/// Converts wall-clock unix seconds to a UTC instant.
pub fn wall_time(secs: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)
}

/// Why a run of events stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunEnd {
    Exit,
    Superseded,
    EndOfLog,
}

/// Locates one session's events without copying them.
///
/// `start` and `len` address the selected-event index list produced by
/// [`locate_sessions`]; the first addressed event is always a `Launch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionLocator {
    pub start: usize,
    pub len: usize,
    pub end: RunEnd,
}

/// Focus tracking state while walking a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusState {
    /// No session open.
    Closed,
    /// Session open, application in the background.
    Open,
    /// Session open and focused since the given steady time.
    FocusPending { since: u64 },
}

/// Indices of the events that concern `application_id` under `account`, and
/// the session runs within them.
pub(crate) fn locate_sessions(
    events: &[Event],
    application_id: ApplicationId,
    account: AccountId,
) -> (Vec<usize>, Vec<SessionLocator>) {
    let selected: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.concerns(application_id, account))
        .map(|(i, _)| i)
        .collect();

    let mut locators = Vec::new();
    let mut open: Option<usize> = None;
    let mut skipped = 0usize;

    for (pos, &index) in selected.iter().enumerate() {
        let event = &events[index];
        let is_app = event.application_id().is_some();

        match (event.sub_kind, open) {
            (SubKind::Launch, Some(start)) if is_app => {
                tracing::warn!(
                    application = %application_id,
                    account = %account,
                    index,
                    "launch without exit; closing previous session"
                );
                locators.push(SessionLocator {
                    start,
                    len: pos - start,
                    end: RunEnd::Superseded,
                });
                open = Some(pos);
            }
            (SubKind::Launch, None) if is_app => open = Some(pos),
            (SubKind::Exit, Some(start)) if is_app => {
                locators.push(SessionLocator {
                    start,
                    len: pos - start + 1,
                    end: RunEnd::Exit,
                });
                open = None;
            }
            (_, None) => skipped += 1,
            _ => {}
        }
    }

    if let Some(start) = open {
        locators.push(SessionLocator {
            start,
            len: selected.len() - start,
            end: RunEnd::EndOfLog,
        });
    }

    if skipped > 0 {
        tracing::debug!(
            application = %application_id,
            account = %account,
            skipped,
            "ignored events outside any session"
        );
    }

    (selected, locators)
}

/// Builds the session addressed by `locator`.
pub(crate) fn extract_session(
    events: &[Event],
    selected: &[usize],
    locator: SessionLocator,
) -> Session {
    let run = &selected[locator.start..locator.start + locator.len];
    let launch = &events[run[0]];
    let origin = launch.steady_timestamp;

    let mut state = FocusState::Closed;
    let mut focus = Vec::new();

    for &index in run {
        let event = &events[index];
        let steady = event.steady_timestamp;
        state = match (state, event.sub_kind) {
            (FocusState::Closed, SubKind::Launch)
            | (FocusState::Open | FocusState::FocusPending { .. }, SubKind::GainedFocus) => {
                FocusState::FocusPending { since: steady }
            }
            (FocusState::FocusPending { since }, SubKind::LostFocus | SubKind::Exit) => {
                close_focus(origin, since, steady, &mut focus);
                if event.sub_kind == SubKind::Exit {
                    FocusState::Closed
                } else {
                    FocusState::Open
                }
            }
            (FocusState::Open, SubKind::Exit) => FocusState::Closed,
            (FocusState::Open, SubKind::LostFocus) => {
                tracing::trace!(index, "lost focus without gaining it");
                FocusState::Open
            }
            (current, _) => current,
        };
    }

    let last = &events[run[run.len() - 1]];
    let (end_timestamp, status) = match locator.end {
        RunEnd::Exit => (last.wall_timestamp, SessionStatus::Completed),
        RunEnd::Superseded => {
            if let FocusState::FocusPending { since } = state {
                close_focus(origin, since, last.steady_timestamp, &mut focus);
            }
            (last.wall_timestamp, SessionStatus::Interrupted)
        }
        RunEnd::EndOfLog => (launch.wall_timestamp, SessionStatus::OpenAtEndOfLog),
    };

    Session {
        playtime_secs: focus.iter().map(FocusSpan::duration_secs).sum(),
        start_timestamp: launch.wall_timestamp,
        end_timestamp,
        status,
        focus,
    }
}

/// Records the focus interval `[since, until)` relative to `origin`.
fn close_focus(origin: u64, since: u64, until: u64, focus: &mut Vec<FocusSpan>) {
    if until < since {
        tracing::trace!(since, until, "negative focus interval clamped to zero");
    }
    let duration = until.saturating_sub(since);
    if duration > 0 {
        let start_offset_secs = since.saturating_sub(origin);
        focus.push(FocusSpan {
            start_offset_secs,
            end_offset_secs: start_offset_secs + duration,
        });
    }
}

/// Reconstructs the sessions of `application_id` for `account`, in log order.
///
/// With a `range`, only sessions whose launch falls inside it are returned;
/// those sessions are never trimmed to the range.
pub fn reconstruct_sessions(
    events: &[Event],
    application_id: ApplicationId,
    account: AccountId,
    range: Option<TimeRange>,
) -> Vec<Session> {
    let (selected, locators) = locate_sessions(events, application_id, account);
    locators
        .into_iter()
        .map(|locator| extract_session(events, &selected, locator))
        .filter(|s| range.is_none_or(|r| r.contains(s.start_timestamp)))
        .collect()
}
