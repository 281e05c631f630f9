//! Query entry point over a loaded play log.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use crate::event::Event;
use crate::loader::{self, LoadError, LoadOptions};
use crate::session::{Session, reconstruct_sessions};
use crate::stats::{self, PlayStatistics, RecentStatistics};
use crate::types::{AccountId, ApplicationId, TimeRange};

/// An immutable, loaded play log.
///
/// Every query rescans the event sequence; nothing derived is cached. The
/// sequence is shared behind an [`Arc`], so [`PlayLog::snapshot`] is cheap and
/// a reload never disturbs readers holding an older snapshot.
#[derive(Debug, Clone, Default)]
pub struct PlayLog {
    events: Arc<[Event]>,
}

impl PlayLog {
    /// Wraps already-decoded events, which must be in log order.
    pub fn from_events(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Decodes a log held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        Ok(Self::from_events(loader::decode(bytes)?))
    }

    /// Loads a log file.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        Self::open_with(path, &LoadOptions::default())
    }

    /// Loads a log file, honouring `options`.
    pub fn open_with(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
        Ok(Self::from_events(loader::load_file(path, options)?))
    }

    /// Replaces the log with freshly decoded bytes.
    ///
    /// On failure the current log is kept.
    pub fn reload_from_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        *self = Self::from_bytes(bytes)?;
        Ok(())
    }

    /// Replaces the log with the contents of `path`.
    ///
    /// On failure the current log is kept.
    pub fn reload_from_file(&mut self, path: &Path, options: &LoadOptions) -> Result<(), LoadError> {
        *self = Self::open_with(path, options)?;
        Ok(())
    }

    /// A shared handle to the current event sequence.
    pub fn snapshot(&self) -> Arc<[Event]> {
        Arc::clone(&self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every application id in the log, for any account.
    pub fn logged_application_ids(&self) -> BTreeSet<ApplicationId> {
        stats::logged_application_ids(&self.events)
    }

    /// All sessions of `application_id` for `account`, in log order.
    pub fn sessions_for(&self, application_id: ApplicationId, account: AccountId) -> Vec<Session> {
        reconstruct_sessions(&self.events, application_id, account, None)
    }

    /// Sessions launched within `[start, end]`.
    pub fn sessions_in_range(
        &self,
        application_id: ApplicationId,
        account: AccountId,
        start: u64,
        end: u64,
    ) -> Vec<Session> {
        reconstruct_sessions(
            &self.events,
            application_id,
            account,
            Some(TimeRange::new(start, end)),
        )
    }

    /// Per-application playtime and launches for `account` within `[start, end]`.
    pub fn recent_statistics_for(
        &self,
        account: AccountId,
        start: u64,
        end: u64,
    ) -> BTreeMap<ApplicationId, RecentStatistics> {
        stats::recent_statistics(&self.events, account, TimeRange::new(start, end))
    }

    /// Playtime and launches of one application within `[start, end]`.
    pub fn recent_statistics_for_application(
        &self,
        application_id: ApplicationId,
        account: AccountId,
        start: u64,
        end: u64,
    ) -> Option<RecentStatistics> {
        stats::recent_statistics_for(
            &self.events,
            application_id,
            account,
            TimeRange::new(start, end),
        )
    }

    /// All-time totals for one application.
    pub fn lifetime_statistics(
        &self,
        application_id: ApplicationId,
        account: AccountId,
    ) -> Option<PlayStatistics> {
        stats::lifetime_statistics(&self.events, application_id, account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_type::SubKind;
    use crate::loader::testing::encode;
    use crate::session::SessionStatus;

    const ALICE: AccountId = AccountId::new(0xA11CE);
    const BOB: AccountId = AccountId::new(0xB0B);
    const GAME: ApplicationId = ApplicationId::new(0x0100_0000_0000_1000);
    const OTHER: ApplicationId = ApplicationId::new(0x0100_0000_0000_2000);

    fn scenario_events() -> Vec<Event> {
        vec![
            Event::account(ALICE, SubKind::AccountActive, 990, 990),
            Event::application(ALICE, GAME, SubKind::Launch, 1000, 1000),
            Event::application(ALICE, GAME, SubKind::GainedFocus, 1000, 1000),
            Event::application(ALICE, GAME, SubKind::LostFocus, 1500, 1500),
            Event::application(ALICE, GAME, SubKind::Exit, 1600, 1600),
            Event::application(BOB, OTHER, SubKind::Launch, 1700, 1700),
        ]
    }

    #[test]
    fn queries_over_decoded_bytes() {
        let log = PlayLog::from_bytes(&encode(&scenario_events())).unwrap();
        assert_eq!(log.len(), 6);

        let sessions = log.sessions_for(GAME, ALICE);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].playtime_secs, 500);
        assert_eq!(sessions[0].start_timestamp, 1000);
        assert_eq!(sessions[0].end_timestamp, 1600);

        let bob = log.sessions_for(OTHER, BOB);
        assert_eq!(bob[0].status, SessionStatus::OpenAtEndOfLog);

        assert_eq!(
            log.logged_application_ids().into_iter().collect::<Vec<_>>(),
            vec![GAME, OTHER]
        );
    }

    #[test]
    fn empty_log_answers_every_query_with_nothing() {
        let log = PlayLog::from_bytes(&[]).unwrap();
        assert!(log.is_empty());
        assert!(log.logged_application_ids().is_empty());
        assert!(log.sessions_for(GAME, ALICE).is_empty());
        assert!(log.recent_statistics_for(ALICE, 0, u64::MAX).is_empty());
        assert_eq!(log.lifetime_statistics(GAME, ALICE), None);
    }

    #[test]
    fn sessions_in_range_filters_by_launch() {
        let log = PlayLog::from_events(scenario_events());
        assert_eq!(log.sessions_in_range(GAME, ALICE, 0, 999).len(), 0);
        assert_eq!(log.sessions_in_range(GAME, ALICE, 1000, 1000).len(), 1);
    }

    #[test]
    fn statistics_delegate_to_aggregator() {
        let log = PlayLog::from_events(scenario_events());

        let stats = log.recent_statistics_for(ALICE, 0, 2000);
        assert_eq!(stats[&GAME].playtime_secs, 500);
        assert_eq!(stats[&GAME].launch_count, 1);

        let single = log
            .recent_statistics_for_application(GAME, ALICE, 1200, 2000)
            .unwrap();
        assert_eq!(single.playtime_secs, 300);
        assert_eq!(single.launch_count, 0);

        let lifetime = log.lifetime_statistics(GAME, ALICE).unwrap();
        assert_eq!(lifetime.launch_count, 1);
    }

    #[test]
    fn reloading_unchanged_log_is_idempotent() {
        let bytes = encode(&scenario_events());
        let mut log = PlayLog::from_bytes(&bytes).unwrap();
        let before = serde_json::to_string(&(
            log.logged_application_ids(),
            log.sessions_for(GAME, ALICE),
            log.recent_statistics_for(ALICE, 0, 5000),
        ))
        .unwrap();

        log.reload_from_bytes(&bytes).unwrap();
        let after = serde_json::to_string(&(
            log.logged_application_ids(),
            log.sessions_for(GAME, ALICE),
            log.recent_statistics_for(ALICE, 0, 5000),
        ))
        .unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn snapshot_survives_reload() {
        let mut log = PlayLog::from_events(scenario_events());
        let snapshot = log.snapshot();

        log.reload_from_bytes(&encode(&[])).unwrap();

        assert!(log.is_empty());
        assert_eq!(snapshot.len(), 6);
        assert_eq!(reconstruct_sessions(&snapshot, GAME, ALICE, None).len(), 1);
    }

    #[test]
    fn failed_reload_keeps_current_log() {
        let mut log = PlayLog::from_events(scenario_events());
        let mut bytes = encode(&scenario_events());
        bytes.truncate(bytes.len() - 1);

        let err = log.reload_from_bytes(&bytes).unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(log.len(), 6);
    }

    #[test]
    fn reload_from_file_replaces_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PlayEvent.dat");
        std::fs::write(&path, encode(&scenario_events()[..2])).unwrap();

        let mut log = PlayLog::open(&path).unwrap();
        assert_eq!(log.len(), 2);

        std::fs::write(&path, encode(&scenario_events())).unwrap();
        log.reload_from_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(log.len(), 6);
    }

    #[test]
    fn play_log_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PlayLog>();
    }
}
