//! Decoded play log records.

use serde::{Deserialize, Serialize};

use crate::event_type::{EventKind, SubKind};
use crate::types::{AccountId, ApplicationId};

/// One record of the play log.
///
/// Every event carries an account so it can be attributed to a user, even
/// application events. `application_id` is only meaningful for
/// [`EventKind::ApplicationLifecycle`] events and is zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Which lifecycle this record describes.
    pub kind: EventKind,
    /// The account the event is attributed to.
    pub account: AccountId,
    /// The application the event concerns.
    pub application_id: ApplicationId,
    /// The transition recorded.
    pub sub_kind: SubKind,
    /// Calendar time in unix seconds. Can jump when the user changes the clock,
    /// so it is only used to report instants.
    pub wall_timestamp: u64,
    /// Monotonic seconds. All durations are computed from this.
    pub steady_timestamp: u64,
}

impl Event {
    /// Builds an application lifecycle event.
    pub const fn application(
        account: AccountId,
        application_id: ApplicationId,
        sub_kind: SubKind,
        wall_timestamp: u64,
        steady_timestamp: u64,
    ) -> Self {
        Self {
            kind: EventKind::ApplicationLifecycle,
            account,
            application_id,
            sub_kind,
            wall_timestamp,
            steady_timestamp,
        }
    }

    /// Builds an account lifecycle event.
    pub const fn account(
        account: AccountId,
        sub_kind: SubKind,
        wall_timestamp: u64,
        steady_timestamp: u64,
    ) -> Self {
        Self {
            kind: EventKind::AccountLifecycle,
            account,
            application_id: ApplicationId::new(0),
            sub_kind,
            wall_timestamp,
            steady_timestamp,
        }
    }

    /// Returns the application id if this is an application event.
    pub fn application_id(&self) -> Option<ApplicationId> {
        match self.kind {
            EventKind::ApplicationLifecycle => Some(self.application_id),
            EventKind::AccountLifecycle => None,
        }
    }

    /// Whether this event belongs to `application_id` under `account`.
    ///
    /// Account events of the same account also match: they are part of every
    /// application's run for that account.
    pub fn concerns(&self, application_id: ApplicationId, account: AccountId) -> bool {
        self.account == account
            && match self.kind {
                EventKind::ApplicationLifecycle => self.application_id == application_id,
                EventKind::AccountLifecycle => true,
            }
    }
}
