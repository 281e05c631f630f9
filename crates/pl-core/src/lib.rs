//! Core logic for reading console play logs.
//!
//! This crate contains the fundamental types and logic for:
//! - Loading: decoding the binary play event log into [`Event`]s
//! - Session reconstruction: turning launch/exit/focus events into [`Session`]s
//! - Statistics: range-clipped playtime and launch counts per application
//!
//! [`PlayLog`] ties these together behind a query API.

pub mod event;
pub mod event_type;
pub mod loader;
mod play_log;
pub mod session;
pub mod stats;
pub mod types;

pub use event::Event;
pub use event_type::{EventKind, SubKind};
pub use loader::{CorruptReason, LoadError, LoadOptions};
pub use play_log::PlayLog;
pub use session::{FocusSpan, Session, SessionStatus};
pub use stats::{PlayStatistics, RecentStatistics};
pub use types::{AccountId, ApplicationId, ParseIdError, TimeRange};
