//! Event kind enums and their wire tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which lifecycle a log record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ApplicationLifecycle,
    AccountLifecycle,
}

impl EventKind {
    /// Decodes the record kind tag.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::ApplicationLifecycle),
            1 => Some(Self::AccountLifecycle),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationLifecycle => "application",
            Self::AccountLifecycle => "account",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The specific transition recorded by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubKind {
    Launch,
    Exit,
    GainedFocus,
    LostFocus,
    AccountActive,
    AccountInactive,
}

impl SubKind {
    /// Decodes the record sub-kind tag.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Launch),
            1 => Some(Self::Exit),
            2 => Some(Self::GainedFocus),
            3 => Some(Self::LostFocus),
            4 => Some(Self::AccountActive),
            5 => Some(Self::AccountInactive),
            _ => None,
        }
    }

    /// The record kind this sub-kind is valid for.
    pub const fn kind(self) -> EventKind {
        match self {
            Self::Launch | Self::Exit | Self::GainedFocus | Self::LostFocus => {
                EventKind::ApplicationLifecycle
            }
            Self::AccountActive | Self::AccountInactive => EventKind::AccountLifecycle,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Exit => "exit",
            Self::GainedFocus => "gained_focus",
            Self::LostFocus => "lost_focus",
            Self::AccountActive => "account_active",
            Self::AccountInactive => "account_inactive",
        }
    }
}

impl fmt::Display for SubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
