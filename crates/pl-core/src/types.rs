//! Identifier newtypes and wall-clock ranges.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing an identifier out of its hex form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseIdError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value is not a hex number that fits the identifier.
    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Generates a hex-formatted integer ID newtype with common trait implementations.
macro_rules! define_hex_id {
    (
        $(#[$meta:meta])*
        $name:ident($int:ty), $width:literal, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name($int);

        impl $name {
            /// Wraps a raw identifier value.
            pub const fn new(raw: $int) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier value.
            pub const fn get(self) -> $int {
                self.0
            }
        }

        impl From<$int> for $name {
            fn from(raw: $int) -> Self {
                Self(raw)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .unwrap_or(trimmed);
                if digits.is_empty() {
                    return Err(ParseIdError::Empty { field: $field_name });
                }
                <$int>::from_str_radix(digits, 16)
                    .map(Self)
                    .map_err(|_| ParseIdError::Invalid {
                        field: $field_name,
                        value: s.to_string(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:0width$X}", self.0, width = $width)
            }
        }
    };
}

define_hex_id!(
    /// An opaque account identifier.
    ///
    /// Account ids are supplied by the host's user subsystem and only ever
    /// compared for equality.
    AccountId(u128), 32, "account ID"
);

define_hex_id!(
    /// A 64-bit application (title) identifier.
    ApplicationId(u64), 16, "application ID"
);

/// An inclusive range of wall-clock unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: u64,
    pub end: u64,
}

impl TimeRange {
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Whether `timestamp` lies within `[start, end]`.
    pub const fn contains(&self, timestamp: u64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    /// Seconds of the span `[from, to)` that fall inside this range.
    pub fn overlap_secs(&self, from: u64, to: u64) -> u64 {
        let lo = from.max(self.start);
        let hi = to.min(self.end);
        hi.saturating_sub(lo)
    }
}
