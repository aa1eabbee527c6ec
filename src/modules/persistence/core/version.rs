// Version token shared by expected-version checks on write and upper bounds on read.
//
// Values
// - NoStream: on write, the stream must not exist yet. Never valid as a read bound.
// - Max: on read, every committed event. On write it can never match and always conflicts.
// - At(v): zero-based ordinal of the last event the caller believes is committed.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStreamVersion {
    NoStream,
    Max,
    At(u64),
}

impl EventStreamVersion {
    /// The backend state a write with this token requires. `None` means absent.
    ///
    /// `Max` yields `Err` because no stream state can ever satisfy it.
    pub fn expected_current(self) -> Result<Option<u64>, Self> {
        match self {
            Self::NoStream => Ok(None),
            Self::At(version) => Ok(Some(version)),
            Self::Max => Err(self),
        }
    }

    /// Version the stream reaches after `count` more events are appended on top of this token.
    pub fn advanced_by(self, count: usize) -> Self {
        if count == 0 {
            return self;
        }
        match self {
            Self::NoStream => Self::At(count as u64 - 1),
            Self::At(version) => Self::At(version.saturating_add(count as u64)),
            Self::Max => Self::Max,
        }
    }
}

impl From<u64> for EventStreamVersion {
    fn from(version: u64) -> Self {
        Self::At(version)
    }
}

impl fmt::Display for EventStreamVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStream => f.write_str("NoStream"),
            Self::Max => f.write_str("Max"),
            Self::At(version) => write!(f, "{version}"),
        }
    }
}
