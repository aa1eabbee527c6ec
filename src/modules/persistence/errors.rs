// Failures surfaced by the persistence engine.
//
// - ConcurrencyConflict: the expected version did not match the backend at flush time. Reload,
//   reapply the business logic, then save and flush again.
// - VersionOutOfRange: a load bound beyond the committed history, or the write-only NoStream.
// - BackendUnavailable: the backend failed. Reported verbatim, never retried here.

use crate::modules::persistence::core::version::EventStreamVersion;
use crate::shared::infrastructure::event_store::{EventStoreError, describe_state};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("concurrency conflict on {stream_id}: expected version {expected}, actual {}", describe_state(.actual))]
    ConcurrencyConflict {
        stream_id: String,
        expected: EventStreamVersion,
        actual: Option<u64>,
    },

    #[error("version {requested} is out of range for {stream_id}")]
    VersionOutOfRange {
        stream_id: String,
        requested: EventStreamVersion,
        current: Option<u64>,
    },

    #[error(transparent)]
    BackendUnavailable(#[from] EventStoreError),
}
