// Backend adapter contract: what the persistence engine needs from any durable store.
//
// Purpose
// - Describe the three operations every backend must expose, without implementing them.
//
// Responsibilities
// - `append_atomic` is linearizable per stream id. Of two callers asserting the same current
//   state, at most one succeeds and the other receives `VersionMismatch`.
// - A cancelled or timed out append leaves the stream exactly as it was before the call.
//
// Boundaries
// - No retry, no backoff. Failures are reported as they happen.
//
// Testing guidance
// - Use the in memory implementation for engine tests and local development.

use crate::shared::core::event_record::EventRecord;
use crate::shared::core::primitives::StreamId;
use async_trait::async_trait;
use thiserror::Error;

pub mod in_memory;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventStoreError {
    #[error("version mismatch on {stream_id}: expected {}, actual {}", describe_state(.expected), describe_state(.actual))]
    VersionMismatch {
        stream_id: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    #[error("backend error: {0}")]
    Backend(String),
}

pub(crate) fn describe_state(state: &Option<u64>) -> String {
    match state {
        Some(version) => version.to_string(),
        None => "no stream".to_string(),
    }
}

#[async_trait]
pub trait EventStoreBackend: Send + Sync {
    /// Ordinal of the last committed event, `None` when the stream does not exist.
    async fn current_version(&self, stream_id: &StreamId) -> Result<Option<u64>, EventStoreError>;

    /// Appends `events` if the stream is still at `expected_current`. `None` means absent.
    ///
    /// Returns the new current version.
    async fn append_atomic(
        &self,
        stream_id: &StreamId,
        expected_current: Option<u64>,
        events: &[EventRecord],
    ) -> Result<u64, EventStoreError>;

    /// Committed events with ordinals in `from..=to_inclusive`, `None` when the stream does not exist.
    async fn read_range(
        &self,
        stream_id: &StreamId,
        from: u64,
        to_inclusive: u64,
    ) -> Result<Option<Vec<EventRecord>>, EventStoreError>;
}
