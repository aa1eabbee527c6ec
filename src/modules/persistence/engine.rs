// Persistence engine: stage events with `save`, commit them with `flush`, replay them with `load`.
//
// Purpose
// - Give one caller a unit of work over a backend: writes stay invisible until flushed, and
//   concurrent writers to one stream are detected with an optimistic version check.
//
// Responsibilities
// - save: pure in memory staging, no check, no input or output.
// - flush: one atomic append per staged stream, in ascending stream id order.
// - load: version bounded replay, with absent streams reported as `None`.
//
// Flush with several streams
// - Streams commit independently. Streams committed before a conflict stay committed.
// - The conflicting stream's staged events are discarded, since the caller has to reload anyway.
// - Streams not attempted yet stay staged and go out with the next flush.
// - A backend failure discards everything still staged.
//
// Boundaries
// - No retries. Retry policy belongs to the caller or to the backend adapter.

use crate::modules::persistence::core::commit_log::{CommitLog, StagedStream};
use crate::modules::persistence::core::event_stream::EventStream;
use crate::modules::persistence::core::version::EventStreamVersion;
use crate::modules::persistence::errors::PersistenceError;
use crate::shared::core::event_record::EventData;
use crate::shared::core::primitives::StreamId;
use crate::shared::infrastructure::event_store::{EventStoreBackend, EventStoreError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Upper bound for a single backend call. Expiry is reported as `BackendUnavailable`.
    pub backend_timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedStream {
    pub stream_id: StreamId,
    pub version: u64,
    pub event_count: usize,
}

pub struct PersistenceEngine<TBackend>
where
    TBackend: EventStoreBackend + ?Sized + 'static,
{
    backend: Arc<TBackend>,
    options: EngineOptions,
    commit_log: CommitLog,
}

impl<TBackend> PersistenceEngine<TBackend>
where
    TBackend: EventStoreBackend + ?Sized + 'static,
{
    pub fn new(backend: Arc<TBackend>) -> Self {
        Self::with_options(backend, EngineOptions::default())
    }

    pub fn with_options(backend: Arc<TBackend>, options: EngineOptions) -> Self {
        Self {
            backend,
            options,
            commit_log: CommitLog::new(),
        }
    }

    pub fn save(
        &mut self,
        stream_id: &StreamId,
        expected_version: EventStreamVersion,
        events: impl IntoIterator<Item = EventData>,
    ) {
        let events: Vec<EventData> = events.into_iter().collect();
        tracing::debug!(%stream_id, %expected_version, count = events.len(), "staging events");
        self.commit_log.stage(stream_id, expected_version, events);
    }

    pub fn has_pending(&self) -> bool {
        !self.commit_log.is_empty()
    }

    pub fn pending(&self, stream_id: &StreamId) -> Option<&StagedStream> {
        self.commit_log.staged(stream_id)
    }

    pub async fn flush(&mut self) -> Result<Vec<CommittedStream>, PersistenceError> {
        let mut committed = Vec::new();
        while let Some((stream_id, staged)) = self.commit_log.pop_first() {
            let expected = staged.expected_version;
            let event_count = staged.events.len();

            let Some((expected_current, first)) = append_position(expected, event_count) else {
                let current = self
                    .call("current_version", self.backend.current_version(&stream_id))
                    .await;
                return match current {
                    Ok(actual) => Err(conflict(&stream_id, expected, actual, event_count)),
                    Err(error) => Err(self.abandon(error)),
                };
            };

            let records = staged.into_records(&stream_id, first);
            let appended = self
                .call(
                    "append_atomic",
                    self.backend
                        .append_atomic(&stream_id, expected_current, &records),
                )
                .await;
            match appended {
                Ok(version) => {
                    tracing::info!(%stream_id, version, event_count, "committed events");
                    committed.push(CommittedStream {
                        stream_id,
                        version,
                        event_count,
                    });
                }
                Err(EventStoreError::VersionMismatch { actual, .. }) => {
                    return Err(conflict(&stream_id, expected, actual, event_count));
                }
                Err(error) => return Err(self.abandon(error)),
            }
        }
        Ok(committed)
    }

    /// Loads every committed event of the stream.
    pub async fn load(&self, stream_id: &StreamId) -> Result<Option<EventStream>, PersistenceError> {
        self.load_version(stream_id, EventStreamVersion::Max).await
    }

    /// Loads the committed events with ordinal up to and including `max_version`.
    pub async fn load_version(
        &self,
        stream_id: &StreamId,
        max_version: EventStreamVersion,
    ) -> Result<Option<EventStream>, PersistenceError> {
        if max_version == EventStreamVersion::NoStream {
            return Err(PersistenceError::VersionOutOfRange {
                stream_id: stream_id.to_string(),
                requested: max_version,
                current: None,
            });
        }

        let Some(current) = self
            .call("current_version", self.backend.current_version(stream_id))
            .await?
        else {
            tracing::debug!(%stream_id, "stream does not exist");
            return Ok(None);
        };

        let bound = match max_version {
            EventStreamVersion::At(version) if version <= current => version,
            EventStreamVersion::Max => current,
            _ => {
                return Err(PersistenceError::VersionOutOfRange {
                    stream_id: stream_id.to_string(),
                    requested: max_version,
                    current: Some(current),
                });
            }
        };

        let records = self
            .call("read_range", self.backend.read_range(stream_id, 0, bound))
            .await?;
        let stream =
            records.and_then(|records| EventStream::from_records(stream_id.clone(), records));
        tracing::debug!(
            %stream_id,
            %max_version,
            loaded = stream.as_ref().map_or(0, EventStream::len),
            "loaded stream"
        );
        Ok(stream)
    }

    async fn call<T>(
        &self,
        operation: &str,
        future: impl Future<Output = Result<T, EventStoreError>>,
    ) -> Result<T, EventStoreError> {
        match self.options.backend_timeout {
            None => future.await,
            Some(limit) => tokio::time::timeout(limit, future).await.map_err(|_| {
                EventStoreError::Backend(format!(
                    "{operation} timed out after {}ms",
                    limit.as_millis()
                ))
            })?,
        }
    }

    fn abandon(&mut self, error: EventStoreError) -> PersistenceError {
        let discarded = self.commit_log.clear();
        tracing::warn!(%error, discarded, "backend failed during flush; staged events discarded");
        PersistenceError::BackendUnavailable(error)
    }
}

/// Expected backend state and first ordinal of a staged batch.
///
/// `None` when no stream state can accept the batch: `Max`, or ordinals past `u64::MAX`.
fn append_position(
    expected: EventStreamVersion,
    event_count: usize,
) -> Option<(Option<u64>, u64)> {
    let expected_current = expected.expected_current().ok()?;
    let first = match expected_current {
        Some(version) => version.checked_add(1)?,
        None => 0,
    };
    first.checked_add(event_count.saturating_sub(1) as u64)?;
    Some((expected_current, first))
}

fn conflict(
    stream_id: &StreamId,
    expected: EventStreamVersion,
    actual: Option<u64>,
    discarded: usize,
) -> PersistenceError {
    tracing::warn!(%stream_id, %expected, ?actual, discarded, "concurrency conflict; staged events discarded");
    PersistenceError::ConcurrencyConflict {
        stream_id: stream_id.to_string(),
        expected,
        actual,
    }
}
