// In memory implementation of the EventStoreBackend contract.
//
// Purpose
// - Support engine tests and local development without an external log service.
//
// Responsibilities
// - Store committed records per stream in memory.
// - Enforce optimistic concurrency by checking the expected current version under one write lock.
// - Offer switches to simulate an offline backend and slow appends.

use crate::shared::core::event_record::EventRecord;
use crate::shared::core::primitives::StreamId;
use crate::shared::infrastructure::event_store::{EventStoreBackend, EventStoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<StreamId, Vec<EventRecord>>>,
    offline: bool,
    delay_append_ms: AtomicU64,
    appends: AtomicUsize,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    pub fn set_delay_append_ms(&self, delay_ms: u64) {
        self.delay_append_ms.store(delay_ms, Ordering::SeqCst);
    }

    /// Number of successful appends since creation.
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), EventStoreError> {
        if self.offline {
            return Err(EventStoreError::Backend("Event store offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventStoreBackend for InMemoryEventStore {
    async fn current_version(&self, stream_id: &StreamId) -> Result<Option<u64>, EventStoreError> {
        self.ensure_online()?;
        let guard = self.streams.read().await;
        Ok(guard
            .get(stream_id)
            .and_then(|records| records.last())
            .map(EventRecord::version))
    }

    async fn append_atomic(
        &self,
        stream_id: &StreamId,
        expected_current: Option<u64>,
        events: &[EventRecord],
    ) -> Result<u64, EventStoreError> {
        self.ensure_online()?;
        let Some(version) = events.last().map(EventRecord::version) else {
            return Err(EventStoreError::Backend(format!(
                "refusing an empty append to {stream_id}"
            )));
        };

        let delay = self.delay_append_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        // Nothing below awaits, so a dropped future never leaves a partial append.
        let mut guard = self.streams.write().await;
        let actual = guard
            .get(stream_id)
            .and_then(|records| records.last())
            .map(EventRecord::version);
        if actual != expected_current {
            return Err(EventStoreError::VersionMismatch {
                stream_id: stream_id.to_string(),
                expected: expected_current,
                actual,
            });
        }

        let mut next = actual.map_or(Some(0), |version| version.checked_add(1));
        for record in events {
            if record.stream_id() != stream_id || Some(record.version()) != next {
                return Err(EventStoreError::Backend(format!(
                    "record {} of {} does not continue {stream_id}",
                    record.version(),
                    record.stream_id()
                )));
            }
            next = record.version().checked_add(1);
        }

        guard
            .entry(stream_id.clone())
            .or_default()
            .extend_from_slice(events);
        self.appends.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(%stream_id, version, "in-memory append");
        Ok(version)
    }

    async fn read_range(
        &self,
        stream_id: &StreamId,
        from: u64,
        to_inclusive: u64,
    ) -> Result<Option<Vec<EventRecord>>, EventStoreError> {
        self.ensure_online()?;
        let guard = self.streams.read().await;
        Ok(guard.get(stream_id).map(|records| {
            records
                .iter()
                .filter(|record| (from..=to_inclusive).contains(&record.version()))
                .cloned()
                .collect()
        }))
    }
}
