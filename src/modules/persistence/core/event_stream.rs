// Read result of a load: one aggregate's committed history up to a resolved version.
//
// Invariants
// - Events are in commit order, which is also ordinal order.
// - A stream is never empty. An absent stream is represented by `None` at the call site.
// - `version` is the ordinal of the last event included.

use crate::shared::core::event_record::{EventData, EventRecord};
use crate::shared::core::primitives::StreamId;

#[derive(Debug, Clone, PartialEq)]
pub struct EventStream {
    stream_id: StreamId,
    events: Vec<EventRecord>,
    version: u64,
}

impl EventStream {
    /// Builds a stream from records already in ordinal order. Returns `None` for no records.
    pub fn from_records(stream_id: StreamId, events: Vec<EventRecord>) -> Option<Self> {
        let version = events.last()?.version();
        Some(Self {
            stream_id,
            events,
            version,
        })
    }

    pub fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The caller-supplied data of every event, dropping the assigned ordinals.
    pub fn event_data(&self) -> Vec<&EventData> {
        self.events.iter().map(EventRecord::data).collect()
    }

    pub fn into_events(self) -> Vec<EventRecord> {
        self.events
    }
}
