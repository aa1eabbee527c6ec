// Staging area for events saved but not yet flushed.
//
// Purpose
// - Accumulate events from several in-process sources per stream before one atomic commit.
//
// Responsibilities
// - Keep events in the order they were staged, across repeated saves to the same stream.
// - Remember the expected version of the first save of a batch. That is what flush checks.
// - Hand out streams in ascending id order so flush is deterministic.
//
// Boundaries
// - Pure in memory state. Staged events are never visible to a load.

use crate::modules::persistence::core::version::EventStreamVersion;
use crate::shared::core::event_record::{EventData, EventRecord};
use crate::shared::core::primitives::StreamId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct StagedStream {
    pub expected_version: EventStreamVersion,
    pub events: Vec<EventData>,
}

impl StagedStream {
    /// Assigns consecutive ordinals starting at `first`.
    pub fn into_records(self, stream_id: &StreamId, first: u64) -> Vec<EventRecord> {
        self.events
            .into_iter()
            .zip(first..)
            .map(|(data, version)| EventRecord::new(stream_id.clone(), version, data))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct CommitLog {
    staged: BTreeMap<StreamId, StagedStream>,
}

impl CommitLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(
        &mut self,
        stream_id: &StreamId,
        expected_version: EventStreamVersion,
        events: Vec<EventData>,
    ) {
        if events.is_empty() {
            return;
        }
        match self.staged.get_mut(stream_id) {
            Some(entry) => {
                let projected = entry.expected_version.advanced_by(entry.events.len());
                if expected_version != entry.expected_version && expected_version != projected {
                    tracing::warn!(
                        %stream_id,
                        staged_against = %entry.expected_version,
                        requested = %expected_version,
                        "save disagrees with the version already staged; keeping the staged one"
                    );
                }
                entry.events.extend(events);
            }
            None => {
                self.staged.insert(
                    stream_id.clone(),
                    StagedStream {
                        expected_version,
                        events,
                    },
                );
            }
        }
    }

    pub fn staged(&self, stream_id: &StreamId) -> Option<&StagedStream> {
        self.staged.get(stream_id)
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    /// Removes and returns the stream with the smallest id.
    pub fn pop_first(&mut self) -> Option<(StreamId, StagedStream)> {
        self.staged.pop_first()
    }

    /// Drops every staged stream and returns how many events were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.staged.values().map(|entry| entry.events.len()).sum();
        self.staged.clear();
        discarded
    }
}
