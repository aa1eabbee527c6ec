// Event data as handed over by callers, and event records as committed by a backend.
//
// Purpose
// - EventData is the opaque unit of domain change a caller stages with `save`.
// - EventRecord is the same data after the engine assigned its ordinal within a stream.
//
// Responsibilities
// - Carry a type identifier and a structured payload that any backend can serialize.
// - Convert typed domain events to and from the JSON payload.
//
// Invariants
// - A record is immutable once created. Its ordinal never changes after assignment.

use crate::shared::core::primitives::StreamId;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub event_id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl EventData {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event_type.into(),
            payload,
            occurred_at: Utc::now(),
        }
    }

    /// Serializes a typed domain event into the payload.
    pub fn from_domain<T: Serialize>(
        event_type: impl Into<String>,
        event: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event_type, serde_json::to_value(event)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    stream_id: StreamId,
    version: u64,
    data: EventData,
}

impl EventRecord {
    pub fn new(stream_id: StreamId, version: u64, data: EventData) -> Self {
        Self {
            stream_id,
            version,
            data,
        }
    }

    pub fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    /// Zero-based ordinal of this event within its stream.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn event_type(&self) -> &str {
        &self.data.event_type
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.data.payload
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.payload)
    }
}
