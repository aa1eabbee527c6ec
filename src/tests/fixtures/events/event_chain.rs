use crate::shared::core::event_record::EventData;
use crate::tests::fixtures::events::customer::CustomerEvent;

#[derive(Debug, Clone, Default)]
pub struct EventChain {
    events: Vec<EventData>,
}

impl EventChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, event: impl CustomerEvent) -> Self {
        self.events.push(event.to_event_data());
        self
    }

    pub fn build(self) -> Vec<EventData> {
        self.events
    }
}
