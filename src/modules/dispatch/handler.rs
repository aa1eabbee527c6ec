// Command handler port.
//
// Purpose
// - A handler turns one command into the events it wants persisted. It never writes them itself.
//
// Responsibilities
// - Report whether it is able to process a given command. Every capable handler is invoked.
// - Return its events as a value, so the dispatcher can collect them without touching the command.

use crate::shared::core::event_record::EventData;
use async_trait::async_trait;

#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Send + Sync,
{
    fn name(&self) -> &str;

    fn handles(&self, _command: &C) -> bool {
        true
    }

    async fn handle(&self, command: &C) -> anyhow::Result<Vec<EventData>>;
}
