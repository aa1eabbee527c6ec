// Dispatches a command to every registered handler able to process it.
//
// Purpose
// - Let several handlers react to one command and gather what they produced in one value.
//
// Responsibilities
// - Invoke capable handlers in registration order.
// - Return the names of the handlers that ran and their events, concatenated in that order.
// - Fail without a partial result when any handler fails.
//
// Boundaries
// - Knows nothing about persistence. Callers pass the events to `save` and `flush` themselves.

use crate::modules::dispatch::handler::CommandHandler;
use crate::shared::core::event_record::EventData;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no handler accepts {command}")]
    Unhandled { command: &'static str },

    #[error("handler {handler} failed: {reason:#}")]
    HandlerFailed {
        handler: String,
        reason: anyhow::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub handled_by: Vec<String>,
    pub events: Vec<EventData>,
}

pub struct CommandDispatcher<C>
where
    C: Send + Sync + 'static,
{
    handlers: Vec<Arc<dyn CommandHandler<C>>>,
}

impl<C> Default for CommandDispatcher<C>
where
    C: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CommandDispatcher<C>
where
    C: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register(mut self, handler: Arc<dyn CommandHandler<C>>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub async fn dispatch(&self, command: &C) -> Result<Dispatched, DispatchError> {
        let mut dispatched = Dispatched {
            handled_by: Vec::new(),
            events: Vec::new(),
        };
        for handler in self.handlers.iter().filter(|handler| handler.handles(command)) {
            let events = handler
                .handle(command)
                .await
                .map_err(|reason| DispatchError::HandlerFailed {
                    handler: handler.name().to_string(),
                    reason,
                })?;
            tracing::debug!(handler = handler.name(), produced = events.len(), "command handled");
            dispatched.handled_by.push(handler.name().to_string());
            dispatched.events.extend(events);
        }

        if dispatched.handled_by.is_empty() {
            return Err(DispatchError::Unhandled {
                command: std::any::type_name::<C>(),
            });
        }
        Ok(dispatched)
    }
}
