// Composition root.
//
// Responsibilities
// - Read config from the environment.
// - Instantiate the configured backend and hand it to the engine explicitly.

pub mod config;

use crate::modules::persistence::engine::PersistenceEngine;
use crate::shared::infrastructure::event_store::EventStoreBackend;
use crate::shell::config::{ConfigError, StoreConfig};

pub type Engine = PersistenceEngine<dyn EventStoreBackend>;

pub fn build_engine(config: &StoreConfig) -> Result<Engine, ConfigError> {
    let backend = config.open_backend()?;
    Ok(PersistenceEngine::with_options(backend, config.engine_options()))
}
