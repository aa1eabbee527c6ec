// Store configuration read from the environment.
//
// Variables
// - EVENT_STORE_CONNECTION: name of the connection to open. Defaults to `default`.
// - EVENT_STORE_CONNECTIONS: comma separated `name=provider` pairs. Defaults to `default=in-memory`.
// - EVENT_STORE_BACKEND_TIMEOUT_MS: optional upper bound for a single backend call.
//
// Connections resolve lazily: an unknown name or a provider that is not an event store only fails
// when the connection is opened.

use crate::modules::persistence::engine::EngineOptions;
use crate::shared::infrastructure::event_store::EventStoreBackend;
use crate::shared::infrastructure::event_store::in_memory::InMemoryEventStore;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const CONNECTION_KEY: &str = "EVENT_STORE_CONNECTION";
pub const CONNECTIONS_KEY: &str = "EVENT_STORE_CONNECTIONS";
pub const BACKEND_TIMEOUT_KEY: &str = "EVENT_STORE_BACKEND_TIMEOUT_MS";

const DEFAULT_CONNECTION: &str = "default";
const DEFAULT_CONNECTIONS: &str = "default=in-memory";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no connection named {0} is defined")]
    UnknownConnection(String),

    #[error("connection {name} uses provider {provider}, which is not an event store provider")]
    UnsupportedProvider { name: String, provider: String },

    #[error("malformed connection entry {0:?}, expected name=provider")]
    MalformedConnection(String),

    #[error("{key} must be a whole number of milliseconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    InMemory,
}

impl FromStr for Provider {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in-memory" | "memory" => Ok(Self::InMemory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub connection: String,
    pub connections: BTreeMap<String, String>,
    pub backend_timeout: Option<Duration>,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let connection = lookup(CONNECTION_KEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CONNECTION.to_string());

        let raw = lookup(CONNECTIONS_KEY).unwrap_or_else(|| DEFAULT_CONNECTIONS.to_string());
        let mut connections = BTreeMap::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let Some((name, provider)) = entry.split_once('=') else {
                return Err(ConfigError::MalformedConnection(entry.to_string()));
            };
            let (name, provider) = (name.trim(), provider.trim());
            if name.is_empty() || provider.is_empty() {
                return Err(ConfigError::MalformedConnection(entry.to_string()));
            }
            connections.insert(name.to_string(), provider.to_string());
        }

        let backend_timeout = match lookup(BACKEND_TIMEOUT_KEY) {
            None => None,
            Some(value) => {
                let millis = value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidTimeout {
                    key: BACKEND_TIMEOUT_KEY,
                    value: value.clone(),
                })?;
                Some(Duration::from_millis(millis))
            }
        };

        Ok(Self {
            connection,
            connections,
            backend_timeout,
        })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            backend_timeout: self.backend_timeout,
        }
    }

    /// Opens the configured connection.
    pub fn open_backend(&self) -> Result<Arc<dyn EventStoreBackend>, ConfigError> {
        self.open(&self.connection)
    }

    pub fn open(&self, name: &str) -> Result<Arc<dyn EventStoreBackend>, ConfigError> {
        let provider = self
            .connections
            .get(name)
            .ok_or_else(|| ConfigError::UnknownConnection(name.to_string()))?;
        match provider.parse::<Provider>() {
            Ok(Provider::InMemory) => {
                tracing::info!(connection = name, "opening in-memory event store");
                Ok(Arc::new(InMemoryEventStore::new()))
            }
            Err(()) => Err(ConfigError::UnsupportedProvider {
                name: name.to_string(),
                provider: provider.clone(),
            }),
        }
    }
}
