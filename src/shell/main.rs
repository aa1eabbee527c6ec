use async_trait::async_trait;
use event_persistence::modules::dispatch::dispatcher::CommandDispatcher;
use event_persistence::modules::dispatch::handler::CommandHandler;
use event_persistence::modules::persistence::core::version::EventStreamVersion;
use event_persistence::shared::core::event_record::EventData;
use event_persistence::shared::core::primitives::StreamId;
use event_persistence::shell::build_engine;
use event_persistence::shell::config::StoreConfig;
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

struct SignUpCustomer {
    customer_id: Uuid,
    newsletters: Vec<String>,
}

#[derive(Serialize)]
struct CustomerSignedUp {
    customer_id: Uuid,
}

#[derive(Serialize)]
struct SubscribedToNewsletter {
    newsletter: String,
}

struct Registration;

#[async_trait]
impl CommandHandler<SignUpCustomer> for Registration {
    fn name(&self) -> &str {
        "registration"
    }

    async fn handle(&self, command: &SignUpCustomer) -> anyhow::Result<Vec<EventData>> {
        let event = CustomerSignedUp {
            customer_id: command.customer_id,
        };
        Ok(vec![EventData::from_domain("CustomerSignedUp", &event)?])
    }
}

struct Newsletters;

#[async_trait]
impl CommandHandler<SignUpCustomer> for Newsletters {
    fn name(&self) -> &str {
        "newsletters"
    }

    fn handles(&self, command: &SignUpCustomer) -> bool {
        !command.newsletters.is_empty()
    }

    async fn handle(&self, command: &SignUpCustomer) -> anyhow::Result<Vec<EventData>> {
        command
            .newsletters
            .iter()
            .map(|newsletter| {
                let event = SubscribedToNewsletter {
                    newsletter: newsletter.clone(),
                };
                EventData::from_domain("SubscribedToNewsletter", &event).map_err(anyhow::Error::from)
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = StoreConfig::from_env()?;
    let mut engine = build_engine(&config)?;

    let dispatcher = CommandDispatcher::<SignUpCustomer>::new()
        .register(Arc::new(Registration))
        .register(Arc::new(Newsletters));

    let command = SignUpCustomer {
        customer_id: Uuid::now_v7(),
        newsletters: vec!["latest".into(), "top".into()],
    };
    let stream_id = StreamId::new(format!("customer-{}", command.customer_id))?;

    let dispatched = dispatcher.dispatch(&command).await?;
    tracing::info!(handled_by = ?dispatched.handled_by, "command dispatched");

    engine.save(&stream_id, EventStreamVersion::NoStream, dispatched.events);
    engine.flush().await?;

    match engine.load(&stream_id).await? {
        Some(stream) => {
            for record in stream.events() {
                tracing::info!(
                    version = record.version(),
                    event_type = record.event_type(),
                    payload = %record.payload(),
                    "replayed"
                );
            }
            tracing::info!(%stream_id, version = stream.version(), "stream loaded");
        }
        None => tracing::warn!(%stream_id, "stream not found after flush"),
    }
    Ok(())
}
