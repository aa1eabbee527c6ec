use crate::modules::dispatch::dispatcher::{CommandDispatcher, DispatchError};
use crate::modules::dispatch::handler::CommandHandler;
use crate::modules::persistence::core::version::EventStreamVersion;
use crate::modules::persistence::engine::PersistenceEngine;
use crate::shared::core::event_record::EventData;
use crate::shared::infrastructure::event_store::in_memory::InMemoryEventStore;
use crate::tests::fixtures::events::customer::{
    SubscribedToNewsletter, make_customer_signed_up, make_customer_stream_id,
    make_subscribed_to_newsletter,
};
use async_trait::async_trait;
use rstest::{fixture, rstest};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct SignUpCustomer {
    customer_id: Uuid,
    newsletter: Option<String>,
}

struct Registration;

#[async_trait]
impl CommandHandler<SignUpCustomer> for Registration {
    fn name(&self) -> &str {
        "registration"
    }

    async fn handle(&self, command: &SignUpCustomer) -> anyhow::Result<Vec<EventData>> {
        Ok(vec![make_customer_signed_up(command.customer_id)])
    }
}

struct Newsletter;

#[async_trait]
impl CommandHandler<SignUpCustomer> for Newsletter {
    fn name(&self) -> &str {
        "newsletter"
    }

    fn handles(&self, command: &SignUpCustomer) -> bool {
        command.newsletter.is_some()
    }

    async fn handle(&self, command: &SignUpCustomer) -> anyhow::Result<Vec<EventData>> {
        let newsletter = command
            .newsletter
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no newsletter requested"))?;
        Ok(vec![make_subscribed_to_newsletter(newsletter)])
    }
}

#[fixture]
fn dispatcher() -> CommandDispatcher<SignUpCustomer> {
    CommandDispatcher::<SignUpCustomer>::new()
        .register(Arc::new(Registration))
        .register(Arc::new(Newsletter))
}

#[rstest]
#[tokio::test]
async fn a_command_handled_by_multiple_handlers_persists_all_their_events(
    dispatcher: CommandDispatcher<SignUpCustomer>,
) {
    let store = Arc::new(InMemoryEventStore::new());
    let mut engine = PersistenceEngine::new(store.clone());
    let command = SignUpCustomer {
        customer_id: Uuid::now_v7(),
        newsletter: Some("latest".into()),
    };
    let stream_id = make_customer_stream_id(command.customer_id);

    let dispatched = dispatcher.dispatch(&command).await.expect("dispatch failed");
    assert_eq!(dispatched.handled_by, vec!["registration", "newsletter"]);

    engine.save(&stream_id, EventStreamVersion::NoStream, dispatched.events);
    engine.flush().await.unwrap();

    let stream = engine.load(&stream_id).await.unwrap().unwrap();
    let types: Vec<_> = stream.events().iter().map(|r| r.event_type()).collect();
    assert_eq!(types, vec!["CustomerSignedUp", "SubscribedToNewsletter"]);
    let subscribed: SubscribedToNewsletter = stream.events()[1].decode().unwrap();
    assert_eq!(subscribed.newsletter, "latest");
    assert_eq!(store.append_count(), 1);
}

#[rstest]
#[tokio::test]
async fn handlers_that_decline_the_command_contribute_nothing(
    dispatcher: CommandDispatcher<SignUpCustomer>,
) {
    let command = SignUpCustomer {
        customer_id: Uuid::now_v7(),
        newsletter: None,
    };

    let dispatched = dispatcher.dispatch(&command).await.unwrap();

    assert_eq!(dispatched.handled_by, vec!["registration"]);
    assert_eq!(dispatched.events.len(), 1);
}

#[rstest]
#[tokio::test]
async fn a_dispatcher_without_handlers_reports_the_command_as_unhandled() {
    let dispatcher = CommandDispatcher::<SignUpCustomer>::new();
    let command = SignUpCustomer {
        customer_id: Uuid::now_v7(),
        newsletter: None,
    };
    let result = dispatcher.dispatch(&command).await;
    assert!(matches!(result, Err(DispatchError::Unhandled { .. })));
}
