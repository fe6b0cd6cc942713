use crate::dispatcher::Dispatcher;
use application_ports::dispatch::{DispatchPort, InboundInteraction, InboundMessage, OptionValue};
use domain::command::{CommandDescriptor, Registry};
use domain_shared::discord::{Author, ChannelId, UserId};
use domain_shared::reply::Reply;

pub const CHANNEL: ChannelId = ChannelId(10);
pub const BOT: UserId = UserId(99);

pub fn author(id: u64, name: &str) -> Author {
    Author {
        id: UserId(id),
        display_name: name.to_string(),
    }
}

pub fn dispatcher_with(descriptors: Vec<CommandDescriptor>) -> Dispatcher {
    let mut registry = Registry::new();
    for descriptor in descriptors {
        registry.register(descriptor).unwrap();
    }
    Dispatcher::new(registry, "!")
}

pub async fn reply_as(dispatcher: &Dispatcher, author: Author, content: &str) -> Reply {
    dispatcher
        .dispatch_message(InboundMessage {
            content: content.to_string(),
            channel: CHANNEL,
            author,
            bot_id: BOT,
        })
        .await
        .unwrap_or_else(|| panic!("no reply to {content}"))
}

pub async fn text_reply(dispatcher: &Dispatcher, content: &str) -> String {
    match reply_as(dispatcher, author(1, "alice"), content).await {
        Reply::Text(text) => text,
        other => panic!("expected text reply to {content}, got {other:?}"),
    }
}

pub async fn slash_reply(
    dispatcher: &Dispatcher,
    path: &[&str],
    options: Vec<(&str, OptionValue)>,
) -> Reply {
    dispatcher
        .dispatch_interaction(InboundInteraction {
            path: path.iter().map(|segment| segment.to_string()).collect(),
            options: options
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            channel: CHANNEL,
            author: author(1, "alice"),
        })
        .await
        .unwrap_or_else(|| panic!("no reply to /{}", path.join(" ")))
}
