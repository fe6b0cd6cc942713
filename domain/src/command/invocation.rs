use crate::command::{CommandDescriptor, Registry};
use chrono::{DateTime, Utc};
use domain_shared::discord::{Author, ChannelId};

/// Everything a handler may know about the event that triggered it.
pub struct Invocation<'a> {
    pub prefix: &'a str,
    pub raw: &'a str,
    pub parent: Option<&'a CommandDescriptor>,
    pub command: &'a CommandDescriptor,
    pub channel: ChannelId,
    pub author: &'a Author,
    pub registry: &'a Registry,
    pub received_at: DateTime<Utc>,
}

impl Invocation<'_> {
    /// `poll vote` for a subcommand, `poll` otherwise.
    pub fn qualified_name(&self) -> String {
        qualified_name(self.parent, self.command)
    }
}

pub(crate) fn qualified_name(
    parent: Option<&CommandDescriptor>,
    command: &CommandDescriptor,
) -> String {
    match parent {
        Some(parent) => format!("{} {}", parent.name(), command.name()),
        None => command.name().to_string(),
    }
}
