use async_trait::async_trait;
use domain_shared::discord::{Author, ChannelId, UserId};
use domain_shared::reply::Reply;
use thiserror::Error;

/// A chat message that may contain a command.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub content: String,
    pub channel: ChannelId,
    pub author: Author,
    /// Lets `@bot command` work as an alternative to the prefix.
    pub bot_id: UserId,
}

/// A slash command with its already typed options.
#[derive(Debug, Clone)]
pub struct InboundInteraction {
    /// Command name followed by the subcommand name, if any.
    pub path: Vec<String>,
    pub options: Vec<(String, OptionValue)>,
    pub channel: ChannelId,
    pub author: Author,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

/// Description of a command for slash command registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSummary>,
    pub subcommands: Vec<CommandSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSummary {
    pub name: String,
    pub description: String,
    pub kind: ParameterKind,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    Text,
    Integer,
    PositiveInteger,
    Number,
    Boolean,
    Choice(Vec<String>),
}

#[async_trait]
pub trait DispatchPort {
    /// `None` when the message is not addressed to a known command.
    async fn dispatch_message(&self, message: InboundMessage) -> Option<Reply>;

    /// `None` when the interaction names no known command.
    async fn dispatch_interaction(&self, interaction: InboundInteraction) -> Option<Reply>;

    fn catalogue(&self) -> Vec<CommandSummary>;

    /// Re-enables a command disabled by its circuit breaker. Returns whether
    /// it was disabled.
    fn reset_command(&self, name: &str) -> Result<bool, ResetCommandError>;
}

#[derive(Debug, Error)]
pub enum ResetCommandError {
    #[error("No command named `{0}` exists")]
    UnknownCommand(String),
}
