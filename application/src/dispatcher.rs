use application_ports::dispatch::{
    CommandSummary, DispatchPort, InboundInteraction, InboundMessage, OptionValue,
    ParameterKind, ParameterSummary, ResetCommandError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::circuit_breaker::CircuitBreakers;
use domain::command::{
    tokenize, translate, Arguments, Arity, Coercer, CommandDescriptor, CommandError, Invocation,
    Number, Registry, Resolved,
};
use domain_shared::discord::{Author, ChannelId, UserId};
use domain_shared::reply::Reply;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info, instrument};

const SLASH_DESCRIPTION_LIMIT: usize = 100;

/// Owns the registry and breaker state; turns inbound events into replies.
pub struct Dispatcher {
    registry: Registry,
    breakers: CircuitBreakers,
    prefix: String,
}

impl Dispatcher {
    #[instrument(level = "trace", skip_all)]
    pub fn new(registry: Registry, prefix: impl Into<String>) -> Self {
        Self {
            registry,
            breakers: CircuitBreakers::new(),
            prefix: prefix.into(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The message body after the prefix or a leading bot mention.
    fn strip_prefix<'m>(&self, content: &'m str, bot_id: UserId) -> Option<&'m str> {
        let content = content.trim_start();
        if let Some(body) = content.strip_prefix(self.prefix.as_str()) {
            return Some(body);
        }

        [format!("<@{}>", bot_id.0), format!("<@!{}>", bot_id.0)]
            .iter()
            .find_map(|mention| content.strip_prefix(mention.as_str()))
    }

    async fn invoke(
        &self,
        resolved: Resolved<'_, '_>,
        tokens: &[String],
        raw: &str,
        channel: ChannelId,
        author: &Author,
    ) -> Reply {
        let now = Utc::now();

        let execution = self.execute(&resolved, tokens, raw, channel, author, now);
        let result = match AssertUnwindSafe(execution).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(CommandError::unexpected("command handler panicked")),
        };

        match result {
            Ok(reply) => reply,
            Err(error) => {
                let root = resolved.root();
                if let Some(cooldown) = root.cooldown() {
                    self.breakers
                        .record_failure(root.name(), error.kind(), cooldown, now);
                }
                Reply::Text(translate(&error, &resolved, &self.prefix))
            }
        }
    }

    async fn execute(
        &self,
        resolved: &Resolved<'_, '_>,
        tokens: &[String],
        raw: &str,
        channel: ChannelId,
        author: &Author,
        now: DateTime<Utc>,
    ) -> Result<Reply, CommandError> {
        let root = resolved.root();
        if root.cooldown().is_some() {
            self.breakers.check(root.name(), now)?;
        }

        let command = resolved.command;
        let arity = command.arity_of();
        if !arity.accepts(tokens.len()) {
            return Err(CommandError::Arity {
                expected: arity,
                supplied: tokens.len(),
            });
        }

        let values = tokens
            .iter()
            .enumerate()
            .map(|(index, token)| command.coercer_for(index).coerce(token))
            .collect::<Result<Vec<_>, _>>()?;

        let invocation = Invocation {
            prefix: &self.prefix,
            raw,
            parent: resolved.parent,
            command,
            channel,
            author,
            registry: &self.registry,
            received_at: now,
        };

        command
            .handler()
            .handle(&invocation, Arguments::new(values))
            .await
    }
}

#[async_trait]
impl DispatchPort for Dispatcher {
    #[instrument(
        level = "debug",
        skip(self, message),
        fields(channel_id = message.channel.0, user_id = message.author.id.0)
    )]
    async fn dispatch_message(&self, message: InboundMessage) -> Option<Reply> {
        let body = self.strip_prefix(&message.content, message.bot_id)?;
        let tokens = tokenize(body);
        let Some(resolved) = self.registry.resolve(&tokens) else {
            debug!("Message does not name a known command");
            return None;
        };

        Some(
            self.invoke(
                resolved,
                resolved.remaining,
                &message.content,
                message.channel,
                &message.author,
            )
            .await,
        )
    }

    #[instrument(
        level = "debug",
        skip(self, interaction),
        fields(path = ?interaction.path, user_id = interaction.author.id.0)
    )]
    async fn dispatch_interaction(&self, interaction: InboundInteraction) -> Option<Reply> {
        let resolved = self.registry.resolve(&interaction.path)?;
        if !resolved.remaining.is_empty() {
            debug!("Interaction names an unknown subcommand");
            return None;
        }

        let tokens = interaction_tokens(resolved.command, &interaction.options);
        let raw = format!("/{} {}", interaction.path.join(" "), tokens.join(" "));

        Some(
            self.invoke(
                resolved,
                &tokens,
                raw.trim_end(),
                interaction.channel,
                &interaction.author,
            )
            .await,
        )
    }

    fn catalogue(&self) -> Vec<CommandSummary> {
        self.registry.commands().iter().map(summarize).collect()
    }

    #[instrument(level = "info", skip(self))]
    fn reset_command(&self, name: &str) -> Result<bool, ResetCommandError> {
        let command = self.registry.find(name).ok_or_else(|| {
            error!(command = name, "Tried to reset an unknown command");
            ResetCommandError::UnknownCommand(name.to_string())
        })?;

        let was_disabled = self.breakers.reset(command.name());
        info!(command = command.name(), was_disabled, "Command reset");

        Ok(was_disabled)
    }
}

/// Re-tokenizes typed interaction options so they pass the same arity and
/// coercion checks as text input.
fn interaction_tokens(command: &CommandDescriptor, options: &[(String, OptionValue)]) -> Vec<String> {
    let variadic = command.arity_of().is_variadic();
    let last = command.parameters().len().saturating_sub(1);
    let mut tokens = Vec::new();

    for (index, parameter) in command.parameters().iter().enumerate() {
        let Some((_, value)) = options.iter().find(|(name, _)| *name == parameter.name) else {
            continue;
        };
        match value {
            OptionValue::Text(text) if variadic && index == last => tokens.extend(tokenize(text)),
            OptionValue::Text(text) => tokens.push(text.clone()),
            OptionValue::Integer(value) => tokens.push(value.to_string()),
            OptionValue::Number(value) => tokens.push(
                Number::new(*value)
                    .map(|number| number.to_string())
                    .unwrap_or_else(|| value.to_string()),
            ),
            OptionValue::Boolean(value) => tokens.push(value.to_string()),
        }
    }

    tokens
}

fn summarize(command: &CommandDescriptor) -> CommandSummary {
    let parameters = if command.subcommands().is_empty() {
        parameter_summaries(command)
    } else {
        Vec::new()
    };

    CommandSummary {
        name: command.name().to_string(),
        description: slash_description(command.summary(), command.name()),
        parameters,
        subcommands: command.subcommands().iter().map(summarize).collect(),
    }
}

fn parameter_summaries(command: &CommandDescriptor) -> Vec<ParameterSummary> {
    let arity = command.arity_of();
    let last = command.parameters().len().saturating_sub(1);
    command
        .parameters()
        .iter()
        .enumerate()
        .map(|(index, parameter)| ParameterSummary {
            name: parameter.name.clone(),
            description: slash_description(&parameter.description, &parameter.name),
            // one string holding every value, split again on dispatch
            kind: match parameter.coercer {
                _ if arity.is_variadic() && index == last => ParameterKind::Text,
                Coercer::Text => ParameterKind::Text,
                Coercer::Integer => ParameterKind::Integer,
                Coercer::PositiveInteger => ParameterKind::PositiveInteger,
                Coercer::Number => ParameterKind::Number,
                Coercer::Boolean => ParameterKind::Boolean,
                Coercer::Die => ParameterKind::Choice(
                    domain::command::Die::ALL
                        .iter()
                        .map(|die| die.as_str().to_string())
                        .collect(),
                ),
            },
            required: match arity {
                Arity::Zero | Arity::AtMost(_) => false,
                Arity::Exact(_) => true,
                Arity::AtLeast(minimum) => index < minimum,
            },
        })
        .collect()
}

fn slash_description(text: &str, fallback: &str) -> String {
    let text = if text.is_empty() { fallback } else { text };
    text.chars().take(SLASH_DESCRIPTION_LIMIT).collect()
}
