use crate::command::invocation::qualified_name;
use crate::command::{CommandDescriptor, CommandHandler, LoggedHandler};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("command name or alias `{name}` is already registered")]
pub struct DuplicateCommandError {
    pub name: String,
}

/// Every command the bot understands. Built once at startup.
#[derive(Default)]
pub struct Registry {
    commands: Vec<CommandDescriptor>,
}

/// Outcome of [`Registry::resolve`].
#[derive(Clone, Copy)]
pub struct Resolved<'r, 't> {
    pub parent: Option<&'r CommandDescriptor>,
    pub command: &'r CommandDescriptor,
    pub remaining: &'t [String],
}

impl Resolved<'_, '_> {
    pub fn qualified_name(&self) -> String {
        qualified_name(self.parent, self.command)
    }

    /// The top level command, which owns the circuit breaker.
    pub fn root(&self) -> &CommandDescriptor {
        self.parent.unwrap_or(self.command)
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command, wrapping each of its handlers in a [`LoggedHandler`].
    #[instrument(level = "trace", skip_all, fields(command = descriptor.name()))]
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), DuplicateCommandError> {
        if let Some(name) = first_collision(&self.commands, &descriptor) {
            return Err(DuplicateCommandError { name });
        }

        let descriptor = descriptor.wrap_handlers(None, &|name, handler| {
            Arc::new(LoggedHandler::new(name, handler)) as Arc<dyn CommandHandler>
        });
        debug!(command = descriptor.name(), "Command registered");
        self.commands.push(descriptor);

        Ok(())
    }

    /// Matches the first token against top level names and aliases, then
    /// descends at most one level into subcommands.
    pub fn resolve<'r, 't>(&'r self, tokens: &'t [String]) -> Option<Resolved<'r, 't>> {
        let (first, rest) = tokens.split_first()?;
        let command = self.find(first)?;

        if let Some((second, remaining)) = rest.split_first() {
            if let Some(subcommand) = command.find_subcommand(second) {
                return Some(Resolved {
                    parent: Some(command),
                    command: subcommand,
                    remaining,
                });
            }
        }

        Some(Resolved {
            parent: None,
            command,
            remaining: rest,
        })
    }

    pub fn find(&self, token: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|command| command.matches(token))
    }

    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }
}

/// The first name of `candidate` already taken within `scope`.
pub(crate) fn first_collision(
    scope: &[CommandDescriptor],
    candidate: &CommandDescriptor,
) -> Option<String> {
    candidate
        .names()
        .enumerate()
        .find(|(index, name)| {
            scope.iter().any(|existing| existing.matches(name))
                || candidate
                    .names()
                    .take(*index)
                    .any(|earlier| earlier.eq_ignore_ascii_case(name))
        })
        .map(|(_, name)| name.to_string())
}
