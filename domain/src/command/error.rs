use crate::command::{Arity, CoercionError};
use crate::poll::PollError;
use crate::ports::UpstreamError;
use chrono::Duration;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("expected {expected} arguments, got {supplied}")]
    Arity { expected: Arity, supplied: usize },
    #[error(transparent)]
    ArgumentType(#[from] CoercionError),
    #[error("division by zero")]
    DivisionByZero,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("{0} was not found")]
    NotFound(String),
    #[error("{0}")]
    LimitExceeded(String),
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error("command is disabled for another {remaining}")]
    Disabled { remaining: Duration },
    #[error("command is broken until reset")]
    Broken,
    #[error("{0}")]
    Unexpected(String),
}

/// Discriminant of [`CommandError`] used as the key of an [`ErrorTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Arity,
    ArgumentType,
    DivisionByZero,
    UpstreamUnavailable,
    UpstreamRejected,
    NotFound,
    MalformedResponse,
    LimitExceeded,
    Poll,
    Disabled,
    Broken,
    Unexpected,
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Arity { .. } => ErrorKind::Arity,
            CommandError::ArgumentType(_) => ErrorKind::ArgumentType,
            CommandError::DivisionByZero => ErrorKind::DivisionByZero,
            CommandError::Upstream(error) => match error {
                UpstreamError::Status { .. }
                | UpstreamError::Unreachable { .. }
                | UpstreamError::Timeout { .. } => ErrorKind::UpstreamUnavailable,
                UpstreamError::Rejected { .. } => ErrorKind::UpstreamRejected,
                UpstreamError::Malformed { .. } => ErrorKind::MalformedResponse,
            },
            CommandError::NotFound(_) => ErrorKind::NotFound,
            CommandError::LimitExceeded(_) => ErrorKind::LimitExceeded,
            CommandError::Poll(_) => ErrorKind::Poll,
            CommandError::Disabled { .. } => ErrorKind::Disabled,
            CommandError::Broken => ErrorKind::Broken,
            CommandError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        CommandError::Unexpected(message.into())
    }
}

/// Per-command mapping from error kind to a reply template.
///
/// Templates may contain `{command}`, `{prefix}`, `{token}`, `{service}`
/// and `{detail}`.
#[derive(Debug, Clone, Default)]
pub struct ErrorTable {
    templates: HashMap<ErrorKind, String>,
}

impl ErrorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, kind: ErrorKind, template: impl Into<String>) -> Self {
        self.templates.insert(kind, template.into());
        self
    }

    /// Registers the same template for both user input error kinds.
    pub fn usage(self, template: impl Into<String>) -> Self {
        let template = template.into();
        self.on(ErrorKind::Arity, template.clone())
            .on(ErrorKind::ArgumentType, template)
    }

    pub fn template(&self, kind: ErrorKind) -> Option<&str> {
        self.templates.get(&kind).map(String::as_str)
    }
}
