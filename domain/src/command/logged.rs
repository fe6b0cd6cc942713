use crate::command::{Arguments, CommandError, CommandHandler, Invocation};
use async_trait::async_trait;
use domain_shared::reply::Reply;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Logs every call of the wrapped handler together with its outcome.
pub struct LoggedHandler {
    name: String,
    inner: Arc<dyn CommandHandler>,
}

impl LoggedHandler {
    pub fn new(name: impl Into<String>, inner: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }
}

#[async_trait]
impl CommandHandler for LoggedHandler {
    #[instrument(
        level = "info",
        name = "command",
        skip(self, invocation, arguments),
        fields(
            command = %self.name,
            channel_id = invocation.channel.0,
            user_id = invocation.author.id.0,
        )
    )]
    async fn handle(
        &self,
        invocation: &Invocation<'_>,
        arguments: Arguments,
    ) -> Result<Reply, CommandError> {
        info!(raw = invocation.raw, "Command called");
        let started = Instant::now();

        let result = self.inner.handle(invocation, arguments).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(elapsed_ms, "Command finished"),
            Err(error) => info!(elapsed_ms, error = %error, "Command failed"),
        }

        result
    }
}
