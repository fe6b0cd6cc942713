use crate::command::{Arguments, CommandError, Invocation};
use async_trait::async_trait;
use domain_shared::reply::Reply;
use std::sync::Arc;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        invocation: &Invocation<'_>,
        arguments: Arguments,
    ) -> Result<Reply, CommandError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&Invocation<'_>, Arguments) -> Result<Reply, CommandError> + Send + Sync,
{
    async fn handle(
        &self,
        invocation: &Invocation<'_>,
        arguments: Arguments,
    ) -> Result<Reply, CommandError> {
        (self.0)(invocation, arguments)
    }
}

/// Wraps a synchronous function as a [`CommandHandler`].
pub fn handler_fn<F>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(&Invocation<'_>, Arguments) -> Result<Reply, CommandError> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}
