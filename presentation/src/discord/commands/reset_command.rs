use crate::application_ports::Locator;
use crate::discord::{Context, Error};
use application_ports::dispatch::ResetCommandError;
use poise::CreateReply;
use tracing::{info, instrument};

/// Re-enables a command its circuit breaker disabled or marked as broken.
#[poise::command(
    slash_command,
    rename = "reset-command",
    required_permissions = "ADMINISTRATOR"
)]
#[instrument(level = "info", skip(ctx))]
pub async fn command<D: Sync + Locator>(
    ctx: Context<'_, D>,
    #[description = "Name or alias of the command"] name: String,
) -> Result<(), Error> {
    info!(
        guild_id = ctx.guild_id().map(|id| id.get()),
        user_id = ctx.author().id.get(),
        command = %name,
        "Resetting command",
    );

    let dispatch_port = ctx.data().get_dispatch_port();

    let response = match dispatch_port.reset_command(&name) {
        Ok(true) => format!("`{name}` is enabled again."),
        Ok(false) => format!("`{name}` was not disabled."),
        Err(error @ ResetCommandError::UnknownCommand(_)) => error.to_string(),
    };

    let reply = CreateReply::default()
        .content(response)
        .ephemeral(true)
        .reply(true);
    ctx.send(reply).await?;

    Ok(())
}
