use crate::application_ports::Locator;
use crate::discord::Error;
use poise::Command;
use tracing::instrument;

pub mod reset_command;

#[instrument(level = "trace", skip())]
pub fn enabled_commands<L: Locator + Send + Sync + 'static>() -> Vec<Command<L, Error>> {
    vec![reset_command::command()]
}
