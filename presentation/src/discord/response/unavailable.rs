use poise::CreateReply;
use tracing::instrument;

#[instrument(level = "debug", skip_all)]
pub fn unknown_command() -> CreateReply {
    let response = "Sorry, I don't know this command anymore. Try again once my commands are refreshed.";

    CreateReply::default()
        .content(response)
        .ephemeral(true)
        .reply(true)
}
