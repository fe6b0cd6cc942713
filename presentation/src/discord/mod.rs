use crate::application_ports::Locator;
use application_ports::dispatch::InboundMessage;
use domain_shared::discord::{Author, ChannelId, UserId};
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::{
    ClientBuilder, CommandInteraction, CreateInteractionResponseFollowup, GuildId, Interaction,
    Message, MessageReference,
};
use poise::{CreateReply, FrameworkError, PrefixFrameworkOptions};
use tracing::{error, info, instrument, warn};

pub mod commands;
mod response;
pub mod slash;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a, D> = poise::Context<'a, D, Error>;

#[derive(Debug, Clone, Copy)]
pub struct BotOptions {
    /// Registers slash commands in this guild only, which takes effect immediately.
    pub guild: Option<GuildId>,
    pub slash_commands: bool,
}

pub async fn run_bot<L: Locator + Send + Sync + 'static>(
    locator: L,
    token: String,
    intents: serenity::GatewayIntents,
    options: BotOptions,
) -> Result<(), Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::enabled_commands(),
            // text commands go through the dispatcher, not poise
            prefix_options: PrefixFrameworkOptions {
                mention_as_prefix: false,
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, locator| {
                Box::pin(event_handler(ctx, event, framework, locator))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(user = %ready.user.name, "Connected to Discord");

                if options.slash_commands {
                    let mut slash_commands =
                        poise::builtins::create_application_commands(&framework.options().commands);
                    slash_commands.extend(slash::create_commands(
                        locator.get_dispatch_port().catalogue(),
                    ));
                    let count = slash_commands.len();

                    match options.guild {
                        Some(guild) => {
                            guild.set_commands(ctx, slash_commands).await?;
                        }
                        None => {
                            serenity::Command::set_global_commands(ctx, slash_commands).await?;
                        }
                    }
                    info!(
                        guild_id = options.guild.map(|guild| guild.get()),
                        count, "Slash commands registered"
                    );
                }

                Ok(locator)
            })
        })
        .build();

    let mut client = ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;
    client.start().await?;

    Ok(())
}

async fn on_error<L: Send + Sync>(error: FrameworkError<'_, L, Error>) {
    match error {
        // catalogue commands are answered by the event handler
        FrameworkError::UnknownInteraction { .. } => {}
        error => {
            if let Err(error) = poise::builtins::on_error(error).await {
                error!(error = %error, "Failed to handle framework error");
            }
        }
    }
}

async fn event_handler<L: Locator>(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, L, Error>,
    locator: &L,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } if !new_message.author.bot => {
            handle_message(ctx, new_message, framework.bot_id, locator).await
        }
        serenity::FullEvent::InteractionCreate {
            interaction: Interaction::Command(interaction),
        } => {
            let is_framework_command = framework
                .options()
                .commands
                .iter()
                .any(|command| command.name == interaction.data.name);
            if is_framework_command {
                return Ok(());
            }
            handle_interaction(ctx, interaction, locator).await
        }
        _ => Ok(()),
    }
}

#[instrument(level = "debug", skip_all, fields(channel_id = message.channel_id.get()))]
async fn handle_message<L: Locator>(
    ctx: &serenity::Context,
    message: &Message,
    bot_id: serenity::UserId,
    locator: &L,
) -> Result<(), Error> {
    let inbound = InboundMessage {
        content: message.content.clone(),
        channel: ChannelId(message.channel_id.get()),
        author: Author {
            id: UserId(message.author.id.get()),
            display_name: message.author.display_name().to_string(),
        },
        bot_id: UserId(bot_id.get()),
    };

    let Some(reply) = locator.get_dispatch_port().dispatch_message(inbound).await else {
        return Ok(());
    };

    for reply in response::create_replies(reply) {
        let reply = reply.to_prefix(MessageReference::from(message));
        message.channel_id.send_message(ctx, reply).await?;
    }

    Ok(())
}

#[instrument(level = "debug", skip_all, fields(command = %interaction.data.name))]
async fn handle_interaction<L: Locator>(
    ctx: &serenity::Context,
    interaction: &CommandInteraction,
    locator: &L,
) -> Result<(), Error> {
    // upstream calls may take longer than the three seconds Discord waits
    interaction.defer(ctx).await?;

    let inbound = slash::inbound_interaction(interaction);
    let replies = match locator.get_dispatch_port().dispatch_interaction(inbound).await {
        Some(reply) => response::create_replies(reply),
        None => {
            warn!("Received an interaction for a command that is not registered");
            vec![response::unavailable::unknown_command()]
        }
    };

    for reply in replies {
        send_followup(ctx, interaction, reply).await?;
    }

    Ok(())
}

async fn send_followup(
    ctx: &serenity::Context,
    interaction: &CommandInteraction,
    reply: CreateReply,
) -> Result<(), Error> {
    let followup = reply.to_slash_followup_response(CreateInteractionResponseFollowup::new());
    interaction.create_followup(ctx, followup).await?;

    Ok(())
}
