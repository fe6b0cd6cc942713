use crate::args::CommonArgs;
use crate::locator::ApplicationPortLocator;
use anyhow::anyhow;
use application::catalogue::{catalogue, CommandDependencies};
use application::dispatcher::Dispatcher;
use clap::Args;
use domain::poll::PollStore;
use domain::ports::game_deal::GameDealPort;
use infrastructure::awesomenauts::AwesomenautsAdapter;
use infrastructure::browser::{BrowserOptions, HeadlessBrowser};
use infrastructure::host::SysinfoAdapter;
use infrastructure::isthereanydeal::IsThereAnyDealAdapter;
use infrastructure::jokes::joke_sources;
use infrastructure::xkcd::XkcdAdapter;
use poise::serenity_prelude as serenity;
use presentation::discord::{run_bot, BotOptions};
use serenity::GuildId;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Args)]
pub struct ServeArgs {
    /// The token for the Discord bot
    #[arg(env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_bot_token: String,
    /// The text that starts a command in a message
    #[arg(long, env = "COMMAND_PREFIX", default_value = "!")]
    pub prefix: String,
    /// Registers slash commands in this guild only instead of globally
    #[arg(long, env = "DISCORD_GUILD_ID")]
    pub guild: Option<u64>,
    /// API key for IsThereAnyDeal.com; the gamedeal command is disabled without it
    #[arg(long, env = "ISTHEREANYDEAL_TOKEN", hide_env_values = true)]
    pub isthereanydeal_token: Option<String>,
    /// Timeout of every request to an external service
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 5)]
    pub http_timeout_secs: u64,
    /// How long a command stays disabled after its service fails
    #[arg(long, env = "COOLDOWN_SECS", default_value_t = 300)]
    pub cooldown_secs: i64,
    /// Colour of the side bar of embeds
    #[arg(long, env = "EMBED_COLOUR", default_value_t = 0xffffff)]
    pub embed_colour: u32,
    /// Leaderboard page with `{player}` in place of the player name
    #[arg(
        long,
        env = "AWESOMENAUTS_URL",
        default_value = "https://orikaru.net/nautsrankings#//rank/asc/{player}//"
    )]
    pub awesomenauts_url: String,
    /// Chromium binary used to render the leaderboard, looked up on the PATH by default
    #[arg(long, env = "BROWSER_EXECUTABLE")]
    pub browser_executable: Option<PathBuf>,
    /// Extra Chromium argument, e.g. `--no-sandbox`; may be repeated
    #[arg(long = "browser-arg", env = "BROWSER_ARGS", value_delimiter = ',', allow_hyphen_values = true)]
    pub browser_args: Vec<String>,
    /// Answers text commands only
    #[arg(long)]
    pub no_slash_commands: bool,
}

#[instrument(level = "trace", skip(_common_args, args))]
pub async fn run(_common_args: CommonArgs, args: ServeArgs) -> anyhow::Result<()> {
    let ServeArgs {
        discord_bot_token,
        prefix,
        guild,
        isthereanydeal_token,
        http_timeout_secs,
        cooldown_secs,
        embed_colour,
        awesomenauts_url,
        browser_executable,
        browser_args,
        no_slash_commands,
    } = args;
    let timeout = Duration::from_secs(http_timeout_secs);
    let cooldown = chrono::Duration::try_seconds(cooldown_secs)
        .ok_or_else(|| anyhow!("cooldown of {cooldown_secs} seconds is out of range"))?;

    let game_deals = match isthereanydeal_token {
        Some(token) => {
            let adapter: Arc<dyn GameDealPort + Send + Sync> =
                Arc::new(IsThereAnyDealAdapter::new(token, timeout)?);
            Some(adapter)
        }
        None => {
            info!("No IsThereAnyDeal.com token, the gamedeal command is disabled");
            None
        }
    };

    let browser = HeadlessBrowser::new(
        BrowserOptions {
            executable: browser_executable,
            args: browser_args,
        },
        timeout,
    );

    let registry = catalogue(CommandDependencies {
        joke_sources: joke_sources(timeout)?,
        comics: Arc::new(XkcdAdapter::new(timeout)?),
        rankings: Arc::new(AwesomenautsAdapter::new(awesomenauts_url, browser)?),
        game_deals,
        polls: Arc::new(PollStore::new()),
        host: Arc::new(SysinfoAdapter::new()),
        embed_colour,
        cooldown,
    })?;
    let dispatcher = Arc::new(Dispatcher::new(registry, prefix));
    let locator = ApplicationPortLocator::new(dispatcher);

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;
    let options = BotOptions {
        guild: guild.map(GuildId::new),
        slash_commands: !no_slash_commands,
    };

    let bot = tokio::spawn(run_bot(locator, discord_bot_token, intents, options));
    bot.await?.map_err(|e| anyhow!(e))?;

    Ok(())
}
