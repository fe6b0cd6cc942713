//! The full command catalogue, registered explicitly at startup.

use crate::commands::{ascii, funny, gaming, general, gifs, help, math, poll, xkcd};
use chrono::Duration;
use domain::command::{DuplicateCommandError, Registry};
use domain::poll::PollStore;
use domain::ports::comic::ComicPort;
use domain::ports::game_deal::GameDealPort;
use domain::ports::host::HostInfoPort;
use domain::ports::joke::JokeSource;
use domain::ports::ranking::RankingPort;
use std::sync::Arc;
use tracing::{info, instrument};

/// Everything the commands need from the outside world.
pub struct CommandDependencies {
    pub joke_sources: Vec<Arc<dyn JokeSource + Send + Sync>>,
    pub comics: Arc<dyn ComicPort + Send + Sync>,
    pub rankings: Arc<dyn RankingPort + Send + Sync>,
    /// `gamedeal` is only registered when a deal source is configured.
    pub game_deals: Option<Arc<dyn GameDealPort + Send + Sync>>,
    pub polls: Arc<PollStore>,
    pub host: Arc<dyn HostInfoPort + Send + Sync>,
    pub embed_colour: u32,
    /// How long a command stays disabled after its upstream went away.
    pub cooldown: Duration,
}

#[instrument(level = "debug", skip_all)]
pub fn catalogue(dependencies: CommandDependencies) -> Result<Registry, DuplicateCommandError> {
    let CommandDependencies {
        joke_sources,
        comics,
        rankings,
        game_deals,
        polls,
        host,
        embed_colour,
        cooldown,
    } = dependencies;

    let mut descriptors = general::descriptors(embed_colour, host);
    descriptors.push(help::descriptor());
    descriptors.extend(math::descriptors()?);
    descriptors.extend(funny::descriptors(joke_sources));
    descriptors.extend(gifs::descriptors(embed_colour));
    descriptors.extend(ascii::descriptors());
    descriptors.push(xkcd::descriptor(comics, embed_colour, cooldown)?);
    descriptors.push(gaming::awesomenauts_descriptor(
        rankings,
        embed_colour,
        cooldown,
    )?);
    if let Some(deals) = game_deals {
        descriptors.push(gaming::game_deal_descriptor(deals, embed_colour, cooldown));
    }
    descriptors.push(poll::descriptor(polls)?);

    let mut registry = Registry::new();
    for descriptor in descriptors {
        registry.register(descriptor)?;
    }
    info!(commands = registry.commands().len(), "Command catalogue registered");

    Ok(registry)
}
