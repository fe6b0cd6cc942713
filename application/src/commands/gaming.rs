use async_trait::async_trait;
use chrono::Duration;
use domain::command::{
    handler_fn, help, Arguments, Arity, Category, Coercer, CommandDescriptor, CommandError,
    CommandHandler, DuplicateCommandError, ErrorKind, ErrorTable, Invocation,
};
use domain::ports::game_deal::{GameDeal, GameDealPort, ShopPrice};
use domain::ports::ranking::{RankingPort, RankingRow};
use domain_shared::reply::{Embed, Reply, EMBED_FIELD_LIMIT};
use std::sync::Arc;
use tracing::instrument;

/// Fields left for prices once the other embed fields are in.
const MAX_PRICE_FIELDS: usize = 5;

/// Every playable naut, sorted by name.
const AWESOMENAUTS: [&str; 32] = [
    "Admiral Swiggins",
    "Ayla",
    "Chucho Krokk",
    "Clunk",
    "Coco Nebulon",
    "Commander Rocco",
    "Deadlift",
    "Derpl Zork",
    "Dizzy",
    "Froggy G",
    "Genji the Pollen Prophet",
    "Gnaw",
    "Ix the Interloper",
    "Jimmy and the LUX5000",
    "Leon Chameleon",
    "Lonestar",
    "Max Focus",
    "Nibbs",
    "Penny Fox",
    "Professor Milton Yoolip",
    "Qitara",
    "Raelynn",
    "Scoop",
    "Sentry X-58",
    "Skree",
    "Skølldir",
    "Smiles",
    "Snork Gunk",
    "Ted McPain",
    "Vinnie & Spike",
    "Voltar the Omniscient",
    "Yuri",
];

pub struct RankHandler {
    rankings: Arc<dyn RankingPort + Send + Sync>,
    embed_colour: u32,
}

#[async_trait]
impl CommandHandler for RankHandler {
    #[instrument(level = "debug", skip_all)]
    async fn handle(
        &self,
        _invocation: &Invocation<'_>,
        arguments: Arguments,
    ) -> Result<Reply, CommandError> {
        let player = arguments.texts_from(0)?.join(" ");

        match self.rankings.fetch_ranking_row(&player).await? {
            Some(row) => Ok(ranking_embed(&row, self.embed_colour).into()),
            None => Ok(Reply::text(format!(
                "Can't retrieve player `{player}`, because they're not on the leaderboard."
            ))),
        }
    }
}

fn ranking_embed(row: &RankingRow, colour: u32) -> Embed {
    let mut embed = Embed::default()
        .title(&row.name)
        .colour(colour)
        .field("🥇 RANK", &row.rank, true)
        .field("🌟 RATING", &row.rating, true)
        .field(
            "📈 GAMES PLAYED",
            format!("{} (season) / {} (all)", row.games_season, row.games_total),
            true,
        )
        .field("🏆 WIN RATE", &row.win_rate, true);

    if let Some(naut) = &row.favourite_naut {
        embed = embed.field("❤️ FAVOURITE NAUT", naut, true);
    }
    if let Some(league) = &row.league {
        embed = embed.field("🏅 LEAGUE", league, true);
    }
    if let Some(country) = &row.country {
        embed = embed.field("🌍 COUNTRY", country, true);
    }
    if let Some(image) = &row.league_image {
        embed = embed.thumbnail(image);
    }
    if let Some(steam) = &row.steam_url {
        embed = embed.url(steam);
    }
    embed
}

pub struct GameDealHandler {
    deals: Arc<dyn GameDealPort + Send + Sync>,
    embed_colour: u32,
}

#[async_trait]
impl CommandHandler for GameDealHandler {
    #[instrument(level = "debug", skip_all)]
    async fn handle(
        &self,
        _invocation: &Invocation<'_>,
        arguments: Arguments,
    ) -> Result<Reply, CommandError> {
        let title = arguments.texts_from(0)?.join(" ");

        match self.deals.find_deal(&title).await? {
            Some(deal) => Ok(deal_embed(&deal, self.embed_colour).into()),
            None => Ok(Reply::text(format!("Could not find game `{title}`."))),
        }
    }
}

fn price_line(price: &ShopPrice, currency: &str) -> String {
    let mut line = if price.cut > 0 {
        format!(
            "[{}]({}): ~~{:.2}{currency}~~ **{:.2}{currency}** (-{}%)",
            price.shop, price.url, price.price_old, price.price_new, price.cut
        )
    } else {
        format!(
            "[{}]({}): **{:.2}{currency}**",
            price.shop, price.url, price.price_new
        )
    };
    if !price.drm.is_empty() {
        line.push_str(&format!(" DRM: {}", price.drm.join(", ")));
    }
    line
}

/// Groups lines into chunks that each fit one embed field.
fn chunk_lines(lines: &[String], limit: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    for line in lines {
        match chunks.last_mut() {
            Some(chunk) if chunk.len() + 1 + line.len() <= limit => {
                chunk.push('\n');
                chunk.push_str(line);
            }
            _ => chunks.push(line.chars().take(limit).collect()),
        }
    }
    chunks
}

fn deal_embed(deal: &GameDeal, colour: u32) -> Embed {
    let title = if deal.is_dlc {
        format!("{} (DLC)", deal.title)
    } else {
        deal.title.clone()
    };
    let mut embed = Embed::default().title(title).colour(colour);

    if let Some(url) = &deal.url {
        embed = embed.url(url);
    }
    if let Some(image) = &deal.image {
        embed = embed.image(image);
    }
    if let Some(review) = &deal.review {
        embed = embed.description(format!(
            "Steam reviews: **{}** ({}% of {} positive)",
            review.summary, review.positive_percent, review.total
        ));
    }

    let lines: Vec<String> = deal
        .prices
        .iter()
        .map(|price| price_line(price, &deal.currency))
        .collect();
    if lines.is_empty() {
        embed = embed.field("💰 PRICES", "No shop sells this game right now.", false);
    }
    for (index, chunk) in chunk_lines(&lines, EMBED_FIELD_LIMIT)
        .into_iter()
        .take(MAX_PRICE_FIELDS)
        .enumerate()
    {
        let name = if index == 0 { "💰 PRICES" } else { "💰 PRICES (cont.)" };
        embed = embed.field(name, chunk, false);
    }

    if let Some(low) = &deal.historical_low {
        embed = embed.field(
            "📉 HISTORICAL LOW",
            format!("**{:.2}{}** at {}", low.price, deal.currency, low.shop),
            false,
        );
    }
    embed
}

/// One field per initial letter.
fn roster_embed(colour: u32) -> Embed {
    let mut groups: Vec<(char, Vec<&str>)> = Vec::new();
    for naut in AWESOMENAUTS {
        let initial = naut.chars().next().unwrap_or('?').to_ascii_uppercase();
        match groups.last_mut() {
            Some((letter, names)) if *letter == initial => names.push(naut),
            _ => groups.push((initial, vec![naut])),
        }
    }

    groups
        .into_iter()
        .fold(
            Embed::default().title("Awesomenauts").colour(colour),
            |embed, (letter, names)| embed.field(format!("- {letter} -"), names.join("\n"), true),
        )
        .footer(format!(
            "There currently are {} Awesomenauts",
            AWESOMENAUTS.len()
        ))
}

pub fn awesomenauts_descriptor(
    rankings: Arc<dyn RankingPort + Send + Sync>,
    embed_colour: u32,
    cooldown: Duration,
) -> Result<CommandDescriptor, DuplicateCommandError> {
    CommandDescriptor::new(
        "awesomenauts",
        handler_fn(|invocation, _| {
            Ok(help::render(
                invocation.registry,
                invocation.prefix,
                &[invocation.command.name()],
            ))
        }),
        ErrorTable::new()
            .usage("`{command}` needs a subcommand (use `{prefix}help awesomenauts` for more info).")
            .on(
                ErrorKind::UpstreamUnavailable,
                "Can't retrieve Awesomenauts rankings at the moment.",
            )
            .on(
                ErrorKind::MalformedResponse,
                "The Awesomenauts leaderboard changed its layout, `{command}` is temporarily broken.",
            ),
    )
    .aliases(["naut", "nauts"])
    .category(Category::Gaming)
    .help("Awesomenauts related commands.")
    .circuit_breaker(cooldown)
    .subcommand(
        CommandDescriptor::new(
            "rank",
            Arc::new(RankHandler {
                rankings,
                embed_colour,
            }),
            ErrorTable::new().usage("`{command}` takes the name of a player."),
        )
        .aliases(["r", "-r"])
        .help("Shows the leaderboard stats of a player.")
        .arity(Arity::AtLeast(1))
        .parameter("player", "Player name", Coercer::Text),
    )?
    .subcommand(
        CommandDescriptor::new(
            "list",
            handler_fn(move |_, _| Ok(roster_embed(embed_colour).into())),
            ErrorTable::new().usage("`{command}` takes no arguments."),
        )
        .aliases(["l", "-l"])
        .help("Lists every Awesomenaut alphabetically."),
    )
}

pub fn game_deal_descriptor(
    deals: Arc<dyn GameDealPort + Send + Sync>,
    embed_colour: u32,
    cooldown: Duration,
) -> CommandDescriptor {
    CommandDescriptor::new(
        "gamedeal",
        Arc::new(GameDealHandler {
            deals,
            embed_colour,
        }),
        ErrorTable::new()
            .usage("`{command}` takes the name of a game.")
            .on(
                ErrorKind::UpstreamUnavailable,
                "Sorry, couldn't reach IsThereAnyDeal.com right now.",
            )
            .on(
                ErrorKind::UpstreamRejected,
                "Sorry, got an error from IsThereAnyDeal.com.",
            )
            .on(
                ErrorKind::MalformedResponse,
                "Got a bad response from IsThereAnyDeal.com, `{command}` is temporarily broken.",
            ),
    )
    .aliases(["deal"])
    .category(Category::Gaming)
    .help("Compares the current prices of a game across shops.")
    .arity(Arity::AtLeast(1))
    .parameter("game", "Name of the game", Coercer::Text)
    .circuit_breaker(cooldown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{author, dispatcher_with, reply_as, text_reply};
    use domain::ports::game_deal::{HistoricalLow, MockGameDealPort, SteamReview};
    use domain::ports::ranking::MockRankingPort;
    use domain::ports::UpstreamError;
    use mockall::predicate::eq;

    fn row() -> RankingRow {
        RankingRow {
            rank: "12".into(),
            name: "Froggy Fan".into(),
            rating: "2011".into(),
            win_rate: "61%".into(),
            games_season: "120".into(),
            games_total: "3400".into(),
            league: Some("Diamond".into()),
            league_image: Some("https://example.org/diamond.png".into()),
            favourite_naut: Some("Froggy G".into()),
            country: None,
            steam_url: Some("https://steamcommunity.com/id/froggy".into()),
        }
    }

    fn nauts(rankings: MockRankingPort) -> crate::dispatcher::Dispatcher {
        dispatcher_with(vec![awesomenauts_descriptor(
            Arc::new(rankings),
            0,
            Duration::minutes(5),
        )
        .unwrap()])
    }

    #[tokio::test]
    async fn rank_joins_player_name_and_renders_embed() {
        let mut rankings = MockRankingPort::new();
        rankings
            .expect_fetch_ranking_row()
            .with(eq("Froggy Fan"))
            .times(1)
            .returning(|_| Ok(Some(row())));

        let reply = reply_as(&nauts(rankings), author(1, "alice"), "!nauts rank Froggy Fan").await;

        let Reply::Embed(embed) = reply else {
            panic!("expected an embed, got {reply:?}");
        };
        assert_eq!(embed.title.as_deref(), Some("Froggy Fan"));
        assert_eq!(embed.fields[0].value, "12");
        assert_eq!(embed.fields[2].value, "120 (season) / 3400 (all)");
        assert_eq!(embed.thumbnail.as_deref(), Some("https://example.org/diamond.png"));
        assert!(embed.fields.iter().all(|field| field.name != "🌍 COUNTRY"));
    }

    #[tokio::test]
    async fn rank_of_unknown_player_is_a_plain_reply() {
        let mut rankings = MockRankingPort::new();
        rankings.expect_fetch_ranking_row().returning(|_| Ok(None));

        assert_eq!(
            text_reply(&nauts(rankings), "!naut r nobody").await,
            "Can't retrieve player `nobody`, because they're not on the leaderboard."
        );
    }

    #[tokio::test]
    async fn scrape_timeout_is_unavailable() {
        let mut rankings = MockRankingPort::new();
        rankings.expect_fetch_ranking_row().times(1).returning(|_| {
            Err(UpstreamError::Timeout {
                service: "orikaru.net".into(),
            })
        });
        let dispatcher = nauts(rankings);

        assert_eq!(
            text_reply(&dispatcher, "!awesomenauts rank x").await,
            "Can't retrieve Awesomenauts rankings at the moment."
        );
        assert!(text_reply(&dispatcher, "!awesomenauts rank x")
            .await
            .contains("temporarily disabled"));
    }

    #[tokio::test]
    async fn group_without_subcommand_shows_its_help() {
        let reply = reply_as(&nauts(MockRankingPort::new()), author(1, "alice"), "!awesomenauts").await;
        let Reply::Pages(pages) = reply else {
            panic!("expected help pages, got {reply:?}");
        };
        assert!(pages[0].contains("!awesomenauts rank | r | -r <player>..."));
        assert!(pages[0].contains("!awesomenauts list | l | -l"));
    }

    #[tokio::test]
    async fn list_groups_nauts_by_initial() {
        let reply = reply_as(&nauts(MockRankingPort::new()), author(1, "alice"), "!nauts -l").await;
        let Reply::Embed(embed) = reply else {
            panic!("expected an embed, got {reply:?}");
        };

        assert_eq!(embed.fields[0].name, "- A -");
        assert_eq!(embed.fields[0].value, "Admiral Swiggins\nAyla");
        assert!(embed
            .fields
            .iter()
            .any(|field| field.name == "- V -" && field.value == "Vinnie & Spike\nVoltar the Omniscient"));
        assert_eq!(embed.fields.len(), 17);
        assert_eq!(
            embed.footer.map(|footer| footer.text).as_deref(),
            Some("There currently are 32 Awesomenauts")
        );
    }

    #[test]
    fn roster_is_sorted() {
        assert!(AWESOMENAUTS.windows(2).all(|pair| pair[0] < pair[1]));
    }

    fn deal() -> GameDeal {
        GameDeal {
            title: "Portal 2".into(),
            url: Some("https://isthereanydeal.com/game/portal-ii/".into()),
            image: None,
            is_dlc: false,
            review: Some(SteamReview {
                summary: "Overwhelmingly Positive".into(),
                total: 300_000,
                positive_percent: 98,
            }),
            prices: vec![
                ShopPrice {
                    shop: "Steam".into(),
                    url: "https://store.steampowered.com/app/620".into(),
                    price_old: 9.75,
                    price_new: 0.97,
                    cut: 90,
                    drm: vec!["Steam".into()],
                },
                ShopPrice {
                    shop: "GOG".into(),
                    url: "https://gog.com/portal2".into(),
                    price_old: 9.99,
                    price_new: 9.99,
                    cut: 0,
                    drm: Vec::new(),
                },
            ],
            historical_low: Some(HistoricalLow {
                shop: "Steam".into(),
                price: 0.81,
            }),
            currency: "€".into(),
        }
    }

    #[tokio::test]
    async fn game_deal_lists_prices_and_low() {
        let mut deals = MockGameDealPort::new();
        deals
            .expect_find_deal()
            .with(eq("portal 2"))
            .returning(|_| Ok(Some(deal())));
        let dispatcher = dispatcher_with(vec![game_deal_descriptor(
            Arc::new(deals),
            0,
            Duration::minutes(5),
        )]);

        let reply = reply_as(&dispatcher, author(1, "alice"), "!deal portal 2").await;

        let Reply::Embed(embed) = reply else {
            panic!("expected an embed, got {reply:?}");
        };
        assert_eq!(
            embed.fields[0].value,
            "[Steam](https://store.steampowered.com/app/620): ~~9.75€~~ **0.97€** (-90%) DRM: Steam\n\
             [GOG](https://gog.com/portal2): **9.99€**"
        );
        assert_eq!(embed.fields[1].value, "**0.81€** at Steam");
        assert!(embed.description.unwrap().contains("98% of 300000"));
    }

    #[tokio::test]
    async fn game_deal_upstream_errors_are_distinguished() {
        let mut deals = MockGameDealPort::new();
        deals.expect_find_deal().times(1).returning(|_| {
            Err(UpstreamError::Rejected {
                service: "IsThereAnyDeal".into(),
                reason: "invalid key".into(),
            })
        });
        deals.expect_find_deal().returning(|_| Ok(None));
        let dispatcher = dispatcher_with(vec![game_deal_descriptor(
            Arc::new(deals),
            0,
            Duration::minutes(5),
        )]);

        assert_eq!(
            text_reply(&dispatcher, "!gamedeal x").await,
            "Sorry, got an error from IsThereAnyDeal.com."
        );
        assert_eq!(
            text_reply(&dispatcher, "!gamedeal x").await,
            "Could not find game `x`."
        );
    }

    #[test]
    fn long_price_lists_are_chunked_per_field() {
        let lines: Vec<String> = (0..100).map(|i| format!("{i:03} {}", "x".repeat(40))).collect();

        let chunks = chunk_lines(&lines, EMBED_FIELD_LIMIT);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| chunk.len() <= EMBED_FIELD_LIMIT));
        assert_eq!(chunks.join("\n"), lines.join("\n"));
    }
}
