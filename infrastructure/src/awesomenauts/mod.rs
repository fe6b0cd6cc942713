mod selectors;

use crate::browser::HeadlessBrowser;
use async_trait::async_trait;
use domain::ports::ranking::{RankingPort, RankingRow};
use domain::ports::UpstreamError;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

const SERVICE: &str = "Awesomenauts leaderboard";
const PLACEHOLDER: &str = "{player}";

#[derive(Debug, Error)]
pub enum LeaderboardUrlError {
    #[error("leaderboard URL `{0}` has no `{{player}}` placeholder")]
    MissingPlaceholder(String),
    #[error("invalid leaderboard URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Reads the first (best ranked) leaderboard row matching a player name.
///
/// The leaderboard is rendered by its own scripts from the URL fragment, so
/// pages are loaded in a headless browser. `{player}` in `url_template` is
/// replaced with the URL encoded player name.
pub struct AwesomenautsAdapter {
    browser: HeadlessBrowser,
    url_template: String,
}

impl AwesomenautsAdapter {
    #[instrument(level = "trace", skip(browser))]
    pub fn new(url_template: String, browser: HeadlessBrowser) -> Result<Self, LeaderboardUrlError> {
        if !url_template.contains(PLACEHOLDER) {
            return Err(LeaderboardUrlError::MissingPlaceholder(url_template));
        }
        let adapter = Self {
            browser,
            url_template,
        };
        adapter.player_url("player")?;

        Ok(adapter)
    }

    fn player_url(&self, player: &str) -> Result<Url, LeaderboardUrlError> {
        let encoded = url::form_urlencoded::byte_serialize(player.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        let url = self.url_template.replace(PLACEHOLDER, &encoded);

        Url::parse(&url).map_err(|source| LeaderboardUrlError::InvalidUrl { url, source })
    }
}

#[async_trait]
impl RankingPort for AwesomenautsAdapter {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_ranking_row(&self, player: &str) -> Result<Option<RankingRow>, UpstreamError> {
        let url = self
            .player_url(player)
            .map_err(|err| UpstreamError::Unreachable {
                service: SERVICE.to_string(),
                reason: err.to_string(),
            })?;

        let row = self
            .browser
            .render(SERVICE, &url, |page| match parse_leaderboard(page)? {
                Leaderboard::Loading => Ok(None),
                Leaderboard::NoResult => Ok(Some(None)),
                Leaderboard::Player(row) => Ok(Some(Some(row))),
            })
            .await?;

        if row.is_none() {
            debug!(player, "Player is not on the leaderboard");
        }
        Ok(row)
    }
}

/// What a snapshot of the leaderboard page shows.
#[derive(Debug, PartialEq)]
enum Leaderboard {
    Loading,
    NoResult,
    Player(RankingRow),
}

fn malformed(detail: impl Into<String>) -> UpstreamError {
    UpstreamError::Malformed {
        service: SERVICE.to_string(),
        detail: detail.into(),
    }
}

fn selector(css: &str) -> Result<Selector, UpstreamError> {
    Selector::parse(css).map_err(|err| malformed(format!("invalid selector `{css}`: {err}")))
}

fn text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_leaderboard(page: &str) -> Result<Leaderboard, UpstreamError> {
    let document = Html::parse_document(page);
    let (rows, cells, link, images, no_result) = (
        selector(selectors::ROWS)?,
        selector(selectors::CELLS)?,
        selector(selectors::PROFILE_LINK)?,
        selector(selectors::IMAGES)?,
        selector(selectors::NO_RESULT)?,
    );

    let Some(row) = document
        .select(&rows)
        .find(|row| row.select(&cells).next().is_some())
    else {
        return Ok(if document.select(&no_result).next().is_some() {
            Leaderboard::NoResult
        } else {
            Leaderboard::Loading
        });
    };

    let cells: Vec<String> = row.select(&cells).map(|cell| text(&cell)).collect();
    let cell = |index: usize| {
        cells
            .get(index)
            .cloned()
            .ok_or_else(|| malformed(format!("leaderboard row has no cell {index}")))
    };
    let images: Vec<(Option<String>, Option<String>)> = row
        .select(&images)
        .map(|image| {
            let attribute = |name: &str| image.value().attr(name).map(str::to_string);
            (attribute("title"), attribute("src"))
        })
        .collect();
    let image_title = |index: usize| images.get(index).and_then(|(title, _)| title.clone());

    Ok(Leaderboard::Player(RankingRow {
        rank: cell(selectors::RANK_CELL)?,
        name: cell(selectors::NAME_CELL)?,
        rating: cell(selectors::RATING_CELL)?,
        win_rate: cell(selectors::WIN_RATE_CELL)?,
        games_season: cell(selectors::GAMES_SEASON_CELL)?,
        games_total: cell(selectors::GAMES_TOTAL_CELL)?,
        league: image_title(0),
        league_image: images.first().and_then(|(_, src)| src.clone()),
        favourite_naut: image_title(1),
        country: image_title(2),
        steam_url: row
            .select(&link)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .map(str::to_string),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserOptions;
    use std::time::Duration;

    const LEADERBOARD: &str = r#"
        <html><body><div id="content-container">
        <table id="leaderboard"><tbody>
          <tr><th>#</th><th>Player</th><th>Win %</th><th>Season</th><th>Total</th><th>League</th><th>Rating</th></tr>
          <tr>
            <td>12 </td>
            <td><a href="https://steamcommunity.com/profiles/76561197960287930">Froggy Fan</a> </td>
            <td>61.5%</td>
            <td>120</td>
            <td>3400</td>
            <td><img title="Diamond" src="https://orikaru.net/img/league/1.png"><img title="Froggy G" src="https://orikaru.net/img/naut/froggy.png"><img title="Portugal" src="https://orikaru.net/img/flag/pt.png"></td>
            <td>2011</td>
          </tr>
          <tr><td>13</td><td>Someone Else</td><td>50%</td><td>1</td><td>2</td><td></td><td>1900</td></tr>
        </tbody></table>
        <div id="no-result" class="hidden">No results</div>
        </div></body></html>"#;

    #[test]
    fn first_player_row_is_read() {
        let row = parse_leaderboard(LEADERBOARD).unwrap();

        assert_eq!(
            row,
            Leaderboard::Player(RankingRow {
                rank: "12".into(),
                name: "Froggy Fan".into(),
                rating: "2011".into(),
                win_rate: "61.5%".into(),
                games_season: "120".into(),
                games_total: "3400".into(),
                league: Some("Diamond".into()),
                league_image: Some("https://orikaru.net/img/league/1.png".into()),
                favourite_naut: Some("Froggy G".into()),
                country: Some("Portugal".into()),
                steam_url: Some("https://steamcommunity.com/profiles/76561197960287930".into()),
            })
        );
    }

    #[test]
    fn visible_no_result_means_not_found() {
        let page = r#"<div id="content-container">
            <table id="leaderboard"><tbody><tr><th>#</th></tr></tbody></table>
            <div id="no-result">No results</div></div>"#;
        assert_eq!(parse_leaderboard(page).unwrap(), Leaderboard::NoResult);
    }

    #[test]
    fn page_without_rows_or_message_is_still_loading() {
        let page = r#"<div id="content-container">
            <table id="leaderboard"><tbody><tr><th>#</th></tr></tbody></table>
            <div id="no-result" class="hidden">No results</div></div>"#;
        assert_eq!(parse_leaderboard(page).unwrap(), Leaderboard::Loading);
    }

    #[test]
    fn truncated_row_is_malformed() {
        let page = r#"<table id="leaderboard"><tbody><tr><td>1</td><td>x</td></tr></tbody></table>"#;
        assert!(matches!(
            parse_leaderboard(page),
            Err(UpstreamError::Malformed { .. })
        ));
    }

    fn adapter(template: &str) -> Result<AwesomenautsAdapter, LeaderboardUrlError> {
        AwesomenautsAdapter::new(
            template.to_string(),
            HeadlessBrowser::new(BrowserOptions::default(), Duration::from_secs(5)),
        )
    }

    #[test]
    fn player_name_is_encoded_into_the_template() {
        let adapter = adapter("https://orikaru.net/nautsrankings#//rank/asc/{player}//").unwrap();

        assert_eq!(
            adapter.player_url("Froggy Fan&co").unwrap().as_str(),
            "https://orikaru.net/nautsrankings#//rank/asc/Froggy%20Fan%26co//"
        );
    }

    #[test]
    fn each_player_gets_their_own_page() {
        let adapter = adapter("https://orikaru.net/nautsrankings#//rank/asc/{player}//").unwrap();

        let first = adapter.player_url("Froggy Fan").unwrap();
        let second = adapter.player_url("Skree").unwrap();

        assert_ne!(first, second);
        assert_eq!(first.fragment(), Some("//rank/asc/Froggy%20Fan//"));
    }

    #[test]
    fn template_must_name_the_player() {
        assert!(matches!(
            adapter("https://orikaru.net/nautsrankings"),
            Err(LeaderboardUrlError::MissingPlaceholder(_))
        ));
        assert!(matches!(
            adapter("not a url/{player}"),
            Err(LeaderboardUrlError::InvalidUrl { .. })
        ));
    }
}
