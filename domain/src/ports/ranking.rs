use crate::ports::UpstreamError;
use async_trait::async_trait;

/// One leaderboard row. Values are kept as the leaderboard prints them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingRow {
    pub rank: String,
    pub name: String,
    pub rating: String,
    pub win_rate: String,
    pub games_season: String,
    pub games_total: String,
    pub league: Option<String>,
    pub league_image: Option<String>,
    pub favourite_naut: Option<String>,
    pub country: Option<String>,
    pub steam_url: Option<String>,
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait RankingPort {
    /// `None` when the player is not on the leaderboard.
    async fn fetch_ranking_row(&self, player: &str) -> Result<Option<RankingRow>, UpstreamError>;
}
