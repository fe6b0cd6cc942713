use crate::ports::UpstreamError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct GameDeal {
    pub title: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub is_dlc: bool,
    pub review: Option<SteamReview>,
    pub prices: Vec<ShopPrice>,
    pub historical_low: Option<HistoricalLow>,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SteamReview {
    pub summary: String,
    pub total: u64,
    pub positive_percent: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShopPrice {
    pub shop: String,
    pub url: String,
    pub price_old: f64,
    pub price_new: f64,
    pub cut: u8,
    pub drm: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalLow {
    pub shop: String,
    pub price: f64,
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait GameDealPort {
    /// `None` when no game matches `title`.
    async fn find_deal(&self, title: &str) -> Result<Option<GameDeal>, UpstreamError>;
}
