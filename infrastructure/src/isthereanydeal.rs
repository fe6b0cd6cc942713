//! IsThereAnyDeal: resolves a title to its identifier ("plain"), then gathers
//! game info, current prices and the historical low for it.

use crate::http::{json_headers, ExternalApi, ExternalApiError};
use async_trait::async_trait;
use domain::ports::game_deal::{GameDeal, GameDealPort, HistoricalLow, ShopPrice, SteamReview};
use domain::ports::UpstreamError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://api.isthereanydeal.com/";
const REGION: &str = "eu2";
const COUNTRY: &str = "PT";
const CURRENCY: &str = "€";

#[derive(Deserialize, Debug)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize, Debug, Default)]
struct Plain {
    #[serde(default)]
    plain: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GameInfo {
    title: Option<String>,
    image: Option<String>,
    #[serde(default)]
    is_dlc: bool,
    #[serde(default)]
    reviews: Option<Reviews>,
    #[serde(default)]
    urls: Option<Urls>,
}

#[derive(Deserialize, Debug)]
struct Reviews {
    steam: Option<SteamReviewResponse>,
}

#[derive(Deserialize, Debug)]
struct SteamReviewResponse {
    perc_positive: u8,
    total: u64,
    text: String,
}

#[derive(Deserialize, Debug)]
struct Urls {
    game: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Prices {
    #[serde(default)]
    list: Vec<PriceResponse>,
}

#[derive(Deserialize, Debug)]
struct PriceResponse {
    price_new: f64,
    price_old: f64,
    price_cut: u8,
    url: String,
    shop: Shop,
    #[serde(default)]
    drm: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct Shop {
    name: String,
}

#[derive(Deserialize, Debug)]
struct Lowest {
    price: Option<f64>,
    shop: Option<Shop>,
}

/// `{"error": "...", "error_description": "..."}` on any endpoint.
fn itad_error(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error")?.as_str()?;
    let description = body
        .get("error_description")
        .and_then(|description| description.as_str())
        .unwrap_or_default();
    Some(format!("{error}: {description}"))
}

/// The plain endpoint answers `"data": []` when nothing matches.
fn parse_plain(data: serde_json::Value) -> Option<String> {
    serde_json::from_value::<Plain>(data)
        .unwrap_or_default()
        .plain
        .filter(|plain| !plain.is_empty())
}

fn into_game_deal(
    plain: &str,
    mut info: HashMap<String, GameInfo>,
    mut prices: HashMap<String, Prices>,
    mut lowest: HashMap<String, Lowest>,
) -> Result<GameDeal, UpstreamError> {
    let info = info.remove(plain).ok_or_else(|| UpstreamError::Malformed {
        service: "IsThereAnyDeal".to_string(),
        detail: format!("no game info for `{plain}`"),
    })?;
    let prices = prices.remove(plain).map(|prices| prices.list).unwrap_or_default();
    let historical_low = lowest
        .remove(plain)
        .and_then(|lowest| Some((lowest.price?, lowest.shop?)))
        .map(|(price, shop)| HistoricalLow {
            shop: shop.name,
            price,
        });

    Ok(GameDeal {
        title: info.title.unwrap_or_else(|| plain.to_string()),
        url: info.urls.and_then(|urls| urls.game),
        image: info.image,
        is_dlc: info.is_dlc,
        review: info.reviews.and_then(|reviews| reviews.steam).map(|steam| SteamReview {
            summary: steam.text,
            total: steam.total,
            positive_percent: steam.perc_positive,
        }),
        prices: prices
            .into_iter()
            .map(|price| ShopPrice {
                shop: price.shop.name,
                url: price.url,
                price_old: price.price_old,
                price_new: price.price_new,
                cut: price.price_cut,
                drm: price.drm,
            })
            .collect(),
        historical_low,
        currency: CURRENCY.to_string(),
    })
}

pub struct IsThereAnyDealAdapter {
    api: ExternalApi,
    api_key: String,
}

impl IsThereAnyDealAdapter {
    #[instrument(level = "trace", skip(api_key))]
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ExternalApiError> {
        let api = ExternalApi::new("IsThereAnyDeal", BASE_URL, json_headers(), timeout)?
            .with_error_parser(itad_error);

        Ok(Self { api, api_key })
    }

    async fn data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let mut pairs = vec![("key", self.api_key.as_str())];
        pairs.extend_from_slice(query);
        let url = self.api.endpoint(path, &pairs)?;

        let envelope: Envelope<T> = self.api.get_json(url).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl GameDealPort for IsThereAnyDealAdapter {
    #[instrument(level = "debug", skip(self))]
    async fn find_deal(&self, title: &str) -> Result<Option<GameDeal>, UpstreamError> {
        let plain = parse_plain(self.data("v02/game/plain/", &[("title", title)]).await?);
        let Some(plain) = plain else {
            debug!(title, "No game matches the title");
            return Ok(None);
        };

        let regional = [("plains", plain.as_str()), ("region", REGION), ("country", COUNTRY)];
        let info = self.data("v01/game/info/", &[("plains", plain.as_str())]).await?;
        let prices = self.data("v01/game/prices/", &regional).await?;
        let lowest = self.data("v01/game/lowest/", &regional).await?;

        into_game_deal(&plain, info, prices, lowest).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data<T: DeserializeOwned>(body: serde_json::Value) -> T {
        serde_json::from_value::<Envelope<T>>(body).unwrap().data
    }

    #[test]
    fn plain_is_read_or_missing() {
        assert_eq!(
            parse_plain(json!({"plain": "portalii"})).as_deref(),
            Some("portalii")
        );
        assert_eq!(parse_plain(json!([])), None);
        assert_eq!(parse_plain(json!({"plain": ""})), None);
    }

    #[test]
    fn assembles_deal_from_the_three_endpoints() {
        let info = data(json!({"data": {"portalii": {
            "title": "Portal 2",
            "image": "https://cdn.example.org/portal2.jpg",
            "is_dlc": false,
            "reviews": {"steam": {"perc_positive": 98, "total": 300000, "text": "Overwhelmingly Positive"}},
            "urls": {"game": "https://isthereanydeal.com/game/portalii/info/"}
        }}}));
        let prices = data(json!({"data": {"portalii": {"list": [
            {"price_new": 0.97, "price_old": 9.75, "price_cut": 90,
             "url": "https://store.steampowered.com/app/620/",
             "shop": {"id": "steam", "name": "Steam"}, "drm": ["steam"]},
            {"price_new": 9.99, "price_old": 9.99, "price_cut": 0,
             "url": "https://www.gog.com/game/portal_2",
             "shop": {"id": "gog", "name": "GOG"}, "drm": []}
        ]}}}));
        let lowest = data(json!({"data": {"portalii": {
            "shop": {"id": "steam", "name": "Steam"}, "price": 0.81, "cut": 92, "added": 1609459200
        }}}));

        let deal = into_game_deal("portalii", info, prices, lowest).unwrap();

        assert_eq!(deal.title, "Portal 2");
        assert_eq!(deal.prices.len(), 2);
        assert_eq!(deal.prices[0].shop, "Steam");
        assert_eq!(deal.prices[0].cut, 90);
        assert_eq!(deal.prices[1].drm, Vec::<String>::new());
        assert_eq!(
            deal.historical_low,
            Some(HistoricalLow {
                shop: "Steam".into(),
                price: 0.81
            })
        );
        assert_eq!(deal.review.unwrap().positive_percent, 98);
        assert_eq!(deal.currency, "€");
    }

    #[test]
    fn game_without_prices_or_low_still_has_info() {
        let info = data(json!({"data": {"x": {"title": "X", "image": null}}}));

        let deal = into_game_deal("x", info, HashMap::new(), HashMap::new()).unwrap();

        assert!(deal.prices.is_empty());
        assert_eq!(deal.historical_low, None);
        assert_eq!(deal.review, None);
    }

    #[test]
    fn missing_info_is_malformed() {
        let error = into_game_deal("x", HashMap::new(), HashMap::new(), HashMap::new()).unwrap_err();
        assert!(matches!(error, UpstreamError::Malformed { .. }));
    }

    #[test]
    fn error_body_is_recognised() {
        assert_eq!(
            itad_error(&json!({"error": "invalid_key", "error_description": "Invalid API key"}))
                .as_deref(),
            Some("invalid_key: Invalid API key")
        );
        assert_eq!(itad_error(&json!({"data": {}})), None);
    }
}
