use crate::http::{json_headers, ExternalApi, ExternalApiError};
use async_trait::async_trait;
use domain::ports::comic::{Comic, ComicPort};
use domain::ports::UpstreamError;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

const BASE_URL: &str = "https://xkcd.com/";

#[derive(Deserialize, Debug)]
struct ComicResponse {
    num: u32,
    title: String,
    img: String,
    alt: String,
}

impl From<ComicResponse> for Comic {
    fn from(response: ComicResponse) -> Self {
        Comic {
            number: response.num,
            title: response.title,
            image_url: response.img,
            alt: response.alt,
        }
    }
}

pub struct XkcdAdapter {
    api: ExternalApi,
}

impl XkcdAdapter {
    #[instrument(level = "trace")]
    pub fn new(timeout: Duration) -> Result<Self, ExternalApiError> {
        let api = ExternalApi::new("xkcd.com", BASE_URL, json_headers(), timeout)?;

        Ok(Self { api })
    }

    async fn comic(&self, path: &str) -> Result<Comic, UpstreamError> {
        let url = self.api.endpoint(path, &[])?;
        let response: ComicResponse = self.api.get_json(url).await?;

        Ok(response.into())
    }
}

#[async_trait]
impl ComicPort for XkcdAdapter {
    #[instrument(level = "debug", skip(self))]
    async fn latest(&self) -> Result<Comic, UpstreamError> {
        self.comic("info.0.json").await
    }

    #[instrument(level = "debug", skip(self))]
    async fn by_id(&self, id: u32) -> Result<Comic, UpstreamError> {
        self.comic(&format!("{id}/info.0.json")).await
    }
}
