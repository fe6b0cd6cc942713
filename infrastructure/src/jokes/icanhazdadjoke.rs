use crate::http::{json_headers, ExternalApi, ExternalApiError};
use async_trait::async_trait;
use domain::ports::joke::{Joke, JokeSource};
use domain::ports::UpstreamError;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

const BASE_URL: &str = "https://icanhazdadjoke.com/";

#[derive(Deserialize, Debug)]
struct DadJokeResponse {
    joke: String,
}

pub struct ICanHazDadJokeAdapter {
    api: ExternalApi,
}

impl ICanHazDadJokeAdapter {
    #[instrument(level = "trace")]
    pub fn new(timeout: Duration) -> Result<Self, ExternalApiError> {
        let api = ExternalApi::new("icanhazdadjoke.com", BASE_URL, json_headers(), timeout)?;

        Ok(Self { api })
    }
}

#[async_trait]
impl JokeSource for ICanHazDadJokeAdapter {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_joke(&self) -> Result<Joke, UpstreamError> {
        let url = self.api.endpoint("", &[])?;
        let response: DadJokeResponse = self.api.get_json(url).await?;

        Ok(Joke::Single(response.joke))
    }
}
