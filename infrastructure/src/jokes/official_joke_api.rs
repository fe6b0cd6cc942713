use crate::http::{json_headers, ExternalApi, ExternalApiError};
use async_trait::async_trait;
use domain::ports::joke::{Joke, JokeSource};
use domain::ports::UpstreamError;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

const BASE_URL: &str = "https://official-joke-api.appspot.com/";

#[derive(Deserialize, Debug)]
struct RandomJokeResponse {
    setup: String,
    punchline: String,
}

impl From<RandomJokeResponse> for Joke {
    fn from(response: RandomJokeResponse) -> Self {
        Joke::TwoPart {
            setup: response.setup,
            punchline: response.punchline,
        }
    }
}

pub struct OfficialJokeApiAdapter {
    api: ExternalApi,
}

impl OfficialJokeApiAdapter {
    #[instrument(level = "trace")]
    pub fn new(timeout: Duration) -> Result<Self, ExternalApiError> {
        let api = ExternalApi::new("Official Joke API", BASE_URL, json_headers(), timeout)?;

        Ok(Self { api })
    }
}

#[async_trait]
impl JokeSource for OfficialJokeApiAdapter {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_joke(&self) -> Result<Joke, UpstreamError> {
        let url = self.api.endpoint("random_joke", &[])?;
        let response: RandomJokeResponse = self.api.get_json(url).await?;

        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_joke_has_two_parts() {
        let response: RandomJokeResponse = serde_json::from_str(
            r#"{"type": "general", "setup": "What do you call a belt made of watches?", "punchline": "A waist of time.", "id": 79}"#,
        )
        .unwrap();

        assert_eq!(
            Joke::from(response).to_string(),
            "What do you call a belt made of watches?\nA waist of time."
        );
    }
}
