use crate::http::{json_headers, ExternalApi, ExternalApiError};
use async_trait::async_trait;
use domain::ports::joke::{Joke, JokeSource};
use domain::ports::UpstreamError;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

const BASE_URL: &str = "https://v2.jokeapi.dev/";

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JokeApiResponse {
    Single { joke: String },
    Twopart { setup: String, delivery: String },
}

impl From<JokeApiResponse> for Joke {
    fn from(response: JokeApiResponse) -> Self {
        match response {
            JokeApiResponse::Single { joke } => Joke::Single(joke),
            JokeApiResponse::Twopart { setup, delivery } => Joke::TwoPart {
                setup,
                punchline: delivery,
            },
        }
    }
}

/// JokeAPI answers errors with `"error": true` and a message, sometimes with a 200.
fn jokeapi_error(body: &serde_json::Value) -> Option<String> {
    if body.get("error")?.as_bool()? {
        let message = body
            .get("message")
            .and_then(|message| message.as_str())
            .unwrap_or("unknown error");
        Some(message.to_string())
    } else {
        None
    }
}

pub struct JokeApiAdapter {
    api: ExternalApi,
}

impl JokeApiAdapter {
    #[instrument(level = "trace")]
    pub fn new(timeout: Duration) -> Result<Self, ExternalApiError> {
        let api = ExternalApi::new("JokeAPI", BASE_URL, json_headers(), timeout)?
            .with_error_parser(jokeapi_error);

        Ok(Self { api })
    }
}

#[async_trait]
impl JokeSource for JokeApiAdapter {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_joke(&self) -> Result<Joke, UpstreamError> {
        let url = self.api.endpoint("joke/Any", &[])?;
        let response: JokeApiResponse = self.api.get_json(url).await?;

        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_joke_shapes() {
        let single: JokeApiResponse = serde_json::from_str(
            r#"{"error": false, "category": "Programming", "type": "single", "joke": "Java is like Alzheimer's, it starts off slow, but eventually, your memory is gone.", "id": 22, "safe": true, "lang": "en"}"#,
        )
        .unwrap();
        let two_part: JokeApiResponse = serde_json::from_str(
            r#"{"error": false, "category": "Pun", "type": "twopart", "setup": "What kind of tree fits in your hand?", "delivery": "A palm tree.", "id": 200}"#,
        )
        .unwrap();

        assert!(matches!(Joke::from(single), Joke::Single(joke) if joke.starts_with("Java")));
        assert_eq!(
            Joke::from(two_part),
            Joke::TwoPart {
                setup: "What kind of tree fits in your hand?".into(),
                punchline: "A palm tree.".into(),
            }
        );
    }

    #[test]
    fn error_body_is_recognised() {
        let body = serde_json::json!({
            "error": true,
            "internalError": false,
            "code": 106,
            "message": "No matching joke found",
        });

        assert_eq!(jokeapi_error(&body).as_deref(), Some("No matching joke found"));
        assert_eq!(jokeapi_error(&serde_json::json!({"error": false})), None);
    }
}
