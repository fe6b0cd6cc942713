mod icanhazdadjoke;
mod jokeapi;
mod official_joke_api;

pub use icanhazdadjoke::ICanHazDadJokeAdapter;
pub use jokeapi::JokeApiAdapter;
pub use official_joke_api::OfficialJokeApiAdapter;

use crate::http::ExternalApiError;
use domain::ports::joke::JokeSource;
use std::sync::Arc;
use std::time::Duration;

/// Every joke source, in no particular order.
pub fn joke_sources(
    timeout: Duration,
) -> Result<Vec<Arc<dyn JokeSource + Send + Sync>>, ExternalApiError> {
    let dad_jokes: Arc<dyn JokeSource + Send + Sync> = Arc::new(ICanHazDadJokeAdapter::new(timeout)?);
    let official: Arc<dyn JokeSource + Send + Sync> = Arc::new(OfficialJokeApiAdapter::new(timeout)?);
    let jokeapi: Arc<dyn JokeSource + Send + Sync> = Arc::new(JokeApiAdapter::new(timeout)?);

    Ok(vec![dad_jokes, official, jokeapi])
}
