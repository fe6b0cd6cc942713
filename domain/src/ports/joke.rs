use crate::ports::UpstreamError;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Joke {
    Single(String),
    TwoPart { setup: String, punchline: String },
}

impl fmt::Display for Joke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Joke::Single(joke) => f.write_str(joke),
            Joke::TwoPart { setup, punchline } => write!(f, "{setup}\n{punchline}"),
        }
    }
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait JokeSource {
    async fn fetch_joke(&self) -> Result<Joke, UpstreamError>;
}
