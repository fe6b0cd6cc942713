//! Shared plumbing for the outbound HTTP adapters.

use domain::ports::UpstreamError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

pub const USER_AGENT: &str = concat!("chatter-bot/", env!("CARGO_PKG_VERSION"));

/// Looks for an application-level error in a decoded response body.
pub type ErrorParser = fn(&serde_json::Value) -> Option<String>;

pub fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

#[derive(Debug, Error)]
pub enum ExternalApiError {
    #[error("invalid base URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// One external service: where it lives, how to reach it and how it reports errors.
#[derive(Clone, Debug)]
pub struct ExternalApi {
    name: String,
    base_url: Url,
    http_client: HttpClient,
    error_parser: Option<ErrorParser>,
}

impl ExternalApi {
    #[instrument(level = "trace", skip(headers))]
    pub fn new(
        name: &str,
        base_url: &str,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Self, ExternalApiError> {
        let base_url = Url::parse(base_url).map_err(|source| ExternalApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        let http_client = HttpClient::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            name: name.to_string(),
            base_url,
            http_client,
            error_parser: None,
        })
    }

    pub fn with_error_parser(mut self, error_parser: ErrorParser) -> Self {
        self.error_parser = Some(error_parser);
        self
    }

    /// `path` resolved against the base URL, with `query` appended.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.join(path).map_err(|err| UpstreamError::Unreachable {
            service: self.name.clone(),
            reason: format!("invalid endpoint `{path}`: {err}"),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<(StatusCode, String), UpstreamError> {
        debug!(api = %self.name, url = %url.path(), "Calling external API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(err))?;

        Ok((status, body))
    }

    #[instrument(level = "debug", skip(self, url), fields(api = %self.name))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        let (status, body) = self.fetch(url).await?;
        self.interpret(status, &body)
    }

    /// Application errors win over the status code, then the body must match `T`.
    fn interpret<T: DeserializeOwned>(&self, status: StatusCode, body: &str) -> Result<T, UpstreamError> {
        if let Some(error_parser) = self.error_parser {
            let decoded = serde_json::from_str::<serde_json::Value>(body).ok();
            if let Some(reason) = decoded.as_ref().and_then(error_parser) {
                warn!(api = %self.name, reason = %reason, "External API reported an error");
                return Err(UpstreamError::Rejected {
                    service: self.name.clone(),
                    reason,
                });
            }
        }
        if !status.is_success() {
            return Err(self.status_error(status));
        }

        serde_json::from_str(body).map_err(|err| {
            warn!(api = %self.name, error = %err, "Failed to parse external API response");
            UpstreamError::Malformed {
                service: self.name.clone(),
                detail: err.to_string(),
            }
        })
    }

    fn status_error(&self, status: StatusCode) -> UpstreamError {
        warn!(api = %self.name, status = status.as_u16(), "External API answered with an error status");
        UpstreamError::Status {
            service: self.name.clone(),
            status: status.as_u16(),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> UpstreamError {
        warn!(api = %self.name, error = %err, "External API request failed");
        if err.is_timeout() {
            UpstreamError::Timeout {
                service: self.name.clone(),
            }
        } else {
            UpstreamError::Unreachable {
                service: self.name.clone(),
                reason: err.to_string(),
            }
        }
    }
}
