pub mod comic;
pub mod game_deal;
pub mod host;
pub mod joke;
pub mod ranking;

use thiserror::Error;

/// Failure of a third party service behind one of the ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("{service} responded with HTTP status {status}")]
    Status { service: String, status: u16 },
    #[error("{service} is unreachable: {reason}")]
    Unreachable { service: String, reason: String },
    #[error("{service} did not respond in time")]
    Timeout { service: String },
    #[error("{service} rejected the request: {reason}")]
    Rejected { service: String, reason: String },
    #[error("{service} sent an unexpected response: {detail}")]
    Malformed { service: String, detail: String },
}

impl UpstreamError {
    pub fn service(&self) -> &str {
        match self {
            UpstreamError::Status { service, .. }
            | UpstreamError::Unreachable { service, .. }
            | UpstreamError::Timeout { service }
            | UpstreamError::Rejected { service, .. }
            | UpstreamError::Malformed { service, .. } => service,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::Status { status: 404, .. })
    }
}
