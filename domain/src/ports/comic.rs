use crate::ports::UpstreamError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comic {
    pub number: u32,
    pub title: String,
    pub image_url: String,
    pub alt: String,
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ComicPort {
    async fn latest(&self) -> Result<Comic, UpstreamError>;

    async fn by_id(&self, id: u32) -> Result<Comic, UpstreamError>;
}
