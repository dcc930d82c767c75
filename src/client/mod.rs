//! API client module.
//!
//! `ApiClient` is the seam every consumer depends on. Implementations:
//! - `HttpApiClient`: real GET requests via reqwest
//! - `CachingApiClient`: TTL cache decorator over any other client
//! - `StubApiClient` (in `crate::stub`): canned values and errors, no network

mod cache;
mod http;

pub use cache::CachingApiClient;
pub use http::HttpApiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while fetching a URL.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("resource not found")]
    NotFound,
    #[error("rate limited by server")]
    RateLimited,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// Stable short name for reports and config files.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidUrl(_) => "invalid_url",
            ApiError::Network(_) => "network",
            ApiError::Timeout => "timeout",
            ApiError::NotFound => "not_found",
            ApiError::RateLimited => "rate_limited",
            ApiError::Status(_) => "status",
            ApiError::Unavailable(_) => "unavailable",
        }
    }
}

/// Capability to fetch the body behind a URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ApiError>;
}
