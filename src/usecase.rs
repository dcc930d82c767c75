//! The consumer side of the `ApiClient` seam.
//!
//! `FetchUseCase` only knows the trait. Whether it talks to the network,
//! a cache or a stub is decided by whoever constructs it.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{ApiClient, ApiError};

/// Errors returned by the use case.
#[derive(Error, Debug)]
pub enum UseCaseError {
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: ApiError,
    },
}

impl UseCaseError {
    /// Short error name for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            UseCaseError::EmptyUrl => "empty_url",
            UseCaseError::Fetch { source, .. } => source.kind(),
        }
    }

    /// The underlying client error, if the client was called.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            UseCaseError::EmptyUrl => None,
            UseCaseError::Fetch { source, .. } => Some(source),
        }
    }
}

/// Result of fetching one URL as part of a batch.
#[derive(Debug)]
pub struct FetchOutcome {
    pub url: String,
    pub result: Result<String, UseCaseError>,
    pub elapsed: Duration,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fetches URLs through an injected `ApiClient`.
#[derive(Clone)]
pub struct FetchUseCase {
    client: Arc<dyn ApiClient>,
}

impl FetchUseCase {
    /// Create a use case around the given client.
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a single URL and hand back its body.
    pub async fn execute(&self, url: &str) -> Result<String, UseCaseError> {
        if url.trim().is_empty() {
            return Err(UseCaseError::EmptyUrl);
        }

        info!(url, "fetching");
        match self.client.fetch(url).await {
            Ok(body) => Ok(body),
            Err(source) => {
                warn!(url, error = %source, "fetch failed");
                Err(UseCaseError::Fetch {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }

    /// Fetch several URLs with at most `concurrency` requests in flight.
    ///
    /// Outcomes are returned in the same order as `urls`.
    pub async fn execute_all(&self, urls: &[String], concurrency: usize) -> Vec<FetchOutcome> {
        stream::iter(urls)
            .map(|url| async move {
                let started = Instant::now();
                let result = self.execute(url).await;
                FetchOutcome {
                    url: url.clone(),
                    result,
                    elapsed: started.elapsed(),
                }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
