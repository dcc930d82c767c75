//! Hand-written test double for `ApiClient`.
//!
//! `StubApiClient` never touches the network. It returns a pre-configured
//! body or error, optionally overridden per URL by glob routes, and records
//! every URL it was asked for so tests can assert on the calls made.

use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use std::sync::Mutex;
use thiserror::Error;

use crate::client::{ApiClient, ApiError};
use crate::config::StubConfig;

/// Error returned when a canned error name is not recognised.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown error {0:?}, expected one of: timeout, not_found, rate_limited, unavailable, invalid_url, status:<code>")]
pub struct UnknownCannedError(pub String);

/// A replayable failure.
///
/// `ApiError` wraps `reqwest::Error` and cannot be cloned, so the stub keeps
/// this description instead and builds a fresh `ApiError` on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CannedError {
    Timeout,
    NotFound,
    RateLimited,
    Status(u16),
    Unavailable(String),
    InvalidUrl,
}

impl CannedError {
    /// Parse a config name such as `not_found` or `status:502`.
    pub fn parse(name: &str) -> Result<Self, UnknownCannedError> {
        let name = name.trim();
        match name {
            "timeout" => Ok(CannedError::Timeout),
            "not_found" => Ok(CannedError::NotFound),
            "rate_limited" => Ok(CannedError::RateLimited),
            "unavailable" => Ok(CannedError::Unavailable("stubbed".to_string())),
            "invalid_url" => Ok(CannedError::InvalidUrl),
            _ => name
                .strip_prefix("status:")
                .and_then(|code| code.parse::<u16>().ok())
                .map(CannedError::Status)
                .ok_or_else(|| UnknownCannedError(name.to_string())),
        }
    }

    fn to_api_error(&self, url: &str) -> ApiError {
        match self {
            CannedError::Timeout => ApiError::Timeout,
            CannedError::NotFound => ApiError::NotFound,
            CannedError::RateLimited => ApiError::RateLimited,
            CannedError::Status(code) => ApiError::Status(*code),
            CannedError::Unavailable(reason) => ApiError::Unavailable(reason.clone()),
            CannedError::InvalidUrl => ApiError::InvalidUrl(url.to_string()),
        }
    }
}

/// What the stub answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canned {
    Body(String),
    Error(CannedError),
}

impl Canned {
    fn reply(&self, url: &str) -> Result<String, ApiError> {
        match self {
            Canned::Body(body) => Ok(body.clone()),
            Canned::Error(err) => Err(err.to_api_error(url)),
        }
    }
}

struct Route {
    pattern: String,
    matcher: GlobMatcher,
    canned: Canned,
}

/// Stub `ApiClient` returning pre-configured values or errors.
pub struct StubApiClient {
    default: Canned,
    routes: Vec<Route>,
    calls: Mutex<Vec<String>>,
}

impl StubApiClient {
    /// A stub that answers every call with `body`.
    pub fn returning(body: impl Into<String>) -> Self {
        Self::new(Canned::Body(body.into()))
    }

    /// A stub that fails every call with `error`.
    pub fn failing(error: CannedError) -> Self {
        Self::new(Canned::Error(error))
    }

    fn new(default: Canned) -> Self {
        Self {
            default,
            routes: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Override the answer for URLs matching a glob pattern.
    ///
    /// Routes are tried in insertion order; the first match wins.
    pub fn with_route(mut self, pattern: &str, canned: Canned) -> Result<Self, ApiError> {
        let matcher = Glob::new(pattern)
            .map_err(|e| ApiError::InvalidUrl(format!("route {:?}: {}", pattern, e)))?
            .compile_matcher();
        self.routes.push(Route {
            pattern: pattern.to_string(),
            matcher,
            canned,
        });
        Ok(self)
    }

    /// Build a stub from the `stub:` section of a config file.
    pub fn from_config(config: &StubConfig) -> anyhow::Result<Self> {
        let mut stub = match &config.error {
            Some(name) => Self::failing(CannedError::parse(name)?),
            None => Self::returning(config.body.clone()),
        };

        for route in &config.routes {
            let canned = match (&route.error, &route.body) {
                (Some(name), _) => Canned::Error(CannedError::parse(name)?),
                (None, Some(body)) => Canned::Body(body.clone()),
                (None, None) => {
                    anyhow::bail!("stub route {:?} needs a body or an error", route.pattern)
                }
            };
            stub = stub.with_route(&route.pattern, canned)?;
        }

        Ok(stub)
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of fetches performed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn answer_for(&self, url: &str) -> &Canned {
        self.routes
            .iter()
            .find(|route| route.matcher.is_match(url))
            .map(|route| &route.canned)
            .unwrap_or(&self.default)
    }
}

impl std::fmt::Debug for StubApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let patterns: Vec<&str> = self.routes.iter().map(|r| r.pattern.as_str()).collect();
        f.debug_struct("StubApiClient")
            .field("default", &self.default)
            .field("routes", &patterns)
            .field("calls", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl ApiClient for StubApiClient {
    async fn fetch(&self, url: &str) -> Result<String, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        self.answer_for(url).reply(url)
    }
}
