//! Production `ApiClient` backed by reqwest.
//!
//! Issues a plain GET and maps the HTTP status onto `ApiError`:
//! 2xx -> body, 404 -> NotFound, 429 -> RateLimited, 503 -> Unavailable.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{ApiClient, ApiError};
use crate::config::Config;

/// HTTP client that performs real network requests.
pub struct HttpApiClient {
    http: Client,
    base_url: Option<Url>,
    timeout: Duration,
}

impl HttpApiClient {
    /// Create a new HTTP client from the given configuration.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder().user_agent(&config.user_agent).build()?;

        let base_url = match &config.base_url {
            Some(base) => Some(
                Url::parse(base)
                    .map(enforce_trailing_slash)
                    .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base, e)))?,
            ),
            None => None,
        };

        Ok(Self {
            http,
            base_url,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// Resolve `url` against the base URL when it is relative.
    pub fn resolve(&self, url: &str) -> Result<Url, ApiError> {
        resolve_url(self.base_url.as_ref(), url)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn fetch(&self, url: &str) -> Result<String, ApiError> {
        let target = self.resolve(url)?;
        let started = Instant::now();

        let response = self
            .http
            .get(target.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status().as_u16();
        debug!(
            url = %target,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "received response"
        );

        match status {
            200..=299 => response.text().await.map_err(map_send_error),
            404 => Err(ApiError::NotFound),
            429 => {
                warn!(url = %target, "rate limited");
                Err(ApiError::RateLimited)
            }
            503 => Err(ApiError::Unavailable(format!("HTTP {}", status))),
            status => Err(ApiError::Status(status)),
        }
    }
}

fn map_send_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e)
    }
}

/// `Url::join` replaces the last path segment of a base without a trailing
/// slash, so `https://host/v1` + `users` would become `https://host/users`.
fn enforce_trailing_slash(url: Url) -> Url {
    if url.path().ends_with('/') {
        url
    } else {
        let mut url = url;
        let path = format!("{}/", url.path());
        url.set_path(&path);
        url
    }
}

/// Parse `url`, joining it onto `base` when it does not parse on its own.
fn resolve_url(base: Option<&Url>, url: &str) -> Result<Url, ApiError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ApiError::InvalidUrl("empty url".to_string()));
    }

    match (Url::parse(url), base) {
        (Ok(parsed), _) => Ok(parsed),
        (Err(_), Some(base)) => base
            .join(url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e))),
        (Err(e), None) => Err(ApiError::InvalidUrl(format!("{}: {}", url, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        let url = resolve_url(None, "https://example.com/a?b=1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a?b=1");
    }

    #[test]
    fn test_resolve_relative_url_with_base() {
        let base = Url::parse("https://api.example.com/v1/").unwrap();
        let url = resolve_url(Some(&base), "users/42").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users/42");
    }

    #[test]
    fn test_base_without_trailing_slash_keeps_its_path() {
        let config = Config {
            base_url: Some("https://api.example.com/v1".to_string()),
            ..Default::default()
        };
        let client = HttpApiClient::new(&config).unwrap();

        assert_eq!(
            client.resolve("users/42").unwrap().as_str(),
            "https://api.example.com/v1/users/42"
        );
    }

    #[test]
    fn test_enforce_trailing_slash() {
        let with_slash = Url::parse("http://localhost:8080/api/").unwrap();

        assert_eq!(
            enforce_trailing_slash(Url::parse("http://localhost:8080/api").unwrap()),
            with_slash
        );
        assert_eq!(enforce_trailing_slash(with_slash.clone()), with_slash);
        assert_eq!(
            enforce_trailing_slash(Url::parse("http://localhost:8080").unwrap()).as_str(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn test_absolute_url_ignores_base() {
        let base = Url::parse("https://api.example.com/v1/").unwrap();
        let url = resolve_url(Some(&base), "http://other.test/x").unwrap();
        assert_eq!(url.as_str(), "http://other.test/x");
    }

    #[test]
    fn test_resolve_relative_without_base() {
        let err = resolve_url(None, "users/42").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_resolve_empty_url() {
        let err = resolve_url(None, "   ").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(ref m) if m == "empty url"));
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let config = Config {
            base_url: Some("::nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            HttpApiClient::new(&config),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
