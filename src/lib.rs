//! doublefetch - an HTTP API client behind a swappable trait.
//!
//! Consumers depend on the `ApiClient` capability rather than on a concrete
//! HTTP library, so the implementation can be chosen at construction time:
//! a real reqwest client in production, a stub returning canned values or
//! errors in tests, optionally wrapped in a TTL cache.
//!
//! # Architecture
//!
//! - `client`: the `ApiClient` trait, `ApiError`, the HTTP and caching clients
//! - `stub`: hand-written `StubApiClient` test double
//! - `usecase`: `FetchUseCase`, the consumer with the client injected
//! - `config`: YAML config schema selecting and tuning the client
//! - `report`: output formatting (pretty, JSON)
//! - `cli`: command-line interface and composition root
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use doublefetch::{FetchUseCase, StubApiClient};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let usecase = FetchUseCase::new(Arc::new(StubApiClient::returning("pong")));
//! assert_eq!(usecase.execute("https://api.test/ping").await.unwrap(), "pong");
//! # });
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod report;
pub mod stub;
pub mod usecase;

pub use client::{ApiClient, ApiError, CachingApiClient, HttpApiClient};
pub use config::Config;
pub use stub::{Canned, CannedError, StubApiClient};
pub use usecase::{FetchOutcome, FetchUseCase, UseCaseError};
