//! TickerLift Market Data Crate
//!
//! This crate provides symbol-lookup capabilities against an external
//! market data provider, for use by the enrichment pipeline.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Symbol search against the Finnhub `/search` endpoint
//! - Token-bucket rate limiting shared across concurrent callers
//! - A provider trait so callers can be tested against stubs
//!
//! # Architecture
//!
//! ```text
//! +--------------------+
//! | SymbolLookupClient |  (validation + rate limiting)
//! +--------------------+
//!          |
//!          v
//! +--------------------+
//! |    RateLimiter     |  (token bucket, shared budget)
//! +--------------------+
//!          |
//!          v
//! +--------------------+
//! |     Provider       |  (Finnhub)
//! +--------------------+
//!          |
//!          v
//! +--------------------+
//! |    Candidate       |  (ranked matches, provider order)
//! +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Candidate`] - One symbol match returned by the provider
//! - [`SymbolLookupClient`] - Rate-limited front door for lookups
//! - [`RateLimiter`] - Injectable token-bucket limiter
//! - [`LookupError`] - Typed failures for all lookup operations

pub mod client;
pub mod errors;
pub mod models;
pub mod provider;
pub mod rate_limiter;

pub use client::SymbolLookupClient;
pub use errors::LookupError;
pub use models::Candidate;
pub use provider::finnhub::FinnhubProvider;
pub use provider::SymbolSearchProvider;
pub use rate_limiter::{RateLimitConfig, RateLimiter};
