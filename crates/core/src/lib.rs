//! TickerLift Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for TickerLift: the
//! concurrent enrichment pipeline that resolves company names to ticker
//! symbols, plus the CSV table and file-store collaborators it needs.
//! It is transport-agnostic; the HTTP layer lives in `apps/server`.

pub mod constants;
pub mod enrichment;
pub mod errors;
pub mod files;
pub mod tables;

// Re-export common types from the enrichment module
pub use enrichment::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
