//! Search provider abstractions and implementations.
//!
//! This module contains:
//! - The `SearchProvider` trait that all providers implement
//! - A shared HTTP helper mapping provider responses onto `MarketDataError`
//! - Concrete providers (Financial Modeling Prep, Twelve Data, local list)
//!
//! # Architecture
//!
//! Providers know nothing about each other. Ordering, deduplication, timeouts
//! and fault isolation are the aggregator's job; a provider only turns a
//! query into a list of matches or an error.

mod http;
mod traits;

pub mod fmp;
pub mod local;
pub mod twelve_data;

pub use traits::SearchProvider;
