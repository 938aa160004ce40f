//! Collector - acquires viticulture statistics with graceful degradation
//!
//! Responsibilities:
//! - Fetch source files from the Embrapa portal (bounded time, single attempt)
//! - Parse them into normalized records
//! - Keep the last good snapshot of each dataset on disk
//! - Serve fixed fallback records when source and cache both fail

pub mod cache;
pub mod config;
pub mod fallback;
pub mod fetch;
pub mod service;

pub use cache::{CacheError, CacheStore, Provenance, Snapshot};
pub use config::Config;
pub use fallback::fallback_records;
pub use fetch::{FetchError, FetchedSource, HttpFetcher, SourceFetcher};
pub use service::{DataService, GetOptions, LiveFetchError, Served, Tier};
