//! Proxy module for collecting and checking proxies
//!
//! This module provides functionality for:
//! - Loading the list of proxy source URLs
//! - Fetching and deduplicating candidates from every source concurrently
//! - Checking candidate liveness through a SOCKS5 tunnel
//! - Reading and writing the newline-delimited candidate files

pub mod checker;
pub mod crawler;
pub mod models;
pub mod sources;
pub mod store;

pub use checker::{CheckerConfig, ProxyChecker};
pub use crawler::{CrawlerConfig, ProxyCrawler};
pub use models::{
    CollectSummary, CrawlResult, ProxyCheckResult, ProxyCheckStatus, SourceList, VerifySummary,
};
pub use sources::load_sources;
