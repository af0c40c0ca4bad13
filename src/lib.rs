//! Proxy Harvester - Proxy Collector and Checker
//!
//! Collects proxy candidates from a list of remote sources, deduplicates them
//! and checks which ones actually tunnel traffic through SOCKS5.

pub mod error;
pub mod pipeline;
pub mod progress;
pub mod proxy;

pub use error::HarvestError;
pub use proxy::*;

use std::path::PathBuf;

/// Application result type
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Default file listing the proxy source URLs
pub const DEFAULT_SOURCES_PATH: &str = "urls.txt";

/// Default file holding the deduplicated candidates
pub const DEFAULT_UNIQUE_PATH: &str = "unique_proxies.txt";

/// Default file holding the candidates that passed the liveness check
pub const DEFAULT_VERIFIED_PATH: &str = "validated_proxies.txt";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Newline-delimited list of source URLs
    pub sources_path: PathBuf,
    /// Output of the collect stage, input of the verify stage
    pub unique_path: PathBuf,
    /// Output of the verify stage
    pub verified_path: PathBuf,
    pub crawler: CrawlerConfig,
    pub checker: CheckerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources_path: PathBuf::from(DEFAULT_SOURCES_PATH),
            unique_path: PathBuf::from(DEFAULT_UNIQUE_PATH),
            verified_path: PathBuf::from(DEFAULT_VERIFIED_PATH),
            crawler: CrawlerConfig::default(),
            checker: CheckerConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources_path = path.into();
        self
    }

    pub fn with_unique_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.unique_path = path.into();
        self
    }

    pub fn with_verified_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.verified_path = path.into();
        self
    }

    pub fn with_crawler(mut self, crawler: CrawlerConfig) -> Self {
        self.crawler = crawler;
        self
    }

    pub fn with_checker(mut self, checker: CheckerConfig) -> Self {
        self.checker = checker;
        self
    }
}
