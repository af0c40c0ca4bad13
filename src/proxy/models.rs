//! Proxy data models

use std::fmt;
use std::path::PathBuf;

/// Tunnel scheme every candidate is checked through; the proxy resolves the
/// test URL's host
pub const TUNNEL_SCHEME: &str = "socks5h";

/// Build the tunnel URL for a `host:port` candidate
pub fn tunnel_url(candidate: &str) -> String {
    format!("{}://{}", TUNNEL_SCHEME, candidate)
}

/// Outcome of loading the source list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceList {
    /// The list did not exist and an empty one was created at this path
    Created(PathBuf),
    /// Trimmed, non-blank source URLs in file order
    Sources(Vec<String>),
}

/// Result of crawling a single source
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// The source that was crawled
    pub source: String,
    /// Number of tokens the payload split into, blanks included
    pub fetched: usize,
    /// Error message if crawling failed
    pub error: Option<String>,
}

impl CrawlResult {
    /// Create a successful crawl result
    pub fn success(source: String, fetched: usize) -> Self {
        Self {
            source,
            fetched,
            error: None,
        }
    }

    /// Create a failed crawl result
    pub fn failure(source: String, error: String) -> Self {
        Self {
            source,
            fetched: 0,
            error: Some(error),
        }
    }

    /// Check if the crawl was successful
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate outcome of the collect stage
#[derive(Debug, Clone)]
pub struct CollectSummary {
    /// Every token from every source, duplicates and blanks included
    pub raw_count: usize,
    /// Size of the deduplicated set written to `output`
    pub unique_count: usize,
    /// Per-source outcomes in source-list order
    pub results: Vec<CrawlResult>,
    pub output: PathBuf,
}

impl CollectSummary {
    pub fn failed_sources(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

/// Result of proxy check operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyCheckStatus {
    Working,
    Failed(String),
    Timeout,
}

impl fmt::Display for ProxyCheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyCheckStatus::Working => write!(f, "working"),
            ProxyCheckStatus::Failed(reason) => write!(f, "failed: {}", reason),
            ProxyCheckStatus::Timeout => write!(f, "timeout"),
        }
    }
}

/// Detailed result of a proxy check
#[derive(Debug, Clone)]
pub struct ProxyCheckResult {
    /// The `host:port` candidate that was checked
    pub proxy: String,
    pub status: ProxyCheckStatus,
    pub response_time_ms: Option<u64>,
}

impl ProxyCheckResult {
    pub fn working(proxy: String, response_time_ms: u64) -> Self {
        Self {
            proxy,
            status: ProxyCheckStatus::Working,
            response_time_ms: Some(response_time_ms),
        }
    }

    pub fn failed(proxy: String, error: String) -> Self {
        Self {
            proxy,
            status: ProxyCheckStatus::Failed(error),
            response_time_ms: None,
        }
    }

    pub fn timeout(proxy: String) -> Self {
        Self {
            proxy,
            status: ProxyCheckStatus::Timeout,
            response_time_ms: None,
        }
    }

    pub fn is_working(&self) -> bool {
        matches!(self.status, ProxyCheckStatus::Working)
    }
}

/// Aggregate outcome of the verify stage
#[derive(Debug, Clone)]
pub struct VerifySummary {
    /// Number of candidates read from the unique set
    pub total: usize,
    /// Live candidates in check-completion order
    pub live: Vec<String>,
    pub output: PathBuf,
}
