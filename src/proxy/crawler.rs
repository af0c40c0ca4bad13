//! Proxy crawler module for collecting candidates from source lists
//!
//! Every source is fetched in its own task. Payloads are split into
//! `host:port` tokens and merged into one deduplicated set, which is then
//! written out for the checker.

use crate::error::HarvestError;
use crate::proxy::models::{CollectSummary, CrawlResult};
use crate::proxy::store;
use crate::Result;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for HTTP requests
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Configuration for proxy crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Timeout for each source request, `None` leaves the transport default
    pub timeout: Option<Duration>,
    /// User agent for HTTP requests
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fetch without a request timeout; an unresponsive source can stall the stage
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Candidates merged from all sources
#[derive(Debug, Default)]
struct Harvest {
    raw_count: usize,
    unique: HashSet<String>,
}

impl Harvest {
    /// Count every token, keep the non-empty ones keyed by their exact text
    fn merge<'a>(&mut self, tokens: impl IntoIterator<Item = &'a str>) -> usize {
        let mut fetched = 0;
        for token in tokens {
            fetched += 1;
            if !token.is_empty() {
                self.unique.insert(token.to_owned());
            }
        }
        self.raw_count += fetched;
        fetched
    }
}

/// Proxy crawler for fetching candidate lists from sources
#[derive(Clone)]
pub struct ProxyCrawler {
    client: Client,
}

impl ProxyCrawler {
    /// Create a new proxy crawler with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlerConfig::default())
    }

    /// Create a new proxy crawler with custom configuration
    pub fn with_config(config: CrawlerConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch the raw payload of a single source
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let fetch_err = |source: reqwest::Error| HarvestError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(fetch_err)
    }

    /// Fetch every source concurrently and merge their candidates.
    ///
    /// Returns the raw token count, the deduplicated candidates and the
    /// per-source results.
    /// A failing source only contributes a failed [`CrawlResult`].
    pub async fn crawl_all(
        &self,
        sources: &[String],
    ) -> (usize, HashSet<String>, Vec<CrawlResult>) {
        let harvest = Arc::new(Mutex::new(Harvest::default()));

        let handles: Vec<_> = sources
            .iter()
            .cloned()
            .map(|source| {
                let crawler = self.clone();
                let harvest = Arc::clone(&harvest);
                tokio::spawn(async move {
                    match crawler.fetch(&source).await {
                        Ok(body) => {
                            let fetched = harvest.lock().merge(store::split_tokens(&body));
                            debug!(%source, fetched, "source fetched");
                            CrawlResult::success(source, fetched)
                        }
                        Err(e) => {
                            warn!(%source, error = %e, "source fetch failed");
                            CrawlResult::failure(source, e.to_string())
                        }
                    }
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (source, joined) in sources.iter().zip(futures::future::join_all(handles).await) {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(%source, error = %e, "source task aborted");
                    results.push(CrawlResult::failure(source.clone(), e.to_string()));
                }
            }
        }

        let harvest = std::mem::take(&mut *harvest.lock());
        (harvest.raw_count, harvest.unique, results)
    }

    /// Collect candidates from all sources and write the deduplicated set to
    /// `output`, replacing its previous content
    pub async fn collect<P: AsRef<Path>>(
        &self,
        sources: &[String],
        output: P,
    ) -> Result<CollectSummary> {
        let output = output.as_ref();
        let (raw_count, unique, results) = self.crawl_all(sources).await;

        let mut candidates: Vec<_> = unique.into_iter().collect();
        candidates.sort_unstable();
        store::write_lines(output, &candidates)?;

        debug!(
            raw_count,
            unique_count = candidates.len(),
            output = %output.display(),
            "unique candidates written"
        );

        Ok(CollectSummary {
            raw_count,
            unique_count: candidates.len(),
            results,
            output: output.to_path_buf(),
        })
    }
}
