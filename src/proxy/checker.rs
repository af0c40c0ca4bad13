//! Proxy checker module for checking proxy liveness

use crate::progress::ProgressSink;
use crate::proxy::models::{tunnel_url, ProxyCheckResult, VerifySummary};
use crate::proxy::store;
use crate::Result;
use parking_lot::Mutex;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

/// Default timeout for proxy checks in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of checks in flight at once
const DEFAULT_CONCURRENCY: usize = 512;

/// Default URL to test proxies against
const DEFAULT_TEST_URL: &str = "https://one.one.one.one";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check, connect and read included
    pub timeout: Duration,
    /// Maximum number of checks in flight
    pub concurrency: usize,
    /// URL to test proxies against
    pub test_url: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            test_url: DEFAULT_TEST_URL.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clamped to at least one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }
}

/// Proxy checker for validating proxies
#[derive(Clone)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self {
            config: CheckerConfig::default(),
        }
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Check a single `host:port` candidate through a SOCKS5 tunnel.
    ///
    /// The candidate is live only if the test URL answers `200 OK` within the
    /// timeout. Every other outcome, including an unparsable address, is
    /// reported as a failure.
    pub async fn check_proxy(&self, proxy: &str) -> ProxyCheckResult {
        let start = Instant::now();

        let client = match self.create_client(proxy) {
            Ok(client) => client,
            Err(e) => return ProxyCheckResult::failed(proxy.to_string(), e.to_string()),
        };

        match tokio::time::timeout(
            self.config.timeout,
            client.get(&self.config.test_url).send(),
        )
        .await
        {
            Ok(Ok(response)) if response.status() == StatusCode::OK => {
                let elapsed = start.elapsed().as_millis() as u64;
                ProxyCheckResult::working(proxy.to_string(), elapsed)
            }
            Ok(Ok(response)) => ProxyCheckResult::failed(
                proxy.to_string(),
                format!("HTTP status: {}", response.status()),
            ),
            Ok(Err(e)) if e.is_timeout() => ProxyCheckResult::timeout(proxy.to_string()),
            Ok(Err(e)) => ProxyCheckResult::failed(proxy.to_string(), e.to_string()),
            Err(_) => ProxyCheckResult::timeout(proxy.to_string()),
        }
    }

    /// Check all candidates concurrently, returning every result in
    /// completion order
    pub async fn check_proxies<S: ProgressSink>(
        &self,
        proxies: Vec<String>,
        sink: S,
    ) -> Vec<ProxyCheckResult> {
        let total = proxies.len();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let results = Arc::new(Mutex::new(Vec::with_capacity(total)));

        // One slot: each finished check hands its tick straight to the counter
        let (tick_tx, tick_rx) = mpsc::channel::<()>(1);
        let progress = tokio::spawn(count_progress(tick_rx, total, sink));

        let handles: Vec<_> = proxies
            .into_iter()
            .map(|proxy| {
                let checker = self.clone();
                let semaphore = Arc::clone(&semaphore);
                let results = Arc::clone(&results);
                let tick_tx = tick_tx.clone();
                tokio::spawn(async move {
                    let result = match semaphore.acquire().await {
                        Ok(_permit) => checker.check_proxy(&proxy).await,
                        Err(e) => ProxyCheckResult::failed(proxy, e.to_string()),
                    };
                    debug!(proxy = %result.proxy, status = %result.status, "proxy checked");
                    results.lock().push(result);
                    let _ = tick_tx.send(()).await;
                })
            })
            .collect();
        drop(tick_tx);

        for joined in futures::future::join_all(handles).await {
            if let Err(e) = joined {
                warn!(error = %e, "proxy check task aborted");
            }
        }
        if let Err(e) = progress.await {
            warn!(error = %e, "progress task aborted");
        }

        let results = std::mem::take(&mut *results.lock());
        results
    }

    /// Check proxies and separate into good and bad results
    pub async fn check_and_separate<S: ProgressSink>(
        &self,
        proxies: Vec<String>,
        sink: S,
    ) -> (Vec<ProxyCheckResult>, Vec<ProxyCheckResult>) {
        let results = self.check_proxies(proxies, sink).await;

        let (good, bad): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_working());

        (good, bad)
    }

    /// Check all candidates and keep the live ones, in completion order
    pub async fn verify<S: ProgressSink>(&self, proxies: Vec<String>, sink: S) -> Vec<String> {
        let (good, _) = self.check_and_separate(proxies, sink).await;
        good.into_iter().map(|r| r.proxy).collect()
    }

    /// Verify every candidate in `input` and write the live ones to `output`,
    /// replacing its previous content
    pub async fn verify_file<P, Q, S>(&self, input: P, output: Q, sink: S) -> Result<VerifySummary>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        S: ProgressSink,
    {
        let proxies = store::read_lines(input)?;
        let total = proxies.len();

        let live = self.verify(proxies, sink).await;

        let output = output.as_ref();
        store::write_lines(output, &live)?;
        debug!(total, live = live.len(), output = %output.display(), "live candidates written");

        Ok(VerifySummary {
            total,
            live,
            output: output.to_path_buf(),
        })
    }

    /// Create a reqwest client tunnelling through the candidate
    fn create_client(&self, proxy: &str) -> Result<Client> {
        let reqwest_proxy = ReqwestProxy::all(tunnel_url(proxy))?;

        let client = Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.config.timeout)
            .build()?;

        Ok(client)
    }
}

impl Default for ProxyChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Consume one tick per finished check until `total` have arrived or every
/// sender is gone
async fn count_progress<S: ProgressSink>(
    mut ticks: mpsc::Receiver<()>,
    total: usize,
    mut sink: S,
) {
    let mut current = 0;
    while current < total {
        if ticks.recv().await.is_none() {
            break;
        }
        current += 1;
        sink.update(current, total);
    }
    sink.finish();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(usize, usize)>>>);

    impl ProgressSink for Recorder {
        fn update(&mut self, current: usize, total: usize) {
            self.0.lock().push((current, total));
        }
    }

    fn fast_checker() -> ProxyChecker {
        ProxyChecker::with_config(
            CheckerConfig::new()
                .with_timeout(Duration::from_secs(2))
                .with_test_url("http://127.0.0.1:1/".to_string()),
        )
    }

    #[test]
    fn test_checker_config_default() {
        let config = CheckerConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.test_url, DEFAULT_TEST_URL);
    }

    #[test]
    fn test_checker_config_builder() {
        let config = CheckerConfig::new()
            .with_timeout(Duration::from_secs(30))
            .with_concurrency(20)
            .with_test_url("http://example.com".to_string());

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.test_url, "http://example.com");
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let config = CheckerConfig::new().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }

    #[tokio::test]
    async fn test_malformed_candidate_is_not_live() {
        let result = fast_checker().check_proxy("not a proxy").await;
        assert!(!result.is_working());
    }

    #[tokio::test]
    async fn test_bad_candidate_reaches_full_progress() {
        let recorder = Recorder::default();
        let live = fast_checker()
            .verify(vec!["bad:0".to_string()], recorder.clone())
            .await;

        assert!(live.is_empty());
        assert_eq!(*recorder.0.lock(), vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_progress_counts_every_check_once() {
        let recorder = Recorder::default();
        let proxies: Vec<_> = (1..=5).map(|port| format!("127.0.0.1:{}", port)).collect();

        let results = ProxyChecker::with_config(
            fast_checker().config().clone().with_concurrency(2),
        )
        .check_proxies(proxies, recorder.clone())
        .await;

        assert_eq!(results.len(), 5);
        let updates = recorder.0.lock().clone();
        assert_eq!(updates, (1..=5).map(|k| (k, 5)).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_verify_nothing() {
        let live = fast_checker().verify(Vec::new(), NoProgress).await;
        assert!(live.is_empty());
    }
}
