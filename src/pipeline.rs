//! Runs the collect and verify stages in order and reports on each

use crate::progress::ProgressSink;
use crate::proxy::{
    load_sources, CollectSummary, CrawlResult, ProxyChecker, ProxyCrawler, SourceList,
    VerifySummary,
};
use crate::{Config, Result};
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

/// How a full run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The source list was missing and has been created empty; nothing ran
    NoSources(PathBuf),
    Completed {
        collect: CollectSummary,
        verify: VerifySummary,
    },
}

/// Await `stage`, printing a start line and the elapsed seconds
pub async fn timed<F, T>(label: &str, stage: F) -> T
where
    F: Future<Output = T>,
{
    println!("{}", label);
    let start = Instant::now();
    let output = stage.await;
    println!("Finished in {:.2}s", start.elapsed().as_secs_f64());
    output
}

/// Load the source list and collect candidates into the unique set file.
///
/// Returns `Ok(None)` when the source list had to be created.
pub async fn collect_stage(config: &Config) -> Result<Option<CollectSummary>> {
    let sources = match load_sources(&config.sources_path)? {
        SourceList::Created(path) => {
            println!(
                "Created empty {}, add proxy source URLs to it (one per line)",
                path.display()
            );
            return Ok(None);
        }
        SourceList::Sources(sources) => sources,
    };

    println!("Fetching {} sources", sources.len());
    let crawler = ProxyCrawler::with_config(config.crawler.clone())?;
    let summary = crawler.collect(&sources, &config.unique_path).await?;

    for result in &summary.results {
        println!("{}", source_line(result));
    }
    println!("Collected {} proxies in total", summary.raw_count);
    println!("{} unique proxies remain", summary.unique_count);
    println!("Unique proxies saved to {}", summary.output.display());

    Ok(Some(summary))
}

/// Status line for one crawled source
pub fn source_line(result: &CrawlResult) -> String {
    match &result.error {
        None => format!("Fetched {} lines from {}", result.fetched, result.source),
        Some(error) => format!("Failed to fetch {}: {}", result.source, error),
    }
}

/// Check every candidate in the unique set file and save the live ones
pub async fn verify_stage<S: ProgressSink>(config: &Config, sink: S) -> Result<VerifySummary> {
    let checker = ProxyChecker::with_config(config.checker.clone());
    let summary = checker
        .verify_file(&config.unique_path, &config.verified_path, sink)
        .await?;

    println!("Live proxies saved to {}", summary.output.display());
    println!("{} of {} proxies are live", summary.live.len(), summary.total);

    Ok(summary)
}

/// Collect, then verify. Verification is skipped when there were no sources.
pub async fn run<S: ProgressSink>(config: &Config, sink: S) -> Result<RunOutcome> {
    let collect = timed(
        &format!("Collecting proxies into {}", config.unique_path.display()),
        collect_stage(config),
    )
    .await?;

    let Some(collect) = collect else {
        return Ok(RunOutcome::NoSources(config.sources_path.clone()));
    };

    let verify = timed(
        &format!("Verifying proxies into {}", config.verified_path.display()),
        verify_stage(config, sink),
    )
    .await?;

    Ok(RunOutcome::Completed { collect, verify })
}
