use anyhow::Result;
use clap::{Parser, Subcommand};
use proxy_harvester::{
    pipeline::{self, RunOutcome},
    progress::TerminalProgress,
    CheckerConfig, Config, CrawlerConfig, DEFAULT_SOURCES_PATH, DEFAULT_UNIQUE_PATH,
    DEFAULT_VERIFIED_PATH,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Collects proxies from remote lists and keeps the ones that work
#[derive(Parser)]
#[command(name = "proxy-harvester")]
#[command(about = "Collects proxies from remote lists and keeps the ones that work")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// File listing proxy source URLs, one per line
    #[arg(long, global = true, default_value = DEFAULT_SOURCES_PATH)]
    sources: PathBuf,

    /// Output file for deduplicated proxies
    #[arg(long, global = true, default_value = DEFAULT_UNIQUE_PATH)]
    unique: PathBuf,

    /// Output file for live proxies
    #[arg(long, global = true, default_value = DEFAULT_VERIFIED_PATH)]
    verified: PathBuf,

    /// Maximum number of proxy checks in flight
    #[arg(short = 'n', long, global = true, default_value = "512")]
    concurrency: usize,

    /// Timeout in seconds for each proxy check
    #[arg(long, global = true, default_value = "10")]
    timeout: u64,

    /// Timeout in seconds for fetching a source, 0 disables it
    #[arg(long, global = true, default_value = "30")]
    fetch_timeout: u64,

    /// URL to test proxies against
    #[arg(long, global = true, default_value = "https://one.one.one.one")]
    test_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect then verify (default)
    Run,
    /// Only collect and deduplicate proxies
    Collect,
    /// Only verify the proxies already collected
    Verify,
}

impl Cli {
    fn config(&self) -> Config {
        let crawler = match self.fetch_timeout {
            0 => CrawlerConfig::new().without_timeout(),
            secs => CrawlerConfig::new().with_timeout(Duration::from_secs(secs)),
        };
        let checker = CheckerConfig::new()
            .with_concurrency(self.concurrency)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_test_url(self.test_url.clone());

        Config::new()
            .with_sources_path(&self.sources)
            .with_unique_path(&self.unique)
            .with_verified_path(&self.verified)
            .with_crawler(crawler)
            .with_checker(checker)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command {
        Some(Commands::Run) | None => {
            if let RunOutcome::NoSources(path) =
                pipeline::run(&config, TerminalProgress::default()).await?
            {
                println!("No sources to fetch, populate {} and run again", path.display());
            }
        }
        Some(Commands::Collect) => {
            pipeline::timed(
                &format!("Collecting proxies into {}", config.unique_path.display()),
                pipeline::collect_stage(&config),
            )
            .await?;
        }
        Some(Commands::Verify) => {
            pipeline::timed(
                &format!("Verifying proxies into {}", config.verified_path.display()),
                pipeline::verify_stage(&config, TerminalProgress::default()),
            )
            .await?;
        }
    }

    Ok(())
}
