use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hostcrawl::{CrawlConfig, Crawler, HttpFetcher};

/// Crawl a site from a seed page, restricted to a set of allowed hosts.
#[derive(Parser)]
#[command(name = "hostcrawl", version)]
struct Args {
    /// Page on which to begin crawling
    #[arg(long)]
    url: String,

    /// Crawl pages from this host (valid multiple times)
    #[arg(long = "host", required = true)]
    hosts: Vec<String>,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 8)]
    workers: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = CrawlConfig::new(&args.url, &args.hosts)?;

    info!("will crawl {}", config.seed);
    for host in &config.allowed_hosts {
        info!("will crawl {host}");
    }

    let builder = Crawler::builder()
        .workers(args.workers)
        .fetcher(Arc::new(HttpFetcher::new()?));
    let ((results_tx, mut results_rx), (errors_tx, mut errors_rx)) = builder.sinks();
    let crawler = builder.build()?;

    let errors_task = tokio::spawn(async move {
        while let Some(err) = errors_rx.recv().await {
            error!("scraper encountered error: {err}");
        }
    });

    let results_task = tokio::spawn(async move {
        while let Some(page) = results_rx.recv().await {
            info!("results for page: {}", page.url);
            for link in &page.links {
                info!("  {link}");
            }
        }
    });

    let stats = crawler.crawl(&config, results_tx, errors_tx).await;

    // The crawl dropped all sink senders, so both consumers drain and exit.
    results_task.await?;
    errors_task.await?;

    info!(
        "crawl complete: {} pages, {} links discovered, {} errors",
        stats.pages_crawled, stats.links_discovered, stats.errors_encountered
    );

    Ok(())
}
