use ltc_facility_scraper::{export_all, CrawlConfig, Crawler, CsvDirectorySink, PoliteFetcher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const OUTPUT_DIR: &str = "longterm-care";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    tracing::info!("Start logging for long-term care facility scraping.");

    let config = CrawlConfig::default();
    let fetcher = match PoliteFetcher::new(&config) {
        Ok(fetcher) => fetcher,
        Err(err) => {
            tracing::error!("Failed to build HTTP client: {}", err);
            std::process::exit(1);
        }
    };

    let crawler = Crawler::new(fetcher, config);
    let result = crawler.crawl().await;

    let written = CsvDirectorySink::new(OUTPUT_DIR).and_then(|mut sink| export_all(&result, &mut sink));
    if let Err(err) = written {
        tracing::error!("Failed to write tables to {}: {}", OUTPUT_DIR, err);
        std::process::exit(1);
    }
    if !result.failed.is_empty() {
        tracing::warn!("Partitions not scraped: {}", result.failed.join(", "));
    }
}
