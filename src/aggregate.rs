use tracing::{error, info, warn};

use crate::config::{CrawlConfig, FailurePolicy, Partition};
use crate::detail::parse_facility;
use crate::error::Result;
use crate::fetch::PageSource;
use crate::pagination::collect_all_listings;
use crate::table::{CrawlResult, PartitionTable};
use crate::LOG_TARGET;

pub struct Crawler<S> {
    source: S,
    config: CrawlConfig,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, config: CrawlConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// One row per listed facility, in listing order.
    pub async fn build_table(&self, partition: &Partition) -> Result<PartitionTable> {
        let listings = collect_all_listings(&self.source, partition).await;
        let mut table = PartitionTable::new();

        for (i, link) in listings.iter().enumerate() {
            match parse_facility(&self.source, &link.url).await {
                Ok(record) => table.append(record),
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::SkipFacility => {
                        warn!(
                            target: LOG_TARGET,
                            "Skipping {} ({}): {}",
                            link.name,
                            link.url,
                            err
                        );
                    }
                    FailurePolicy::AbortPartition => return Err(err),
                },
            }
            if (i + 1) % 25 == 0 {
                info!(
                    target: LOG_TARGET,
                    "{}: {}/{} facilities",
                    partition.name,
                    i + 1,
                    listings.len()
                );
            }
        }

        info!(
            target: LOG_TARGET,
            "{}: {} rows, {} columns",
            partition.name,
            table.len(),
            table.columns().len()
        );
        Ok(table)
    }

    pub async fn build_table_by_name(&self, name: &str) -> Result<PartitionTable> {
        let partition = self.config.partition(name)?;
        self.build_table(partition).await
    }

    /// Builds every configured partition in turn.
    pub async fn crawl(&self) -> CrawlResult {
        let mut result = CrawlResult::default();

        for partition in &self.config.partitions {
            info!(
                target: LOG_TARGET,
                "Scraping {} (id {})",
                partition.name,
                partition.id
            );
            match self.build_table(partition).await {
                Ok(table) => result.tables.push((partition.name.clone(), table)),
                Err(err) => {
                    error!(target: LOG_TARGET, "Abandoning {}: {}", partition.name, err);
                    result.failed.push(partition.name.clone());
                }
            }
        }

        result
    }
}
