//! Scraper for the BC Seniors Advocate long-term care facility directory.
//!
//! Walks every result page for each health authority, parses each
//! facility's detail page into a flat record and collects one table per
//! authority.

pub mod aggregate;
pub mod config;
pub mod detail;
pub mod error;
pub mod export;
pub mod fetch;
pub mod listing;
pub mod pagination;
pub mod table;

/// Target of every event the library logs.
pub const LOG_TARGET: &str = "all";

pub use aggregate::Crawler;
pub use config::{CrawlConfig, FailurePolicy, Pacing, Partition};
pub use detail::{parse_detail, parse_facility, FieldRecord, PairingRule};
pub use error::{Result, ScrapeError};
pub use export::{export_all, CsvDirectorySink, TableSink};
pub use fetch::{Page, PageSource, PoliteFetcher, Target};
pub use listing::{extract_links, FacilityLink};
pub use pagination::{collect_all_listings, page_links, PageItem};
pub use table::{CrawlResult, PartitionTable};
