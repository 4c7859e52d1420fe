use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::{Result, ScrapeError};

pub const BASE_URL: &str = "https://www.seniorsadvocatebc.ca/quickfacts/location";
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.2 Safari/605.1.15";

/// A health authority and the id the directory's search form uses for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub name: String,
    pub id: u32,
}

impl Partition {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// What to do when a facility's detail page can't be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log a warning and leave the facility out of the table.
    #[default]
    SkipFacility,
    /// Stop building the partition and report the error.
    AbortPartition,
}

/// Randomized pause taken before every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    pub base: RangeInclusive<u64>,
    pub extra: RangeInclusive<u64>,
    pub extra_probability: f64,
    pub unit: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            base: 1..=3,
            extra: 2..=4,
            extra_probability: 0.1,
            unit: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            unit: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> Duration {
        let mut units = rng.u64(self.base.clone());
        if rng.f64() < self.extra_probability {
            units += rng.u64(self.extra.clone());
        }
        self.unit * units as u32
    }
}

/// Settings for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub base_url: String,
    pub user_agent: String,
    pub partitions: Vec<Partition>,
    pub pacing: Pacing,
    pub timeout: Duration,
    pub failure_policy: FailurePolicy,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_owned(),
            user_agent: USER_AGENT.to_owned(),
            partitions: vec![
                Partition::new("Fraser Health", 1),
                Partition::new("Interior Health", 6),
                Partition::new("Northern Health", 11),
                Partition::new("Vancouver Coastal Health", 16),
                Partition::new("Vancouver Island Health", 21),
            ],
            pacing: Pacing::default(),
            timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl CrawlConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_partitions(mut self, partitions: Vec<Partition>) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn partition(&self, name: &str) -> Result<&Partition> {
        self.partitions
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ScrapeError::UnknownPartition(name.to_owned()))
    }
}
