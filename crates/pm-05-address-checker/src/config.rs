//! # Checker Configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::FreshnessCutoff;

/// Per-checker settings, identical for every address.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressCheckerConfig {
    /// Sleep after every processed link.
    pub backoff_secs: u64,

    /// Only links strictly newer than this are delivered.
    pub after: Option<DateTime<Utc>>,
}

impl Default for AddressCheckerConfig {
    fn default() -> Self {
        Self {
            backoff_secs: 10,
            after: None,
        }
    }
}

impl AddressCheckerConfig {
    /// Backoff duration.
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    /// Freshness filter for this configuration.
    pub fn cutoff(&self) -> FreshnessCutoff {
        FreshnessCutoff::new(self.after)
    }
}
