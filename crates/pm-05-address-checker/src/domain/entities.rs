//! # Checker Entities

use chrono::{DateTime, Utc};
use shared_types::Address;

/// Where a checker is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerState {
    /// Blocked on the queue or the shutdown signal.
    Waiting,
    /// Parsing the link and running the tag check.
    Verifying,
    /// Fetching and opening the content.
    Decrypting,
    /// Counting and handing the message to the forwarder.
    Dispatching,
    /// Sleeping after a link.
    Backoff,
    /// Exited.
    Stopped,
}

/// What happened to a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The link could not be parsed.
    Malformed,
    /// Stage 1 did not match this address.
    NotMatched,
    /// Matched but not newer than the cutoff.
    Stale,
    /// Matched but the content could not be fetched or decrypted.
    ContentFailed,
    /// Counted; no forwarder is configured for the address.
    Counted {
        /// Unread count after the increment.
        unread: u64,
    },
    /// Counted and forwarded.
    Forwarded {
        /// Unread count after the increment.
        unread: u64,
        /// Forwarder kind.
        forwarder: &'static str,
    },
    /// Counted, but the forwarder returned an error.
    ForwardFailed {
        /// Unread count after the increment.
        unread: u64,
    },
}

impl LinkOutcome {
    /// Whether the message was decrypted and counted.
    pub fn is_delivered(&self) -> bool {
        matches!(
            self,
            LinkOutcome::Counted { .. }
                | LinkOutcome::Forwarded { .. }
                | LinkOutcome::ForwardFailed { .. }
        )
    }
}

/// Strict freshness filter on link timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreshnessCutoff {
    after_nanos: Option<i64>,
}

impl FreshnessCutoff {
    /// Cutoff at `after`; `None` accepts everything.
    ///
    /// Dates outside the nanosecond range (before 1677 or after 2262) clamp
    /// to whichever end they fall past.
    pub fn new(after: Option<DateTime<Utc>>) -> Self {
        Self {
            after_nanos: after.map(|t| {
                t.timestamp_nanos_opt().unwrap_or(if t.timestamp() < 0 {
                    i64::MIN
                } else {
                    i64::MAX
                })
            }),
        }
    }

    /// No cutoff.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a link stamped `ts_nanos` is strictly after the cutoff.
    pub fn is_fresh(&self, ts_nanos: i64) -> bool {
        match self.after_nanos {
            Some(after) => ts_nanos > after,
            None => true,
        }
    }
}

/// What a checker did over its lifetime, returned when it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerReport {
    /// Address the checker served.
    pub address: Address,
    /// Links taken off the queue.
    pub links_processed: u64,
    /// Messages decrypted and counted.
    pub delivered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cutoff_is_strict() {
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let nanos = after.timestamp_nanos_opt().unwrap();
        let cutoff = FreshnessCutoff::new(Some(after));

        assert!(!cutoff.is_fresh(nanos));
        assert!(!cutoff.is_fresh(nanos - 1));
        assert!(cutoff.is_fresh(nanos + 1));
    }

    #[test]
    fn test_out_of_range_cutoffs_clamp_to_the_near_end() {
        let now = Utc::now().timestamp_nanos_opt().unwrap();

        let ancient = FreshnessCutoff::new(Some(Utc.with_ymd_and_hms(1600, 1, 1, 0, 0, 0).unwrap()));
        assert!(ancient.is_fresh(now));
        assert!(ancient.is_fresh(i64::MIN + 1));

        let distant = FreshnessCutoff::new(Some(Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap()));
        assert!(!distant.is_fresh(now));
        assert!(!distant.is_fresh(i64::MAX));
    }

    #[test]
    fn test_no_cutoff_accepts_all() {
        assert!(FreshnessCutoff::none().is_fresh(0));
        assert!(FreshnessCutoff::new(None).is_fresh(i64::MIN));
    }

    #[test]
    fn test_delivered_outcomes() {
        assert!(LinkOutcome::Counted { unread: 1 }.is_delivered());
        assert!(LinkOutcome::ForwardFailed { unread: 2 }.is_delivered());
        assert!(!LinkOutcome::Stale.is_delivered());
        assert!(!LinkOutcome::NotMatched.is_delivered());
    }
}
