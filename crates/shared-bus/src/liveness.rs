//! # Liveness Beacon
//!
//! Latest-value channel holding the time of the most recent link check across
//! all checkers. Status displays subscribe and render it; nobody queues on it.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared handle to the last global check time.
#[derive(Clone)]
pub struct LivenessBeacon {
    tx: Arc<watch::Sender<Option<DateTime<Utc>>>>,
}

impl LivenessBeacon {
    /// Create a beacon that has not seen any check yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Record a check that happened now.
    pub fn touch(&self) {
        self.touch_at(Utc::now());
    }

    /// Record a check at an explicit time.
    pub fn touch_at(&self, at: DateTime<Utc>) {
        self.tx.send_replace(Some(at));
    }

    /// Most recent check time.
    pub fn last_check(&self) -> Option<DateTime<Utc>> {
        *self.tx.borrow()
    }

    /// Most recent check time as RFC3339, or an empty string.
    pub fn last_check_rfc3339(&self) -> String {
        self.last_check()
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default()
    }

    /// Watch for updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.tx.subscribe()
    }
}

impl Default for LivenessBeacon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_starts_empty() {
        let beacon = LivenessBeacon::new();
        assert!(beacon.last_check().is_none());
        assert_eq!(beacon.last_check_rfc3339(), "");
    }

    #[test]
    fn test_keeps_latest_only() {
        let beacon = LivenessBeacon::new();
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap();
        beacon.touch_at(first);
        beacon.clone().touch_at(second);
        assert_eq!(beacon.last_check(), Some(second));
        assert_eq!(beacon.last_check_rfc3339(), "2024-01-01T00:00:05Z");
    }

    #[tokio::test]
    async fn test_subscriber_sees_change() {
        let beacon = LivenessBeacon::new();
        let mut rx = beacon.subscribe();
        beacon.touch();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());
    }
}
